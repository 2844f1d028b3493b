//! Build command - Discover and package every function.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::info;

use forge_build::{compose, with_cache_keyed, with_logging, BuilderRegistry, MemoryCache, TracingLogger};
use forge_core::{ConventionBuild, ConventionScan, ConventionStubs, ForgeConfig, Pipeline};

use super::{ProjectArgs, Verbosity};
use crate::runner;

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Only create placeholder packages, skip the real build
    #[arg(long)]
    pub stub_only: bool,

    /// Maximum builds in flight (overrides forge.toml)
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,
}

/// Build stage configured from `forge.toml` and the command line.
pub fn convention_build(config: &ForgeConfig, concurrency: Option<usize>) -> ConventionBuild {
    let decorator = compose(vec![
        with_logging(Arc::new(TracingLogger)),
        with_cache_keyed(Arc::new(MemoryCache::new()), config.build.cache_key),
    ]);

    ConventionBuild::new(BuilderRegistry::with_defaults())
        .with_decorator(decorator)
        .with_concurrency(concurrency.unwrap_or(config.build.concurrency))
}

/// Scan and stub, then build unless `stub_only`.
pub fn pipeline(config: &ForgeConfig, stub_only: bool, concurrency: Option<usize>) -> Pipeline {
    let pipeline = Pipeline::new()
        .stage(ConventionScan::with_options(config.scan_options()))
        .stage(ConventionStubs::new());
    if stub_only {
        pipeline
    } else {
        pipeline.stage(convention_build(config, concurrency))
    }
}

pub fn load_config(root: &Path) -> Result<ForgeConfig> {
    Ok(ForgeConfig::load(root)?)
}

pub async fn execute(args: BuildArgs, verbosity: Verbosity) -> Result<()> {
    let root = args.project.root()?;
    let config = load_config(&root)?;
    if args.concurrency == Some(0) {
        anyhow::bail!("Invalid argument: --concurrency must be at least 1");
    }
    info!("Building project: {}", config.project_name(&root));

    let output = runner::run(
        "build",
        &root,
        pipeline(&config, args.stub_only, args.concurrency),
        verbosity.quiet,
    )
    .await?;

    if verbosity.quiet {
        return Ok(());
    }

    let defaults = config.function_defaults();
    println!();
    for function in &output.state.functions {
        let package = match output.state.artifacts.get(&function.name) {
            Some(artifact) => artifact.file_name(),
            None => "stub".to_string(),
        };
        println!(
            "  {} ({}): timeout {}s, memory {} MB, package {}",
            function.name,
            function.runtime,
            function.timeout_or(&defaults),
            function.memory_or(&defaults),
            package
        );
        if let Some(route) = &function.http {
            println!("    http: {} {}", route.method, route.path);
        }
    }

    if args.stub_only {
        println!("\n✓ Stub packages ready in {}", output.state.build_dir().display());
    } else {
        println!(
            "\n✓ Built {} function(s) into {}",
            output.state.artifacts.len(),
            output.state.build_dir().display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_only_pipeline() {
        let config = ForgeConfig::default();

        assert_eq!(pipeline(&config, true, None).stage_names(), vec!["scan", "stubs"]);
        assert_eq!(
            pipeline(&config, false, Some(4)).stage_names(),
            vec!["scan", "stubs", "build"]
        );
    }
}
