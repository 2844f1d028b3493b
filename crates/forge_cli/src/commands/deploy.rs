//! Deploy command - Build and deploy the project.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::info;

use forge_core::{infra_pipeline, DeployOptions};

use super::{build, ProjectArgs, TerraformArgs, Verbosity};
use crate::output::{format_outputs, TerminalPrompt};
use crate::runner;

#[derive(Args)]
pub struct DeployArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Deploy into a namespace (prefixes resource names)
    #[arg(short, long, default_value = "")]
    pub namespace: String,

    /// Apply without asking for confirmation
    #[arg(long)]
    pub auto_approve: bool,

    /// Maximum builds in flight (overrides forge.toml)
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    #[command(flatten)]
    pub terraform: TerraformArgs,
}

/// Deploy options for the given flags, with the terminal as the prompt.
pub fn deploy_options(namespace: &str, auto_approve: bool) -> DeployOptions {
    DeployOptions::new()
        .with_namespace(namespace)
        .with_auto_approve(auto_approve)
        .with_prompt(Arc::new(TerminalPrompt))
}

pub async fn execute(args: DeployArgs, verbosity: Verbosity) -> Result<()> {
    let root = args.project.root()?;
    let config = build::load_config(&root)?;
    if args.concurrency == Some(0) {
        anyhow::bail!("Invalid argument: --concurrency must be at least 1");
    }
    info!("Deploying project: {}", config.project_name(&root));
    if let Some(region) = &config.project.region {
        info!("Region: {}", region);
    }

    let executor = args.terraform.executor(&root).await?;
    let options = deploy_options(&args.namespace, args.auto_approve);

    let pipeline = build::pipeline(&config, false, args.concurrency)
        .chain(infra_pipeline(executor, &options));

    let output = runner::run("deploy", &root, pipeline, verbosity.quiet).await?;

    println!("\n✓ Deployment complete");
    if let Some(outputs) = output.state.outputs.as_ref().filter(|o| !o.is_empty()) {
        println!("\nOutputs:\n{}", format_outputs(outputs));
    }
    Ok(())
}
