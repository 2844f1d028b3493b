//! Go builder.
//!
//! Cross-compiles a static linux/amd64 binary named `bootstrap` and packages it
//! as the only entry of the deployment zip.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::require_source_dir;
use crate::builder::Builder;
use crate::config::{Artifact, BuildConfig};
use crate::error::BuildResult;
use crate::package::zip_file_as;
use crate::process::{run_checked, CommandSpec};

/// Builds Go functions for the `provided` runtimes.
#[derive(Debug, Clone)]
pub struct GoBuilder {
    binary: String,
}

impl Default for GoBuilder {
    fn default() -> Self {
        Self {
            binary: "go".to_string(),
        }
    }
}

impl GoBuilder {
    /// Use a different `go` executable.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn command(&self, config: &BuildConfig, output: &std::path::Path) -> CommandSpec {
        CommandSpec::new(&self.binary)
            .args(["build", "-tags", "lambda.norpc", "-ldflags", "-s -w", "-o"])
            .arg(output.to_string_lossy())
            .arg(".")
            .env("GOOS", "linux")
            .env("GOARCH", "amd64")
            .env("CGO_ENABLED", "0")
            .envs(&config.env)
            .current_dir(&config.source_dir)
    }
}

#[async_trait]
impl Builder for GoBuilder {
    async fn build(&self, ctx: &CancellationToken, config: &BuildConfig) -> BuildResult<Artifact> {
        require_source_dir(&config.source_dir)?;
        let output = config.output_path_or("bootstrap.zip");

        let work = tempfile::tempdir()?;
        let binary = work.path().join("bootstrap");
        run_checked(ctx, &self.command(config, &binary)).await?;
        debug!("Compiled {:?}", binary);

        zip_file_as(&output, &binary, "bootstrap", 0o755)?;
        Artifact::from_file(&output)
    }
}
