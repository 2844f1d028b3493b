//! Python builder.
//!
//! Dependencies from `requirements.txt` are installed into a scratch
//! directory and packaged alongside the sources. Source files take precedence
//! over installed packages with the same path.

use std::path::Path;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::require_source_dir;
use crate::builder::Builder;
use crate::config::{Artifact, BuildConfig};
use crate::error::BuildResult;
use crate::package::zip_directories;
use crate::process::{run_checked, CommandSpec};

const REQUIREMENTS: &str = "requirements.txt";

/// Builds Python functions.
#[derive(Debug, Clone)]
pub struct PythonBuilder {
    pip: String,
}

impl Default for PythonBuilder {
    fn default() -> Self {
        Self {
            pip: "pip".to_string(),
        }
    }
}

impl PythonBuilder {
    /// Use a different `pip` executable.
    pub fn with_binary(mut self, pip: impl Into<String>) -> Self {
        self.pip = pip.into();
        self
    }

    fn install_command(&self, config: &BuildConfig, target: &Path) -> CommandSpec {
        CommandSpec::new(&self.pip)
            .args(["install", "-r", REQUIREMENTS, "-t"])
            .arg(target.to_string_lossy())
            .arg("--upgrade")
            .envs(&config.env)
            .current_dir(&config.source_dir)
    }
}

#[async_trait]
impl Builder for PythonBuilder {
    async fn build(&self, ctx: &CancellationToken, config: &BuildConfig) -> BuildResult<Artifact> {
        require_source_dir(&config.source_dir)?;
        let output = config.output_path_or("lambda.zip");

        let deps = tempfile::tempdir()?;
        if config.source_dir.join(REQUIREMENTS).is_file() {
            run_checked(ctx, &self.install_command(config, deps.path())).await?;
            debug!("Installed dependencies for {:?}", config.source_dir);
        }

        zip_directories(&output, &[config.source_dir.as_path(), deps.path()])?;
        Artifact::from_file(&output)
    }
}
