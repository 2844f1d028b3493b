//! CLI command definitions.
//!
//! Each subcommand maps to a stage chain from `forge_core`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use forge_iac::{Executor, IacError, TerraformExecutor};
use tokio_util::sync::CancellationToken;

pub mod build;
pub mod deploy;
pub mod destroy;

/// forge - convention-driven serverless build and deploy
#[derive(Parser)]
#[command(name = "forge")]
#[command(version, about = "forge - convention-driven serverless build and deploy")]
#[command(long_about = r#"
forge discovers Lambda functions under src/functions/, builds a deployment
package for each one, and deploys the Terraform configuration in infra/.

COMMANDS:
  build    → Discover and package every function
  deploy   → Build, then init/plan/apply the infrastructure
  destroy  → Tear down the deployed infrastructure

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or project layout
  3 - Build failure
  5 - Infrastructure error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover and package every function
    Build(build::BuildArgs),

    /// Build and deploy the project
    Deploy(deploy::DeployArgs),

    /// Destroy deployed infrastructure
    Destroy(destroy::DestroyArgs),
}

/// Arguments shared by every command.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project root directory
    #[arg(long, default_value = ".", env = "FORGE_PROJECT_DIR")]
    pub project_dir: PathBuf,
}

impl ProjectArgs {
    pub fn root(&self) -> anyhow::Result<PathBuf> {
        if !self.project_dir.is_dir() {
            anyhow::bail!("Project directory not found: {}", self.project_dir.display());
        }
        self.project_dir
            .canonicalize()
            .with_context(|| format!("Cannot resolve {}", self.project_dir.display()))
    }
}

/// Infrastructure tool selection.
#[derive(Args, Debug, Clone)]
pub struct TerraformArgs {
    /// Terraform binary to use
    #[arg(long = "terraform", env = "FORGE_TERRAFORM", default_value = "terraform")]
    pub binary: String,
}

impl TerraformArgs {
    /// Executor for `<root>/infra`, after checking the tool and directory exist.
    pub async fn executor(&self, root: &Path) -> anyhow::Result<Arc<dyn Executor>> {
        let infra = root.join(forge_core::INFRA_DIR);
        if !infra.is_dir() {
            anyhow::bail!("Infrastructure directory not found: {}", infra.display());
        }

        let executor = TerraformExecutor::new().with_binary(self.binary.clone());
        if !executor.is_available(&CancellationToken::new()).await {
            return Err(IacError::TerraformNotAvailable(self.binary.clone()).into());
        }
        Ok(Arc::new(executor))
    }
}

/// Output settings derived from the global flags.
#[derive(Debug, Clone, Copy)]
pub struct Verbosity {
    pub quiet: bool,
}
