//! Destroy command - Tear down deployed infrastructure.

use anyhow::Result;
use clap::Args;
use tracing::info;

use forge_core::destroy_pipeline;

use super::deploy::deploy_options;
use super::{ProjectArgs, TerraformArgs, Verbosity};
use crate::runner;

#[derive(Args)]
pub struct DestroyArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Destroy only this namespace's resources
    #[arg(short, long, default_value = "")]
    pub namespace: String,

    /// Destroy without asking for confirmation
    #[arg(long)]
    pub auto_approve: bool,

    #[command(flatten)]
    pub terraform: TerraformArgs,
}

pub async fn execute(args: DestroyArgs, verbosity: Verbosity) -> Result<()> {
    let root = args.project.root()?;
    let executor = args.terraform.executor(&root).await?;
    info!("Destroying infrastructure in {}", root.display());

    let options = deploy_options(&args.namespace, args.auto_approve);
    runner::run("destroy", &root, destroy_pipeline(executor, &options), verbosity.quiet).await?;

    println!("\n✓ Infrastructure destroyed");
    Ok(())
}
