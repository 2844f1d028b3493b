//! Runs a pipeline for a command and records the outcome.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use forge_core::{Pipeline, PipelineContext, PipelineOutput, ProjectState, RunRecord};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::output::event_printer;

/// Token cancelled on Ctrl-C.
pub fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let handle = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            handle.cancel();
        }
    });
    token
}

/// Run `pipeline` from a fresh state at `root`, printing events live.
///
/// A failure is returned as a `PipelineFailure` inside the error so the
/// exit code can be derived from it.
pub async fn run(
    command: &str,
    root: &Path,
    pipeline: Pipeline,
    quiet: bool,
) -> Result<PipelineOutput> {
    let ctx = PipelineContext::with_cancel(interrupt_token());
    let started_at = Utc::now();
    info!("forge {} (run {})", command, ctx.run_id);

    let pipeline = pipeline.with_observer(event_printer(quiet));
    let result = pipeline.run(&ctx, ProjectState::new(root)).await;

    let record = match &result {
        Ok(output) => RunRecord::succeeded(ctx.run_id, command, started_at, output),
        Err(failure) => RunRecord::failed(ctx.run_id, command, started_at, failure),
    };
    match record.save(root) {
        Ok(path) => debug!("Run record written to {:?}", path),
        Err(e) => warn!("Could not write run record: {}", e),
    }

    Ok(result?)
}
