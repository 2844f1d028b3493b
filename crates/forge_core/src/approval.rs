//! Confirmation before destructive operations.

use std::sync::Arc;

use tracing::warn;

use crate::context::PipelineContext;
use crate::error::{PipelineError, PipelineResult};

/// Asks the user to confirm an operation.
///
/// Returning `false` cancels the operation.
pub trait ApprovalPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> ApprovalPrompt for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Prompt that refuses everything, for non-interactive runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl ApprovalPrompt for DenyAll {
    fn confirm(&self, _message: &str) -> bool {
        false
    }
}

/// Ask `prompt` on a blocking thread, giving up as soon as the run is
/// cancelled.
///
/// Prompts usually block on stdin. On cancellation the read is left behind
/// and the caller is expected to exit.
pub async fn ask(
    ctx: &PipelineContext,
    prompt: Arc<dyn ApprovalPrompt>,
    message: &str,
) -> PipelineResult<bool> {
    if ctx.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    let message = message.to_string();
    let answer = tokio::task::spawn_blocking(move || prompt.confirm(&message));

    tokio::select! {
        _ = ctx.cancel.cancelled() => Err(PipelineError::Cancelled),
        joined = answer => Ok(joined.unwrap_or_else(|e| {
            warn!("Approval prompt failed: {}", e);
            false
        })),
    }
}
