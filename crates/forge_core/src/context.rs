//! Pipeline execution context.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Per-run context shared by every stage.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    /// Identifier of this run, for log correlation
    pub run_id: Uuid,
    /// Cancelling this token stops the pipeline and any running process
    pub cancel: CancellationToken,
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::with_cancel(CancellationToken::new())
    }

    /// Use an existing token, e.g. one wired to Ctrl-C.
    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            cancel,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
