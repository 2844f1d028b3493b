//! Stage definitions.
//!
//! A stage is one fallible transition of the project state. Stages emit
//! [`StageEvent`]s as they go; the events survive a failure so the caller can
//! show what happened before the error.
//!
//! # Example
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use forge_core::{Phase, PipelineContext, ProjectState, Stage, StageEvent, StageOutcome, StageResult};
//!
//! struct Announce;
//!
//! #[async_trait]
//! impl Stage for Announce {
//!     fn name(&self) -> &str { "announce" }
//!
//!     async fn run(&self, _ctx: &PipelineContext, state: ProjectState) -> StageResult {
//!         let event = StageEvent::info(format!("Deploying {:?}", state.project_root));
//!         Ok(StageOutcome::new(state, vec![event]))
//!     }
//! }
//! ```

use async_trait::async_trait;
use forge_discovery::DiscoveryError;

use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::events::StageEvent;
use crate::state::ProjectState;

/// Successful result of a stage.
#[derive(Debug, Clone)]
pub struct StageOutcome {
    pub state: ProjectState,
    pub events: Vec<StageEvent>,
}

impl StageOutcome {
    pub fn new(state: ProjectState, events: Vec<StageEvent>) -> Self {
        Self { state, events }
    }
}

/// Failed result of a stage, with the events emitted before the failure.
#[derive(Debug)]
pub struct StageError {
    pub error: PipelineError,
    pub events: Vec<StageEvent>,
}

impl StageError {
    pub fn new(error: PipelineError, events: Vec<StageEvent>) -> Self {
        Self { error, events }
    }
}

impl From<PipelineError> for StageError {
    fn from(error: PipelineError) -> Self {
        Self::new(error, Vec::new())
    }
}

impl From<DiscoveryError> for StageError {
    fn from(error: DiscoveryError) -> Self {
        Self::new(error.into(), Vec::new())
    }
}

pub type StageResult = Result<StageOutcome, StageError>;

/// One step of the pipeline.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Name used in logs and failure reports.
    fn name(&self) -> &str;

    /// Consume the state and produce the next one.
    async fn run(&self, ctx: &PipelineContext, state: ProjectState) -> StageResult;
}
