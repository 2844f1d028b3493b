//! Error types for the pipeline.

use forge_build::BuildError;
use forge_discovery::DiscoveryError;
use forge_iac::{IacError, InfraOperation};
use thiserror::Error;

use crate::state::Phase;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that halt the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Unsupported runtime '{runtime}' for function '{function}'")]
    UnsupportedRuntime { function: String, runtime: String },

    #[error("Build failed for function '{function}': {source}")]
    BuildFailed {
        function: String,
        #[source]
        source: BuildError,
    },

    #[error("Failed to create stub packages: {0}")]
    Stubs(#[source] DiscoveryError),

    #[error("terraform {operation} failed: {source}")]
    Executor {
        operation: InfraOperation,
        #[source]
        source: IacError,
    },

    #[error("terraform {operation} was not approved")]
    ApprovalDenied { operation: InfraOperation },

    #[error("Invalid pipeline state: expected {expected}, found {found}")]
    InvalidState { expected: Phase, found: Phase },

    #[error("Pipeline cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Attribute an executor error to the operation that produced it.
    pub fn executor(operation: InfraOperation, source: IacError) -> Self {
        match source {
            IacError::Cancelled => PipelineError::Cancelled,
            source => PipelineError::Executor { operation, source },
        }
    }

    /// Attribute a build error to the function being built.
    pub fn build(function: impl Into<String>, source: BuildError) -> Self {
        let function = function.into();
        match source {
            BuildError::UnsupportedRuntime(runtime) => {
                PipelineError::UnsupportedRuntime { function, runtime }
            }
            BuildError::Cancelled => PipelineError::Cancelled,
            source => PipelineError::BuildFailed { function, source },
        }
    }
}
