//! Error types for the IaC module.

use forge_build::BuildError;
use thiserror::Error;

/// Result type alias for IaC operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur while driving the infrastructure tool.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("Terraform not available: {0}")]
    TerraformNotAvailable(String),

    #[error("terraform {command} failed with exit code {exit_code}\nstderr: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Terraform state locked (lock ID: {lock_id})")]
    StateLocked { lock_id: String, message: String },

    #[error("Terraform validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid terraform output: {0}")]
    OutputDecode(#[from] serde_json::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Process error: {0}")]
    Process(BuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BuildError> for IacError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::ToolNotFound(tool) => IacError::TerraformNotAvailable(tool),
            BuildError::Cancelled => IacError::Cancelled,
            BuildError::Io(e) => IacError::Io(e),
            other => IacError::Process(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_errors_are_classified() {
        assert!(matches!(
            IacError::from(BuildError::ToolNotFound("terraform".to_string())),
            IacError::TerraformNotAvailable(tool) if tool == "terraform"
        ));
        assert!(matches!(IacError::from(BuildError::Cancelled), IacError::Cancelled));
        assert!(matches!(
            IacError::from(BuildError::InvalidConfig("x".to_string())),
            IacError::Process(_)
        ));
    }
}
