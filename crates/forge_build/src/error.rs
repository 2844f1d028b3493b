//! Error types for the build module.

use thiserror::Error;

/// Result type alias for build operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors that can occur while building artifacts.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Unsupported runtime: {0}")]
    UnsupportedRuntime(String),

    #[error("Build tool not found: {0}")]
    ToolNotFound(String),

    #[error("{program} failed ({status})\nOutput: {output}")]
    CommandFailed {
        program: String,
        status: String,
        output: String,
    },

    #[error("Invalid build configuration: {0}")]
    InvalidConfig(String),

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Build cancelled")]
    Cancelled,

    #[error("Packaging failed: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
