//! Error types for function discovery.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Errors that can occur while discovering functions.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Functions directory not found: {0}")]
    NotFound(PathBuf),

    #[error("No functions found in {0}")]
    Empty(PathBuf),

    #[error("Invalid metadata for function '{function}': {source}")]
    MetadataParse {
        function: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid function '{function}': {message}")]
    InvalidFunction { function: String, message: String },

    #[error("Build error: {0}")]
    Build(#[from] forge_build::BuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
