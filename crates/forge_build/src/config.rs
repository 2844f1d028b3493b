//! Build configuration and artifact types.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BuildResult;
use crate::hash::sha256_file;
use crate::runtime;

/// Input to a builder.
///
/// A configuration is a value: builders never mutate it, and a re-build
/// constructs a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Source code directory
    pub source_dir: PathBuf,
    /// Where the deployment package is written
    pub output_path: PathBuf,
    /// Handler path/name
    pub handler: String,
    /// Runtime identifier (provided.al2023, python3.13, ...)
    pub runtime: String,
    /// Extra environment variables for the toolchain
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl BuildConfig {
    /// Create a configuration with the runtime's default handler.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        runtime: impl Into<String>,
    ) -> Self {
        let runtime = runtime.into();
        Self {
            source_dir: source_dir.into(),
            output_path: output_path.into(),
            handler: runtime::handler_for(&runtime).to_string(),
            runtime,
            env: BTreeMap::new(),
        }
    }

    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = handler.into();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// The output path, or `fallback` inside the source directory when unset.
    pub fn output_path_or(&self, fallback: &str) -> PathBuf {
        if self.output_path.as_os_str().is_empty() {
            self.source_dir.join(fallback)
        } else {
            self.output_path.clone()
        }
    }
}

/// A built deployment package.
///
/// For caching purposes an artifact is identified by its checksum, not its path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub path: PathBuf,
    /// SHA-256 of the file contents, lowercase hex
    pub checksum: String,
    /// Size in bytes
    pub size: u64,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, checksum: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            checksum: checksum.into(),
            size,
        }
    }

    /// Describe a file already written to disk.
    pub fn from_file(path: &Path) -> BuildResult<Self> {
        let checksum = sha256_file(path)?;
        let size = fs::metadata(path)?.len();
        Ok(Self::new(path, checksum, size))
    }

    /// Size in megabytes, for display.
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1024.0 / 1024.0
    }

    /// File name of the package.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_config_defaults_handler_from_runtime() {
        let config = BuildConfig::new("/src/api", "/build/api.zip", "nodejs20.x");

        assert_eq!(config.handler, "index.handler");
        assert_eq!(config.runtime, "nodejs20.x");
        assert!(config.env.is_empty());
    }

    #[test]
    fn test_build_config_builders() {
        let config = BuildConfig::new("/src/api", "/build/api.zip", "python3.13")
            .with_handler("app.main")
            .with_env("PIP_INDEX_URL", "https://mirror");

        assert_eq!(config.handler, "app.main");
        assert_eq!(config.env.get("PIP_INDEX_URL").map(String::as_str), Some("https://mirror"));
    }

    #[test]
    fn test_output_path_fallback() {
        let config = BuildConfig::new("/src/api", "", "python3.13");
        assert_eq!(config.output_path_or("lambda.zip"), PathBuf::from("/src/api/lambda.zip"));

        let config = BuildConfig::new("/src/api", "/out/api.zip", "python3.13");
        assert_eq!(config.output_path_or("lambda.zip"), PathBuf::from("/out/api.zip"));
    }

    #[test]
    fn test_artifact_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api.zip");
        fs::write(&path, b"hello").unwrap();

        let artifact = Artifact::from_file(&path).unwrap();

        assert_eq!(artifact.size, 5);
        assert_eq!(
            artifact.checksum,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(artifact.file_name(), "api.zip");
    }
}
