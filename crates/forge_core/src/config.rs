//! Project configuration (`forge.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use forge_build::CacheKeyStrategy;
use forge_discovery::{FunctionDefaults, ScanOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};

/// Configuration file name, relative to the project root.
pub const CONFIG_FILE: &str = "forge.toml";

/// Environment variable overriding `project.region`.
pub const REGION_ENV: &str = "FORGE_REGION";

/// Project identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Defaults to the project directory name
    pub name: Option<String>,
    pub region: Option<String>,
    /// Where function directories live, relative to the project root
    pub functions_dir: Option<PathBuf>,
}

/// How functions are built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Maximum builds in flight
    pub concurrency: usize,
    pub cache_key: CacheKeyStrategy,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            concurrency: 1,
            cache_key: CacheKeyStrategy::default(),
        }
    }
}

/// Contents of `forge.toml`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    pub project: ProjectConfig,
    pub defaults: FunctionDefaults,
    pub build: BuildSettings,
}

impl ForgeConfig {
    /// Load `<root>/forge.toml`, falling back to defaults when it is absent.
    ///
    /// `FORGE_REGION` takes precedence over the file.
    pub fn load(root: &Path) -> PipelineResult<Self> {
        let path = root.join(CONFIG_FILE);
        let mut config = if path.is_file() {
            debug!("Loading configuration from {:?}", path);
            Self::from_toml_str(&fs::read_to_string(&path)?)?
        } else {
            debug!("No {} found, using defaults", CONFIG_FILE);
            Self::default()
        };

        config.apply_overrides(std::env::var(REGION_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> PipelineResult<Self> {
        toml::from_str(content)
            .map_err(|e| PipelineError::Config(format!("invalid {}: {}", CONFIG_FILE, e)))
    }

    /// Apply environment overrides. Empty values are ignored.
    pub fn apply_overrides(&mut self, region: Option<String>) {
        if let Some(region) = region.filter(|r| !r.is_empty()) {
            self.project.region = Some(region);
        }
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.build.concurrency == 0 {
            return Err(PipelineError::Config(
                "build.concurrency must be at least 1".to_string(),
            ));
        }
        if self.defaults.timeout == 0 || self.defaults.memory == 0 {
            return Err(PipelineError::Config(
                "defaults.timeout and defaults.memory must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn function_defaults(&self) -> FunctionDefaults {
        self.defaults
    }

    pub fn scan_options(&self) -> ScanOptions {
        match &self.project.functions_dir {
            Some(dir) => ScanOptions::default().with_functions_dir(dir.clone()),
            None => ScanOptions::default(),
        }
    }

    /// Configured name, or the project directory's name.
    pub fn project_name(&self, root: &Path) -> String {
        self.project.name.clone().unwrap_or_else(|| {
            root.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "forge-project".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ForgeConfig::default();

        assert_eq!(config.defaults.timeout, 30);
        assert_eq!(config.defaults.memory, 256);
        assert_eq!(config.build.concurrency, 1);
        assert_eq!(config.build.cache_key, CacheKeyStrategy::Configuration);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_file() {
        let config = ForgeConfig::from_toml_str(
            r#"
            [project]
            name = "orders"
            region = "eu-west-1"
            functions_dir = "lambdas"

            [defaults]
            timeout = 60
            memory = 512

            [build]
            concurrency = 4
            cache_key = "content"
            "#,
        )
        .unwrap();

        assert_eq!(config.project.name.as_deref(), Some("orders"));
        assert_eq!(config.defaults.timeout, 60);
        assert_eq!(config.build.concurrency, 4);
        assert_eq!(config.build.cache_key, CacheKeyStrategy::ContentDigest);
        assert_eq!(config.scan_options().functions_dir, PathBuf::from("lambdas"));
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = ForgeConfig::from_toml_str("[defaults]\nmemory = 1024\n").unwrap();

        assert_eq!(config.defaults.memory, 1024);
        assert_eq!(config.defaults.timeout, 30);
        assert_eq!(config.build.concurrency, 1);
    }

    #[test]
    fn test_malformed_file() {
        let err = ForgeConfig::from_toml_str("[build\nconcurrency = ").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = ForgeConfig::from_toml_str("[build]\nconcurrency = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_region_override() {
        let mut config = ForgeConfig::from_toml_str("[project]\nregion = \"us-east-1\"\n").unwrap();

        config.apply_overrides(Some(String::new()));
        assert_eq!(config.project.region.as_deref(), Some("us-east-1"));

        config.apply_overrides(Some("ap-south-1".to_string()));
        assert_eq!(config.project.region.as_deref(), Some("ap-south-1"));
    }

    #[test]
    fn test_load_missing_file_and_project_name() {
        let temp = TempDir::new().unwrap();

        let config = ForgeConfig::load(temp.path()).unwrap();

        assert_eq!(config.build.concurrency, 1);
        let expected = temp.path().file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(config.project_name(temp.path()), expected);
    }
}
