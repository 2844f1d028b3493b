//! Node.js builder.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::require_source_dir;
use crate::builder::Builder;
use crate::config::{Artifact, BuildConfig};
use crate::error::BuildResult;
use crate::package::zip_directories;
use crate::process::{run_checked, CommandSpec};

const PACKAGE_JSON: &str = "package.json";

/// Builds Node.js functions.
///
/// Production dependencies are installed in place when a `package.json` is
/// present, then the whole directory (including `node_modules`) is packaged.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    npm: String,
}

impl Default for NodeBuilder {
    fn default() -> Self {
        Self {
            npm: "npm".to_string(),
        }
    }
}

impl NodeBuilder {
    pub fn with_binary(mut self, npm: impl Into<String>) -> Self {
        self.npm = npm.into();
        self
    }

    fn install_command(&self, config: &BuildConfig) -> CommandSpec {
        CommandSpec::new(&self.npm)
            .args(["install", "--production"])
            .envs(&config.env)
            .current_dir(&config.source_dir)
    }
}

#[async_trait]
impl Builder for NodeBuilder {
    async fn build(&self, ctx: &CancellationToken, config: &BuildConfig) -> BuildResult<Artifact> {
        require_source_dir(&config.source_dir)?;
        let output = config.output_path_or("lambda.zip");

        if config.source_dir.join(PACKAGE_JSON).is_file() {
            run_checked(ctx, &self.install_command(config)).await?;
            debug!("Installed dependencies for {:?}", config.source_dir);
        }

        zip_directories(&output, &[config.source_dir.as_path()])?;
        Artifact::from_file(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use std::fs::{self, File};
    use tempfile::TempDir;
    use zip::ZipArchive;

    #[tokio::test]
    async fn test_packages_sources_without_manifest() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("web");
        fs::create_dir_all(src.join("lib")).unwrap();
        fs::write(src.join("index.mjs"), "export const handler = () => {}").unwrap();
        fs::write(src.join("lib/util.mjs"), "export default 1").unwrap();

        let config = BuildConfig::new(&src, dir.path().join("web.zip"), "nodejs20.x");
        let artifact = NodeBuilder::default()
            .build(&CancellationToken::new(), &config)
            .await
            .unwrap();

        let archive = ZipArchive::new(File::open(&artifact.path).unwrap()).unwrap();
        let mut names: Vec<_> = archive.file_names().map(String::from).collect();
        names.sort();
        assert_eq!(names, vec!["index.mjs", "lib/util.mjs"]);
    }

    #[tokio::test]
    async fn test_manifest_requires_npm() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.js"), "").unwrap();
        fs::write(dir.path().join(PACKAGE_JSON), "{}").unwrap();

        let config = BuildConfig::new(dir.path(), dir.path().join("out.zip"), "nodejs20.x");
        let result = NodeBuilder::default()
            .with_binary("forge-no-such-npm")
            .build(&CancellationToken::new(), &config)
            .await;

        assert!(matches!(result, Err(BuildError::ToolNotFound(_))));
    }
}
