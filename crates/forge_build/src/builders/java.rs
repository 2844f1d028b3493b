//! Java builder.
//!
//! Runs Maven and copies the produced jar to the output path. Lambda accepts
//! a jar as the deployment package directly.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::require_source_dir;
use crate::builder::Builder;
use crate::config::{Artifact, BuildConfig};
use crate::error::{BuildError, BuildResult};
use crate::process::{run_checked, CommandSpec};

const POM: &str = "pom.xml";
const EXCLUDED_JAR_SUFFIXES: &[&str] = &["-sources.jar", "-javadoc.jar", "-original.jar"];

/// Builds Java functions with Maven.
#[derive(Debug, Clone)]
pub struct JavaBuilder {
    mvn: String,
}

impl Default for JavaBuilder {
    fn default() -> Self {
        Self {
            mvn: "mvn".to_string(),
        }
    }
}

impl JavaBuilder {
    pub fn with_binary(mut self, mvn: impl Into<String>) -> Self {
        self.mvn = mvn.into();
        self
    }

    fn package_command(&self, config: &BuildConfig) -> CommandSpec {
        CommandSpec::new(&self.mvn)
            .args(["clean", "package", "-DskipTests"])
            .envs(&config.env)
            .current_dir(&config.source_dir)
    }
}

/// First deployable jar in `target/`, by name.
fn find_jar(target: &Path) -> BuildResult<PathBuf> {
    let mut jars: Vec<PathBuf> = fs::read_dir(target)
        .map_err(|_| BuildError::ArtifactNotFound(target.display().to_string()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            name.ends_with(".jar") && !EXCLUDED_JAR_SUFFIXES.iter().any(|s| name.ends_with(s))
        })
        .collect();
    jars.sort();

    jars.into_iter()
        .next()
        .ok_or_else(|| BuildError::ArtifactNotFound(format!("no jar in {}", target.display())))
}

#[async_trait]
impl Builder for JavaBuilder {
    async fn build(&self, ctx: &CancellationToken, config: &BuildConfig) -> BuildResult<Artifact> {
        require_source_dir(&config.source_dir)?;
        if !config.source_dir.join(POM).is_file() {
            return Err(BuildError::InvalidConfig(format!(
                "{} not found in {}",
                POM,
                config.source_dir.display()
            )));
        }

        run_checked(ctx, &self.package_command(config)).await?;

        let jar = find_jar(&config.source_dir.join("target"))?;
        debug!("Packaged jar {:?}", jar);

        let output = config.output_path_or("lambda.jar");
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&jar, &output)?;
        Artifact::from_file(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_jar_skips_secondary_jars() {
        let dir = TempDir::new().unwrap();
        for name in [
            "app-1.0-sources.jar",
            "app-1.0.jar",
            "app-1.0-javadoc.jar",
            "original-app-1.0.jar.txt",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let jar = find_jar(dir.path()).unwrap();
        assert_eq!(jar.file_name().unwrap(), "app-1.0.jar");
    }

    #[test]
    fn test_find_jar_empty_target() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(find_jar(dir.path()), Err(BuildError::ArtifactNotFound(_))));
        assert!(matches!(
            find_jar(&dir.path().join("missing")),
            Err(BuildError::ArtifactNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_requires_pom() {
        let dir = TempDir::new().unwrap();
        let config = BuildConfig::new(dir.path(), dir.path().join("out.jar"), "java21");

        let result = JavaBuilder::default().build(&CancellationToken::new(), &config).await;
        assert!(matches!(result, Err(BuildError::InvalidConfig(msg)) if msg.contains("pom.xml")));
    }
}
