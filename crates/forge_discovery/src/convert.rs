//! Function descriptor to build configuration.

use std::path::{Path, PathBuf};

use forge_build::BuildConfig;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::function::Function;

/// Build directory of a project.
pub fn build_dir(root: &Path) -> PathBuf {
    root.join(".forge").join("build")
}

/// Package path for a function inside a build directory.
pub fn artifact_path(build_dir: &Path, name: &str) -> PathBuf {
    build_dir.join(format!("{}.zip", name))
}

/// Derive the build configuration for a function.
pub fn to_build_config(function: &Function, build_dir: &Path) -> DiscoveryResult<BuildConfig> {
    let invalid = |message: &str| DiscoveryError::InvalidFunction {
        function: function.name.clone(),
        message: message.to_string(),
    };

    if function.name.is_empty() {
        return Err(invalid("function name cannot be empty"));
    }
    if function.runtime.is_empty() {
        return Err(invalid("function runtime cannot be empty"));
    }
    if function.path.as_os_str().is_empty() {
        return Err(invalid("function path cannot be empty"));
    }
    if build_dir.as_os_str().is_empty() {
        return Err(invalid("build directory cannot be empty"));
    }

    Ok(BuildConfig::new(
        &function.path,
        artifact_path(build_dir, &function.name),
        &function.runtime,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_from_function() {
        let function = Function::new("api", "/p/src/functions/api", "nodejs20.x", "index.js");
        let config = to_build_config(&function, Path::new("/p/.forge/build")).unwrap();

        assert_eq!(config.source_dir, PathBuf::from("/p/src/functions/api"));
        assert_eq!(config.output_path, PathBuf::from("/p/.forge/build/api.zip"));
        assert_eq!(config.runtime, "nodejs20.x");
        assert_eq!(config.handler, "index.handler");
        assert!(config.env.is_empty());
    }

    #[test]
    fn test_go_handler_is_bootstrap() {
        let function = Function::new("worker", "/p/worker", "provided.al2023", "main.go");
        let config = to_build_config(&function, Path::new("/b")).unwrap();
        assert_eq!(config.handler, "bootstrap");
    }

    #[test]
    fn test_validation() {
        let build = Path::new("/b");
        let cases = [
            Function::new("", "/p/a", "python3.13", "app.py"),
            Function::new("a", "/p/a", "", "app.py"),
            Function::new("a", "", "python3.13", "app.py"),
        ];
        for function in &cases {
            assert!(matches!(
                to_build_config(function, build),
                Err(DiscoveryError::InvalidFunction { .. })
            ));
        }

        let function = Function::new("a", "/p/a", "python3.13", "app.py");
        assert!(to_build_config(&function, Path::new("")).is_err());
    }

    #[test]
    fn test_build_dir_layout() {
        assert_eq!(build_dir(Path::new("/p")), PathBuf::from("/p/.forge/build"));
        assert_eq!(artifact_path(Path::new("/b"), "api"), PathBuf::from("/b/api.zip"));
    }
}
