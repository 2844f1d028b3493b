//! Runtime to builder registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::builder::SharedBuilder;
use crate::builders::{GoBuilder, JavaBuilder, NodeBuilder, PythonBuilder};
use crate::decorator::Decorator;
use crate::error::{BuildError, BuildResult};
use crate::runtime;

/// Maps runtime identifiers to builders.
///
/// Registration is open: callers may add or replace entries for any runtime
/// string. Populate the registry before sharing it across tasks.
#[derive(Clone, Default)]
pub struct BuilderRegistry {
    builders: HashMap<String, SharedBuilder>,
}

impl BuilderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in runtime families registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let go: SharedBuilder = Arc::new(GoBuilder::default());
        for rt in runtime::GO_RUNTIMES {
            registry.register(*rt, go.clone());
        }

        let python: SharedBuilder = Arc::new(PythonBuilder::default());
        for rt in runtime::PYTHON_RUNTIMES {
            registry.register(*rt, python.clone());
        }

        let node: SharedBuilder = Arc::new(NodeBuilder::default());
        for rt in runtime::NODE_RUNTIMES {
            registry.register(*rt, node.clone());
        }

        let java: SharedBuilder = Arc::new(JavaBuilder::default());
        for rt in runtime::JAVA_RUNTIMES {
            registry.register(*rt, java.clone());
        }

        registry
    }

    /// Register a builder for a runtime, replacing any previous entry.
    pub fn register(&mut self, runtime: impl Into<String>, builder: SharedBuilder) {
        let runtime = runtime.into();
        debug!("Registering builder for runtime: {}", runtime);
        self.builders.insert(runtime, builder);
    }

    /// Remove the builder for a runtime.
    pub fn unregister(&mut self, runtime: &str) -> Option<SharedBuilder> {
        self.builders.remove(runtime)
    }

    /// Look up the builder for a runtime.
    pub fn resolve(&self, runtime: &str) -> Option<SharedBuilder> {
        self.builders.get(runtime).cloned()
    }

    /// Look up the builder for a runtime, failing when none is registered.
    pub fn resolve_required(&self, runtime: &str) -> BuildResult<SharedBuilder> {
        self.resolve(runtime)
            .ok_or_else(|| BuildError::UnsupportedRuntime(runtime.to_string()))
    }

    pub fn contains(&self, runtime: &str) -> bool {
        self.builders.contains_key(runtime)
    }

    /// Registered runtime identifiers, sorted.
    pub fn runtimes(&self) -> Vec<&str> {
        let mut runtimes: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        runtimes.sort_unstable();
        runtimes
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Return a registry whose every builder is wrapped by `decorator`.
    pub fn decorate(&self, decorator: &Decorator) -> Self {
        let builders = self
            .builders
            .iter()
            .map(|(runtime, builder)| (runtime.clone(), (**decorator)(builder.clone())))
            .collect();
        Self { builders }
    }
}

impl fmt::Debug for BuilderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderRegistry")
            .field("runtimes", &self.runtimes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::from_fn;
    use crate::config::{Artifact, BuildConfig};
    use tokio_util::sync::CancellationToken;

    #[test]
    fn test_defaults_cover_runtime_families() {
        let registry = BuilderRegistry::with_defaults();

        for rt in [
            "go1.x",
            "provided.al2",
            "provided.al2023",
            "python3.9",
            "python3.13",
            "nodejs18.x",
            "nodejs22.x",
            "java11",
            "java21",
        ] {
            assert!(registry.contains(rt), "missing builder for {}", rt);
        }
        assert_eq!(registry.len(), 14);
    }

    #[test]
    fn test_resolve_unknown_runtime() {
        let registry = BuilderRegistry::with_defaults();

        assert!(registry.resolve("ruby3.3").is_none());
        assert!(matches!(
            registry.resolve_required("ruby3.3"),
            Err(BuildError::UnsupportedRuntime(rt)) if rt == "ruby3.3"
        ));
    }

    #[tokio::test]
    async fn test_register_replaces_existing() {
        let mut registry = BuilderRegistry::with_defaults();
        registry.register(
            "python3.13",
            from_fn(|config| Ok(Artifact::new(&config.output_path, "custom", 0))),
        );

        let builder = registry.resolve("python3.13").unwrap();
        let artifact = builder
            .build(
                &CancellationToken::new(),
                &BuildConfig::new("/src", "/out.zip", "python3.13"),
            )
            .await
            .unwrap();
        assert_eq!(artifact.checksum, "custom");
    }

    #[test]
    fn test_runtimes_sorted_and_unregister() {
        let mut registry = BuilderRegistry::new();
        let builder = from_fn(|config| Ok(Artifact::new(&config.output_path, "x", 0)));
        registry.register("b", builder.clone());
        registry.register("a", builder);

        assert_eq!(registry.runtimes(), vec!["a", "b"]);
        assert!(registry.unregister("a").is_some());
        assert_eq!(registry.runtimes(), vec!["b"]);
        assert!(!registry.is_empty());
    }
}
