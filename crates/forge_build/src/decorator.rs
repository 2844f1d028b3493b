//! Cross-cutting builder wrappers.
//!
//! A [`Decorator`] takes a builder and returns a new builder with the same
//! contract. Decorators compose: `compose(vec![a, b])` produces
//! `a(b(builder))`, so `a` observes every call first.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::builder::{Builder, SharedBuilder};
use crate::cache::{ArtifactCache, CacheKey, CacheKeyStrategy};
use crate::config::{Artifact, BuildConfig};
use crate::error::BuildResult;

/// A builder transformer.
pub type Decorator = Arc<dyn Fn(SharedBuilder) -> SharedBuilder + Send + Sync>;

/// Structured sink for build logs.
pub trait BuildLogger: Send + Sync {
    fn info(&self, message: &str, fields: &[(&str, String)]);
    fn error(&self, message: &str, fields: &[(&str, String)]);
}

/// [`BuildLogger`] that forwards to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

fn render_fields(fields: &[(&str, String)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}

impl BuildLogger for TracingLogger {
    fn info(&self, message: &str, fields: &[(&str, String)]) {
        info!(fields = %render_fields(fields), "{}", message);
    }

    fn error(&self, message: &str, fields: &[(&str, String)]) {
        error!(fields = %render_fields(fields), "{}", message);
    }
}

struct Cached {
    inner: SharedBuilder,
    cache: Arc<dyn ArtifactCache>,
    strategy: CacheKeyStrategy,
}

#[async_trait]
impl Builder for Cached {
    async fn build(&self, ctx: &CancellationToken, config: &BuildConfig) -> BuildResult<Artifact> {
        let key = CacheKey::for_config(config, self.strategy);
        if let Some(artifact) = self.cache.get(&key) {
            debug!("Cache hit: {}", key);
            return Ok(artifact);
        }

        debug!("Cache miss: {}", key);
        let artifact = self.inner.build(ctx, config).await?;
        self.cache.insert(key, artifact.clone());
        Ok(artifact)
    }
}

struct Logged {
    inner: SharedBuilder,
    logger: Arc<dyn BuildLogger>,
}

#[async_trait]
impl Builder for Logged {
    async fn build(&self, ctx: &CancellationToken, config: &BuildConfig) -> BuildResult<Artifact> {
        self.logger.info(
            "Building",
            &[
                ("runtime", config.runtime.clone()),
                ("source", config.source_dir.display().to_string()),
            ],
        );

        match self.inner.build(ctx, config).await {
            Ok(artifact) => {
                self.logger.info(
                    "Build succeeded",
                    &[
                        ("artifact", artifact.path.display().to_string()),
                        ("size", artifact.size.to_string()),
                    ],
                );
                Ok(artifact)
            }
            Err(e) => {
                self.logger.error(
                    "Build failed",
                    &[
                        ("runtime", config.runtime.clone()),
                        ("error", e.to_string()),
                    ],
                );
                Err(e)
            }
        }
    }
}

/// Memoize successful builds keyed by configuration identity.
pub fn with_cache(cache: Arc<dyn ArtifactCache>) -> Decorator {
    with_cache_keyed(cache, CacheKeyStrategy::default())
}

/// Memoize successful builds using the given key strategy. Failures are
/// never cached.
pub fn with_cache_keyed(cache: Arc<dyn ArtifactCache>, strategy: CacheKeyStrategy) -> Decorator {
    Arc::new(move |inner: SharedBuilder| -> SharedBuilder {
        Arc::new(Cached {
            inner,
            cache: cache.clone(),
            strategy,
        })
    })
}

/// Log the start and outcome of every build.
pub fn with_logging(logger: Arc<dyn BuildLogger>) -> Decorator {
    Arc::new(move |inner: SharedBuilder| -> SharedBuilder {
        Arc::new(Logged {
            inner,
            logger: logger.clone(),
        })
    })
}

/// Combine decorators; the first one listed is outermost.
///
/// An empty list yields the identity decorator.
pub fn compose(decorators: Vec<Decorator>) -> Decorator {
    Arc::new(move |builder: SharedBuilder| -> SharedBuilder {
        decorators
            .iter()
            .rev()
            .fold(builder, |acc, decorator| (**decorator)(acc))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::from_fn;
    use crate::cache::MemoryCache;
    use crate::error::BuildError;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config() -> BuildConfig {
        BuildConfig::new("/src/api", "/build/api.zip", "python3.13")
    }

    fn counting_builder(count: Arc<AtomicUsize>) -> SharedBuilder {
        from_fn(move |config| {
            let n = count.fetch_add(1, Ordering::SeqCst);
            Ok(Artifact::new(&config.output_path, format!("build-{}", n), 1))
        })
    }

    /// Records every message it receives.
    #[derive(Default)]
    struct RecordingLogger {
        lines: Mutex<Vec<String>>,
    }

    impl BuildLogger for RecordingLogger {
        fn info(&self, message: &str, fields: &[(&str, String)]) {
            self.lines
                .lock()
                .push(format!("INFO {} {}", message, render_fields(fields)));
        }

        fn error(&self, message: &str, fields: &[(&str, String)]) {
            self.lines
                .lock()
                .push(format!("ERROR {} {}", message, render_fields(fields)));
        }
    }

    #[tokio::test]
    async fn test_cache_hit_skips_inner_builder() {
        let count = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(MemoryCache::new());
        let builder = with_cache(cache.clone())(counting_builder(count.clone()));
        let ctx = CancellationToken::new();

        let first = builder.build(&ctx, &config()).await.unwrap();
        let second = builder.build(&ctx, &config()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_source_dirs_each_build() {
        let count = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(MemoryCache::new());
        let builder = with_cache(cache.clone())(counting_builder(count.clone()));
        let ctx = CancellationToken::new();
        let other = BuildConfig::new("/src/users", "/build/users.zip", "python3.13");

        let first = builder.build(&ctx, &config()).await.unwrap();
        let second = builder.build(&ctx, &other).await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_ne!(first.checksum, second.checksum);
        assert_eq!(second.path, std::path::PathBuf::from("/build/users.zip"));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_cache_does_not_store_failures() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let cache = Arc::new(MemoryCache::new());
        let builder = with_cache(cache.clone())(from_fn(move |config| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(BuildError::InvalidConfig("first attempt".to_string()))
            } else {
                Ok(Artifact::new(&config.output_path, "ok", 1))
            }
        }));
        let ctx = CancellationToken::new();

        assert!(builder.build(&ctx, &config()).await.is_err());
        assert!(cache.is_empty());
        assert!(builder.build(&ctx, &config()).await.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_logging_records_start_and_outcome() {
        let logger = Arc::new(RecordingLogger::default());
        let builder = with_logging(logger.clone())(from_fn(|_| {
            Err(BuildError::ToolNotFound("pip".to_string()))
        }));

        let result = builder.build(&CancellationToken::new(), &config()).await;

        assert!(matches!(result, Err(BuildError::ToolNotFound(_))));
        let lines = logger.lines.lock();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("INFO Building runtime=python3.13"));
        assert!(lines[1].starts_with("ERROR Build failed"));
        assert!(lines[1].contains("pip"));
    }

    #[tokio::test]
    async fn test_compose_first_is_outermost() {
        let count = Arc::new(AtomicUsize::new(0));
        let logger = Arc::new(RecordingLogger::default());
        let cache = Arc::new(MemoryCache::new());

        // Logging outside the cache sees cache hits as builds.
        let decorator = compose(vec![with_logging(logger.clone()), with_cache(cache)]);
        let builder = decorator(counting_builder(count.clone()));
        let ctx = CancellationToken::new();

        builder.build(&ctx, &config()).await.unwrap();
        builder.build(&ctx, &config()).await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(logger.lines.lock().len(), 4);
    }

    #[tokio::test]
    async fn test_compose_inner_logging_skipped_on_hit() {
        let count = Arc::new(AtomicUsize::new(0));
        let logger = Arc::new(RecordingLogger::default());
        let cache = Arc::new(MemoryCache::new());

        let decorator = compose(vec![with_cache(cache), with_logging(logger.clone())]);
        let builder = decorator(counting_builder(count.clone()));
        let ctx = CancellationToken::new();

        builder.build(&ctx, &config()).await.unwrap();
        builder.build(&ctx, &config()).await.unwrap();

        assert_eq!(logger.lines.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_compose_empty_is_identity() {
        let count = Arc::new(AtomicUsize::new(0));
        let builder = compose(Vec::new())(counting_builder(count.clone()));

        let artifact = builder.build(&CancellationToken::new(), &config()).await.unwrap();
        assert_eq!(artifact.checksum, "build-0");
    }
}
