//! Building many configurations.
//!
//! Results are always reported in input order. With a concurrency limit of one
//! the builds run strictly one after another and stop at the first failure;
//! a higher limit keeps up to that many builds in flight, still stopping new
//! work once a failure has been observed in order.

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{Artifact, BuildConfig};
use crate::error::{BuildError, BuildResult};
use crate::registry::BuilderRegistry;

/// The first failing configuration of a batch.
#[derive(Debug)]
pub struct FailedBuild {
    /// Position of the configuration in the input slice
    pub index: usize,
    pub error: BuildError,
}

/// Outcome of a batch that may have stopped early.
#[derive(Debug, Default)]
pub struct PartialBuild {
    /// Artifacts for the configurations that completed, in input order
    pub artifacts: Vec<Artifact>,
    pub failure: Option<FailedBuild>,
}

impl PartialBuild {
    pub fn into_result(self) -> BuildResult<Vec<Artifact>> {
        match self.failure {
            Some(failed) => Err(failed.error),
            None => Ok(self.artifacts),
        }
    }
}

async fn build_one(
    ctx: &CancellationToken,
    config: &BuildConfig,
    registry: &BuilderRegistry,
) -> BuildResult<Artifact> {
    if ctx.is_cancelled() {
        return Err(BuildError::Cancelled);
    }
    let builder = registry.resolve_required(&config.runtime)?;
    builder.build(ctx, config).await
}

/// Build every configuration, keeping up to `limit` builds in flight.
///
/// `on_progress(i, n)` is called in index order just before configuration
/// `i` is started. On failure the returned value carries the artifacts that
/// completed before the failing index together with that index.
pub async fn build_all_partial<F>(
    ctx: &CancellationToken,
    configs: &[BuildConfig],
    registry: &BuilderRegistry,
    limit: usize,
    mut on_progress: F,
) -> PartialBuild
where
    F: FnMut(usize, usize),
{
    let total = configs.len();
    let mut result = PartialBuild {
        artifacts: Vec::with_capacity(total),
        failure: None,
    };

    // A child token lets a failure stop builds still queued behind it
    // without cancelling the caller's token.
    let batch = ctx.child_token();
    let limit = limit.max(1);
    debug!("Building {} configuration(s), concurrency {}", total, limit);

    // Indices, not `configs.iter()`, so the futures borrow `configs` at its
    // own lifetime and stay usable inside `async_trait` methods.
    let mut builds = stream::iter(0..total)
        .map(|index| {
            let config = &configs[index];
            // Configurations are pulled in index order as slots free up.
            on_progress(index, total);
            let batch = batch.clone();
            async move { (index, build_one(&batch, config, registry).await) }
        })
        .buffered(limit);

    while let Some((index, outcome)) = builds.next().await {
        match outcome {
            Ok(artifact) => result.artifacts.push(artifact),
            Err(error) => {
                warn!("Build {} of {} failed: {}", index + 1, total, error);
                // Report the caller's cancellation, not our own.
                let error = if ctx.is_cancelled() {
                    BuildError::Cancelled
                } else {
                    error
                };
                batch.cancel();
                result.failure = Some(FailedBuild { index, error });
                break;
            }
        }
    }

    result
}

/// Build every configuration sequentially, stopping at the first failure.
pub async fn build_all<F>(
    ctx: &CancellationToken,
    configs: &[BuildConfig],
    registry: &BuilderRegistry,
    on_progress: F,
) -> BuildResult<Vec<Artifact>>
where
    F: FnMut(usize, usize),
{
    build_all_partial(ctx, configs, registry, 1, on_progress)
        .await
        .into_result()
}

/// Build with up to `limit` builds in flight. A limit of one is identical to
/// [`build_all`].
pub async fn build_all_concurrent<F>(
    ctx: &CancellationToken,
    configs: &[BuildConfig],
    registry: &BuilderRegistry,
    limit: usize,
    on_progress: F,
) -> BuildResult<Vec<Artifact>>
where
    F: FnMut(usize, usize),
{
    build_all_partial(ctx, configs, registry, limit, on_progress)
        .await
        .into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::from_fn;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn registry_with(runtime: &str, calls: Arc<Mutex<Vec<String>>>) -> BuilderRegistry {
        let mut registry = BuilderRegistry::new();
        registry.register(
            runtime,
            from_fn(move |config| {
                let name = config.source_dir.display().to_string();
                calls.lock().push(name.clone());
                if name.ends_with("bad") {
                    return Err(BuildError::InvalidConfig(name));
                }
                Ok(Artifact::new(&config.output_path, name, 1))
            }),
        );
        registry
    }

    fn configs(names: &[&str], runtime: &str) -> Vec<BuildConfig> {
        names
            .iter()
            .map(|n| BuildConfig::new(*n, format!("{}.zip", n), runtime))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_input() {
        let progress = AtomicUsize::new(0);
        let artifacts = build_all(
            &CancellationToken::new(),
            &[],
            &BuilderRegistry::new(),
            |_, _| {
                progress.fetch_add(1, Ordering::SeqCst);
            },
        )
        .await
        .unwrap();

        assert!(artifacts.is_empty());
        assert_eq!(progress.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_results_in_input_order_with_progress() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let registry = registry_with("test", calls.clone());
        let mut progress = Vec::new();

        let artifacts = build_all(
            &CancellationToken::new(),
            &configs(&["a", "b", "c"], "test"),
            &registry,
            |i, n| progress.push((i, n)),
        )
        .await
        .unwrap();

        let checksums: Vec<_> = artifacts.iter().map(|a| a.checksum.as_str()).collect();
        assert_eq!(checksums, vec!["a", "b", "c"]);
        assert_eq!(progress, vec![(0, 3), (1, 3), (2, 3)]);
    }

    #[tokio::test]
    async fn test_sequential_stops_at_first_failure() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let registry = registry_with("test", calls.clone());

        let mut progress = Vec::new();
        let partial = build_all_partial(
            &CancellationToken::new(),
            &configs(&["a", "bad", "c"], "test"),
            &registry,
            1,
            |i, _| progress.push(i),
        )
        .await;

        assert_eq!(progress, vec![0, 1]);

        assert_eq!(partial.artifacts.len(), 1);
        let failure = partial.failure.unwrap();
        assert_eq!(failure.index, 1);
        assert!(matches!(failure.error, BuildError::InvalidConfig(_)));
        assert_eq!(*calls.lock(), vec!["a", "bad"]);
    }

    #[tokio::test]
    async fn test_unsupported_runtime_stops_batch() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let registry = registry_with("test", calls.clone());
        let mut batch = configs(&["a"], "test");
        batch.push(BuildConfig::new("b", "b.zip", "ruby3.3"));
        batch.extend(configs(&["c"], "test"));

        let result = build_all(&CancellationToken::new(), &batch, &registry, |_, _| {}).await;

        assert!(matches!(result, Err(BuildError::UnsupportedRuntime(rt)) if rt == "ruby3.3"));
        assert_eq!(*calls.lock(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_cancelled_context_builds_nothing() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let registry = registry_with("test", calls.clone());
        let token = CancellationToken::new();
        token.cancel();

        let result = build_all(&token, &configs(&["a", "b"], "test"), &registry, |_, _| {}).await;

        assert!(matches!(result, Err(BuildError::Cancelled)));
        assert!(calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_preserves_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let registry = registry_with("test", calls.clone());
        let names = ["a", "b", "c", "d", "e"];

        let artifacts = build_all_concurrent(
            &CancellationToken::new(),
            &configs(&names, "test"),
            &registry,
            3,
            |_, _| {},
        )
        .await
        .unwrap();

        let checksums: Vec<_> = artifacts.iter().map(|a| a.checksum.as_str()).collect();
        assert_eq!(checksums, names.to_vec());
    }

    #[tokio::test]
    async fn test_zero_limit_treated_as_sequential() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let registry = registry_with("test", calls.clone());

        let artifacts = build_all_concurrent(
            &CancellationToken::new(),
            &configs(&["a", "b"], "test"),
            &registry,
            0,
            |_, _| {},
        )
        .await
        .unwrap();

        assert_eq!(artifacts.len(), 2);
    }
}
