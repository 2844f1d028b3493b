//! The builder abstraction.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::{Artifact, BuildConfig};
use crate::error::{BuildError, BuildResult};

/// Turns a build configuration into a deployment package.
///
/// Implementations must be safe to call from several tasks at once and must
/// observe `ctx`: a cancelled build stops external work and returns
/// [`BuildError::Cancelled`].
#[async_trait]
pub trait Builder: Send + Sync {
    async fn build(&self, ctx: &CancellationToken, config: &BuildConfig) -> BuildResult<Artifact>;
}

/// A builder shared between the registry, decorators and the driver.
pub type SharedBuilder = Arc<dyn Builder>;

/// Adapter that lets a plain function act as a [`Builder`].
pub struct FnBuilder<F> {
    f: F,
}

impl<F> FnBuilder<F>
where
    F: Fn(&BuildConfig) -> BuildResult<Artifact> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnBuilder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnBuilder").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Builder for FnBuilder<F>
where
    F: Fn(&BuildConfig) -> BuildResult<Artifact> + Send + Sync + 'static,
{
    async fn build(&self, ctx: &CancellationToken, config: &BuildConfig) -> BuildResult<Artifact> {
        if ctx.is_cancelled() {
            return Err(BuildError::Cancelled);
        }
        (self.f)(config)
    }
}

/// Wrap a function as a shared builder.
pub fn from_fn<F>(f: F) -> SharedBuilder
where
    F: Fn(&BuildConfig) -> BuildResult<Artifact> + Send + Sync + 'static,
{
    Arc::new(FnBuilder::new(f))
}
