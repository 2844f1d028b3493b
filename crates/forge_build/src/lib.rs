//! # forge_build
//!
//! Build layer for forge.
//!
//! This crate turns a [`BuildConfig`] into an [`Artifact`]: a deployment
//! package on disk identified by its SHA-256 checksum.
//!
//! # Architecture
//!
//! - **Builders**: one [`Builder`] per runtime family (Go, Python, Node.js, Java)
//! - **Registry**: maps runtime identifiers to builders, open to external registration
//! - **Decorators**: cross-cutting wrappers (cache, logging) composed around any builder
//! - **Cache**: process-local artifact memo keyed by configuration identity
//! - **Driver**: ordered, fail-fast execution of many configurations
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use forge_build::{
//!     build_all, compose, with_cache, with_logging, BuildConfig, BuilderRegistry,
//!     MemoryCache, TracingLogger,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> forge_build::BuildResult<()> {
//! let decorator = compose(vec![
//!     with_logging(Arc::new(TracingLogger)),
//!     with_cache(Arc::new(MemoryCache::new())),
//! ]);
//! let registry = BuilderRegistry::with_defaults().decorate(&decorator);
//!
//! let configs = vec![BuildConfig::new("src/functions/api", ".forge/build/api.zip", "python3.13")];
//! let artifacts = build_all(&CancellationToken::new(), &configs, &registry, |i, n| {
//!     println!("[{}/{}]", i + 1, n);
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod builders;
pub mod cache;
pub mod config;
pub mod decorator;
pub mod driver;
pub mod error;
pub mod hash;
pub mod package;
pub mod process;
pub mod registry;
pub mod runtime;

pub use builder::{from_fn, Builder, FnBuilder, SharedBuilder};
pub use builders::{GoBuilder, JavaBuilder, NodeBuilder, PythonBuilder};
pub use cache::{ArtifactCache, CacheKey, CacheKeyStrategy, MemoryCache};
pub use config::{Artifact, BuildConfig};
pub use decorator::{
    compose, with_cache, with_cache_keyed, with_logging, BuildLogger, Decorator, TracingLogger,
};
pub use driver::{build_all, build_all_concurrent, build_all_partial, FailedBuild, PartialBuild};
pub use error::{BuildError, BuildResult};
pub use process::{CommandOutput, CommandSpec};
pub use registry::BuilderRegistry;
