//! Process-local artifact cache.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{Artifact, BuildConfig};
use crate::hash::sha256_tree;

/// How cache keys are derived from a build configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheKeyStrategy {
    /// Source directory and runtime only. Edits between builds in the same
    /// process are not detected.
    #[default]
    Configuration,
    /// Source directory, runtime and a digest of every source file.
    #[serde(alias = "content")]
    ContentDigest,
}

/// Identity of a cached build.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a configuration.
    ///
    /// With [`CacheKeyStrategy::ContentDigest`], an unreadable source tree
    /// falls back to the configuration identity.
    pub fn for_config(config: &BuildConfig, strategy: CacheKeyStrategy) -> Self {
        let base = format!("{}:{}", config.source_dir.display(), config.runtime);
        match strategy {
            CacheKeyStrategy::Configuration => Self(base),
            CacheKeyStrategy::ContentDigest => match sha256_tree(&config.source_dir) {
                Ok(digest) => Self(format!("{}:{}", base, digest)),
                Err(e) => {
                    warn!("Cannot digest {:?}: {}", config.source_dir, e);
                    Self(base)
                }
            },
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage for built artifacts.
///
/// Implementations must tolerate concurrent `get`/`insert` and must never
/// hand out a partially written entry.
pub trait ArtifactCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Artifact>;
    fn insert(&self, key: CacheKey, artifact: Artifact);
}

/// In-memory cache guarded by a read-write lock.
///
/// When two builds race on the same key the first insert wins; later inserts
/// for that key are ignored.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<CacheKey, Artifact>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl ArtifactCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<Artifact> {
        self.entries.read().get(key).cloned()
    }

    fn insert(&self, key: CacheKey, artifact: Artifact) {
        self.entries.write().entry(key).or_insert(artifact);
    }
}
