//! Memoizing publisher wrapper.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use attachkit_core::result::AppResult;
use attachkit_core::traits::publisher::AssetPublisher;

/// Caches published URL prefixes per source directory.
///
/// The inner publisher is invoked at most once per distinct source path
/// (concurrent first calls may race; the first inserted URL wins, which is
/// harmless because publishing is idempotent). The cache lives as long as
/// this value; share it by reference or `Arc` between lifecycles that
/// should reuse results.
#[derive(Debug)]
pub struct CachedPublisher<P> {
    inner: P,
    cache: DashMap<PathBuf, String>,
}

impl<P: AssetPublisher> CachedPublisher<P> {
    /// Wrap a publisher with an empty cache.
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    /// Whether `source` has already been published through this cache.
    pub fn is_cached(&self, source: &Path) -> bool {
        self.cache.contains_key(source)
    }

    /// Number of cached source paths.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether nothing has been published yet.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// The wrapped publisher.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: AssetPublisher> AssetPublisher for CachedPublisher<P> {
    async fn publish(&self, source: &Path) -> AppResult<String> {
        if let Some(url) = self.cache.get(source) {
            debug!(source = %source.display(), "Publish cache hit");
            return Ok(url.value().clone());
        }

        let url = self.inner.publish(source).await?;
        let stored = self
            .cache
            .entry(source.to_path_buf())
            .or_insert(url)
            .value()
            .clone();
        Ok(stored)
    }
}
