//! Asset publisher trait.

use std::path::Path;

use async_trait::async_trait;

use crate::result::AppResult;

/// Exposes a source directory at a public URL.
///
/// Publishing must be idempotent: publishing the same directory twice
/// returns the same URL prefix.
#[async_trait]
pub trait AssetPublisher: Send + Sync + std::fmt::Debug {
    /// Publish `source` and return the URL prefix it is served under.
    async fn publish(&self, source: &Path) -> AppResult<String>;
}
