//! File store trait used by the lifecycle to stage, commit, and reclaim
//! files.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for the filesystem backing managed attributes.
///
/// Paths are absolute. Implementations must make [`rename`](Self::rename)
/// atomic when source and destination share a volume.
#[async_trait]
pub trait FileStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Whether a regular file exists at `path`.
    async fn is_file(&self, path: &Path) -> AppResult<bool>;

    /// Whether anything (file or directory) exists at `path`.
    async fn exists(&self, path: &Path) -> AppResult<bool>;

    /// Create a directory and any missing parents. Succeeds if it already
    /// exists.
    async fn create_dir(&self, path: &Path) -> AppResult<()>;

    /// Move a file. Overwrites the destination if present.
    async fn rename(&self, from: &Path, to: &Path) -> AppResult<()>;

    /// Delete a regular file. Returns `true` if a file was removed and
    /// `false` if there was nothing to remove.
    async fn delete(&self, path: &Path) -> AppResult<bool>;

    /// Read up to `len` leading bytes of a file.
    async fn read_head(&self, path: &Path, len: usize) -> AppResult<Bytes>;

    /// Classify a file's MIME type from its content. `None` when the file
    /// does not exist.
    async fn mime_type(&self, path: &Path) -> AppResult<Option<String>>;
}
