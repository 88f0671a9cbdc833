//! Local filesystem file store.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::debug;

use attachkit_core::error::{AppError, ErrorKind};
use attachkit_core::result::AppResult;
use attachkit_core::traits::storage::FileStore;

use crate::mime;

/// Local filesystem file store.
///
/// Operates on absolute paths; directory layout is owned by the caller.
#[derive(Debug, Clone, Default)]
pub struct LocalFileStore;

impl LocalFileStore {
    /// Create a new local file store.
    pub fn new() -> Self {
        Self
    }

    /// Move a file across volumes: copy, then remove the source. A partial
    /// destination is removed if the copy fails.
    async fn move_across_devices(from: &Path, to: &Path) -> AppResult<()> {
        if let Err(e) = fs::copy(from, to).await {
            let _ = fs::remove_file(to).await;
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to copy {} -> {}", from.display(), to.display()),
                e,
            ));
        }
        fs::remove_file(from).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to remove moved source: {}", from.display()),
                e,
            )
        })?;
        Ok(())
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn is_file(&self, path: &Path) -> AppResult<bool> {
        match fs::metadata(path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to stat: {}", path.display()),
                e,
            )),
        }
    }

    async fn exists(&self, path: &Path) -> AppResult<bool> {
        fs::try_exists(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to stat: {}", path.display()),
                e,
            )
        })
    }

    async fn create_dir(&self, path: &Path) -> AppResult<()> {
        fs::create_dir_all(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create directory: {}", path.display()),
                e,
            )
        })
    }

    async fn rename(&self, from: &Path, to: &Path) -> AppResult<()> {
        match fs::rename(from, to).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
                debug!(
                    from = %from.display(),
                    to = %to.display(),
                    "Rename crosses devices, copying"
                );
                Self::move_across_devices(from, to).await?;
            }
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to rename {} -> {}", from.display(), to.display()),
                    e,
                ));
            }
        }
        debug!(from = %from.display(), to = %to.display(), "Moved file");
        Ok(())
    }

    async fn delete(&self, path: &Path) -> AppResult<bool> {
        if !self.is_file(path).await? {
            return Ok(false);
        }
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Deleted file");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete file: {}", path.display()),
                e,
            )),
        }
    }

    async fn read_head(&self, path: &Path, len: usize) -> AppResult<Bytes> {
        let file = fs::File::open(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("File not found: {}", path.display()))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open file: {}", path.display()),
                    e,
                )
            }
        })?;

        let mut buf = Vec::with_capacity(len);
        file.take(len as u64)
            .read_to_end(&mut buf)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read file: {}", path.display()),
                    e,
                )
            })?;
        Ok(Bytes::from(buf))
    }

    async fn mime_type(&self, path: &Path) -> AppResult<Option<String>> {
        if !self.is_file(path).await? {
            return Ok(None);
        }
        let head = self.read_head(path, mime::SNIFF_LEN).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Some(mime::detect(&head, &name)))
    }
}
