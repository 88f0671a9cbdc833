//! Publishes directories under a public web root.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::info;

use attachkit_core::config::{Aliases, PublishConfig, PublishMode};
use attachkit_core::error::{AppError, ErrorKind};
use attachkit_core::result::AppResult;
use attachkit_core::traits::publisher::AssetPublisher;

use crate::paths;

/// Length of the hashed directory name under the web root.
const HASH_LEN: usize = 8;

/// Exposes a source directory at `<base_path>/<hash>` and returns
/// `<base_url>/<hash>`.
#[derive(Debug, Clone)]
pub struct DirectoryPublisher {
    /// Directory served at `base_url`.
    base_path: PathBuf,
    /// URL of `base_path`, without trailing slash.
    base_url: String,
    /// Link or copy.
    mode: PublishMode,
}

impl DirectoryPublisher {
    /// Create a publisher rooted at an already resolved directory.
    pub fn new(
        base_path: impl Into<PathBuf>,
        base_url: &str,
        mode: PublishMode,
    ) -> AppResult<Self> {
        Ok(Self {
            base_path: paths::normalize(&base_path.into())?,
            base_url: base_url.trim_end_matches('/').to_string(),
            mode,
        })
    }

    /// Create a publisher from configuration, expanding path aliases.
    pub fn from_config(config: &PublishConfig, aliases: &Aliases) -> AppResult<Self> {
        let base_path = aliases.resolve(&config.base_path)?;
        Self::new(base_path, &config.base_url, config.mode)
    }

    /// Hashed directory name for a normalized source path.
    pub fn hash_for(source: &Path) -> String {
        let digest = Sha256::digest(source.to_string_lossy().as_bytes());
        let hex = format!("{digest:x}");
        hex[..HASH_LEN].to_string()
    }

    async fn expose(&self, source: &Path, target: &Path) -> AppResult<()> {
        match self.mode {
            PublishMode::Link => link_dir(source, target).await,
            PublishMode::Copy => copy_dir(source, target).await,
        }
    }
}

#[async_trait]
impl AssetPublisher for DirectoryPublisher {
    async fn publish(&self, source: &Path) -> AppResult<String> {
        let source = paths::normalize(source)?;
        let hash = Self::hash_for(&source);
        let target = self.base_path.join(&hash);
        let url = format!("{}/{}", self.base_url, hash);

        if fs::symlink_metadata(&target).await.is_ok() {
            return Ok(url);
        }

        fs::create_dir_all(&source).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create source directory: {}", source.display()),
                e,
            )
        })?;
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create web root: {}", self.base_path.display()),
                e,
            )
        })?;

        self.expose(&source, &target).await?;
        info!(source = %source.display(), url = %url, mode = ?self.mode, "Published directory");
        Ok(url)
    }
}

#[cfg(unix)]
async fn link_dir(source: &Path, target: &Path) -> AppResult<()> {
    match fs::symlink(source, target).await {
        Ok(()) => Ok(()),
        // Another publisher won the race for the same source.
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to link {} -> {}", target.display(), source.display()),
            e,
        )),
    }
}

#[cfg(not(unix))]
async fn link_dir(source: &Path, target: &Path) -> AppResult<()> {
    copy_dir(source, target).await
}

/// Recursively copy the current contents of `source` into `target`.
async fn copy_dir(source: &Path, target: &Path) -> AppResult<()> {
    let mut pending = vec![(source.to_path_buf(), target.to_path_buf())];

    while let Some((from, to)) = pending.pop() {
        fs::create_dir_all(&to).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create directory: {}", to.display()),
                e,
            )
        })?;

        let mut dir = fs::read_dir(&from).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to list directory: {}", from.display()),
                e,
            )
        })?;
        while let Some(entry) = dir.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
        })? {
            let file_type = entry.file_type().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to get entry type", e)
            })?;
            let dest = to.join(entry.file_name());
            if file_type.is_dir() {
                pending.push((entry.path(), dest));
            } else {
                fs::copy(entry.path(), &dest).await.map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to copy {}", entry.path().display()),
                        e,
                    )
                })?;
            }
        }
    }
    Ok(())
}
