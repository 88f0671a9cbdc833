//! Removal of uploaded files by name, for "discard this upload" requests.
//!
//! The HTTP endpoint lives in the embedding application; it hands the
//! request body parameters to [`StagedFileRemover::remove_from_params`].
//! Names are checked to stay inside the configured directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use attachkit_core::config::Aliases;
use attachkit_core::error::AppError;
use attachkit_core::result::AppResult;
use attachkit_core::traits::storage::FileStore;
use attachkit_storage::paths;

use crate::mapping::AttributeMapping;

/// Default request parameter carrying the file name.
pub const DEFAULT_UPLOAD_PARAM: &str = "file";

/// Deletes named files from one directory.
#[derive(Debug, Clone)]
pub struct StagedFileRemover {
    /// Directory files are removed from.
    dir: PathBuf,
    /// Request parameter holding the file name.
    upload_param: String,
    store: Arc<dyn FileStore>,
}

impl StagedFileRemover {
    /// Create a remover for a configured directory (aliases allowed).
    pub fn new(dir: &str, aliases: &Aliases, store: Arc<dyn FileStore>) -> AppResult<Self> {
        if dir.trim().is_empty() {
            return Err(AppError::configuration("Upload directory must be set"));
        }
        let dir = paths::normalize(Path::new(&aliases.resolve(dir)?))?;
        Ok(Self {
            dir,
            upload_param: DEFAULT_UPLOAD_PARAM.to_string(),
            store,
        })
    }

    /// Create a remover for an attribute's staging directory.
    pub fn for_staging(mapping: &AttributeMapping, store: Arc<dyn FileStore>) -> Self {
        Self {
            dir: mapping.temp_path().to_path_buf(),
            upload_param: DEFAULT_UPLOAD_PARAM.to_string(),
            store,
        }
    }

    /// Use a different request parameter name.
    pub fn with_upload_param(mut self, name: impl Into<String>) -> Self {
        self.upload_param = name.into();
        self
    }

    /// Directory files are removed from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Request parameter holding the file name.
    pub fn upload_param(&self) -> &str {
        &self.upload_param
    }

    /// Delete `name` from the directory.
    ///
    /// Returns whether a file was removed. Names that would resolve outside
    /// the directory are rejected with a validation error.
    pub async fn remove(&self, name: &str) -> AppResult<bool> {
        if !paths::is_plain_file_name(name) {
            warn!(dir = %self.dir.display(), name, "Rejected file name outside upload directory");
            return Err(AppError::validation(format!("Invalid file name: {name}")));
        }
        let removed = self.store.delete(&self.dir.join(name)).await?;
        debug!(dir = %self.dir.display(), name, removed, "Processed file removal");
        Ok(removed)
    }

    /// Delete the file named by the upload parameter, if present.
    pub async fn remove_from_params(&self, params: &HashMap<String, String>) -> AppResult<bool> {
        match params.get(&self.upload_param).filter(|v| !v.is_empty()) {
            Some(name) => self.remove(name).await,
            None => Ok(false),
        }
    }
}
