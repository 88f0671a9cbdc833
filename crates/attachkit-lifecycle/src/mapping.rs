//! Resolved per-attribute directories and URL prefix.

use std::path::{Path, PathBuf};

use serde::Serialize;

use attachkit_core::config::{Aliases, AttributeConfig};
use attachkit_core::error::AppError;
use attachkit_core::result::AppResult;
use attachkit_core::traits::publisher::AssetPublisher;
use attachkit_storage::paths;

/// Where a managed attribute's files are staged, committed, and served.
///
/// Built once when the lifecycle is constructed and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeMapping {
    attribute: String,
    path: PathBuf,
    temp_path: PathBuf,
    url_prefix: String,
}

impl AttributeMapping {
    /// Validate and resolve one configuration entry.
    ///
    /// Fails with a configuration error when `path` or `temp_path` is
    /// empty or uses an unknown alias. When no URL is configured, `path`
    /// is published and the returned prefix is used.
    pub async fn resolve(
        attribute: &str,
        config: &AttributeConfig,
        aliases: &Aliases,
        publisher: &dyn AssetPublisher,
    ) -> AppResult<Self> {
        if config.path.trim().is_empty() {
            return Err(AppError::configuration(format!(
                "Path must be set for attribute '{attribute}'"
            )));
        }
        if config.temp_path.trim().is_empty() {
            return Err(AppError::configuration(format!(
                "Temporary path must be set for attribute '{attribute}'"
            )));
        }

        let path = paths::normalize(Path::new(&aliases.resolve(&config.path)?))?;
        let temp_path = paths::normalize(Path::new(&aliases.resolve(&config.temp_path)?))?;

        let url = match config.url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => url.to_string(),
            None => publisher.publish(&path).await?,
        };

        Ok(Self {
            attribute: attribute.to_string(),
            path,
            temp_path,
            url_prefix: format!("{}/", url.trim_end_matches('/')),
        })
    }

    /// Record attribute name.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Directory holding committed files.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding staged uploads.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Public URL prefix, always ending in `/`.
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Committed location of `name`. `None` unless `name` is a plain file
    /// name.
    pub fn file(&self, name: &str) -> Option<PathBuf> {
        paths::is_plain_file_name(name).then(|| self.path.join(name))
    }

    /// Staged location of `name`. `None` unless `name` is a plain file
    /// name.
    pub fn temp_file(&self, name: &str) -> Option<PathBuf> {
        paths::is_plain_file_name(name).then(|| self.temp_path.join(name))
    }

    /// Public URL of `name`.
    pub fn url(&self, name: &str) -> String {
        format!("{}{}", self.url_prefix, name)
    }
}
