//! Managed attribute configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lifecycle configuration: which record attributes hold file names and
/// what happens to superseded files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Delete the previously committed file when an update commits a
    /// replacement.
    #[serde(default = "default_true")]
    pub unlink_on_save: bool,
    /// Delete committed files when the owning record is deleted.
    #[serde(default = "default_true")]
    pub unlink_on_delete: bool,
    /// Attribute name → directories and URL.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeConfig>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            unlink_on_save: true,
            unlink_on_delete: true,
            attributes: BTreeMap::new(),
        }
    }
}

impl UploadConfig {
    /// Add (or replace) an attribute entry.
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: AttributeConfig) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }
}

/// Directories and URL for a single managed attribute.
///
/// `path` and `temp_path` default to empty so that a missing entry is
/// reported as a configuration error when the lifecycle is built, naming
/// the attribute, rather than as an opaque deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeConfig {
    /// Directory committed files are moved into. May start with `@alias`.
    #[serde(default)]
    pub path: String,
    /// Directory the upload endpoint stages files into. May start with `@alias`.
    #[serde(default)]
    pub temp_path: String,
    /// Public URL prefix. Derived by publishing `path` when absent.
    #[serde(default)]
    pub url: Option<String>,
}

impl AttributeConfig {
    /// Create an entry without an explicit URL.
    pub fn new(path: impl Into<String>, temp_path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            temp_path: temp_path.into(),
            url: None,
        }
    }

    /// Set the public URL prefix.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

fn default_true() -> bool {
    true
}
