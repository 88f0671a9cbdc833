//! Asset publishing configuration.

use serde::{Deserialize, Serialize};

/// How a source directory is exposed under the public web root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    /// Symlink the source directory (falls back to copying where symlinks
    /// are unavailable). Files committed later stay reachable.
    #[default]
    Link,
    /// Copy the directory's current contents.
    Copy,
}

/// Settings for the directory publisher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Filesystem directory served at `base_url`. May start with `@alias`.
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// URL under which `base_path` is served.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Publishing strategy.
    #[serde(default)]
    pub mode: PublishMode,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            base_url: default_base_url(),
            mode: PublishMode::default(),
        }
    }
}

fn default_base_path() -> String {
    "./web/assets".to_string()
}

fn default_base_url() -> String {
    "/assets".to_string()
}
