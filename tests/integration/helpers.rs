//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use attachkit_core::config::AppConfig;
use attachkit_core::traits::storage::FileStore;
use attachkit_lifecycle::FileAttributeLifecycle;
use attachkit_storage::{CachedPublisher, DirectoryPublisher, LocalFileStore};

/// A throwaway application root with loaded configuration.
pub struct TestEnv {
    /// Root directory, removed on drop
    pub root: TempDir,
    /// Configuration with `@root` pointing at the temp dir
    pub config: AppConfig,
    /// Local file store
    pub store: Arc<dyn FileStore>,
}

impl TestEnv {
    /// Create an environment from a TOML document. `{root}` is replaced
    /// with the temp dir path.
    pub fn new(toml: &str) -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let source = toml.replace("{root}", &root.path().display().to_string());
        let config = AppConfig::from_toml(&source).expect("Failed to parse test config");

        Self {
            root,
            config,
            store: Arc::new(LocalFileStore::new()),
        }
    }

    /// Environment with a single `avatar` attribute that has a fixed URL.
    pub fn avatar() -> Self {
        Self::new(
            r#"
            [aliases]
            root = "{root}"

            [upload.attributes.avatar]
            path = "@root/web/files/avatar"
            temp_path = "@root/runtime/avatar"
            url = "/files/avatar"

            [publish]
            base_path = "@root/web/assets"
            base_url = "/assets"
            "#,
        )
    }

    /// Publisher built from the environment's configuration.
    pub fn publisher(&self) -> CachedPublisher<DirectoryPublisher> {
        let inner = DirectoryPublisher::from_config(&self.config.publish, &self.config.aliases)
            .expect("Failed to build publisher");
        CachedPublisher::new(inner)
    }

    /// Resolve the configured attributes into a lifecycle.
    pub async fn lifecycle(&self) -> FileAttributeLifecycle {
        FileAttributeLifecycle::new(
            &self.config.upload,
            &self.config.aliases,
            self.store.clone(),
            &self.publisher(),
        )
        .await
        .expect("Failed to build lifecycle")
    }

    /// Absolute path under the root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Write a file under the root, creating parent directories.
    pub fn write(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("Failed to write file");
        path
    }
}

/// Minimal PNG header, enough for content sniffing.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
