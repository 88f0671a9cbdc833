//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod aliases;
pub mod logging;
pub mod publish;
pub mod upload;

use serde::{Deserialize, Serialize};

pub use self::aliases::Aliases;
pub use self::logging::LoggingConfig;
pub use self::publish::{PublishConfig, PublishMode};
pub use self::upload::{AttributeConfig, UploadConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Managed attributes and lifecycle flags.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Asset publishing settings used to derive missing URL prefixes.
    #[serde(default)]
    pub publish: PublishConfig,
    /// Path aliases (`@name/...`) available to configured directories.
    #[serde(default)]
    pub aliases: Aliases,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the base configuration file with an environment-specific
    /// overlay next to it and environment variables prefixed with
    /// `ATTACHKIT`. Both files are optional.
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let base = path.trim_end_matches(".toml");
        let overlay = std::path::Path::new(base).with_file_name(env);

        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&overlay.to_string_lossy()).required(false))
            .add_source(
                config::Environment::with_prefix("ATTACHKIT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_reads_attributes_and_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [aliases]
            app = "/srv/app"

            [upload]
            unlink_on_delete = false

            [upload.attributes.avatar]
            path = "@app/web/avatar"
            temp_path = "/tmp/avatar"

            [upload.attributes.preview_url]
            path = "/files/preview"
            temp_path = "/tmp/preview"
            url = "/preview"
            "#,
        )
        .unwrap();

        assert!(config.upload.unlink_on_save);
        assert!(!config.upload.unlink_on_delete);
        assert_eq!(config.upload.attributes.len(), 2);

        let avatar = &config.upload.attributes["avatar"];
        assert_eq!(avatar.path, "@app/web/avatar");
        assert_eq!(avatar.url, None);

        let preview = &config.upload.attributes["preview_url"];
        assert_eq!(preview.url.as_deref(), Some("/preview"));

        assert_eq!(config.aliases.get("app"), Some("/srv/app"));
        assert_eq!(config.publish.base_url, "/assets");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_path_deserializes_as_empty() {
        let config = AppConfig::from_toml(
            r#"
            [upload.attributes.avatar]
            temp_path = "/tmp/avatar"
            "#,
        )
        .unwrap();

        assert!(config.upload.attributes["avatar"].path.is_empty());
    }

    #[test]
    fn test_load_missing_files_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.toml");
        let config = AppConfig::load(path.to_str().unwrap(), "test").unwrap();
        assert!(config.upload.attributes.is_empty());
        assert_eq!(config.publish.mode, PublishMode::Link);
    }

    #[test]
    fn test_load_merges_environment_overlay() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[upload.attributes.avatar]\npath = \"/files/avatar\"\ntemp_path = \"/tmp/avatar\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("staging.toml"),
            "[upload]\nunlink_on_save = false\n",
        )
        .unwrap();

        let path = dir.path().join("default.toml");
        let config = AppConfig::load(path.to_str().unwrap(), "staging").unwrap();
        assert!(!config.upload.unlink_on_save);
        assert_eq!(config.upload.attributes["avatar"].path, "/files/avatar");
    }
}
