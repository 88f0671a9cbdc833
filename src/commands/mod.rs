//! CLI command definitions and dispatch.

pub mod file;
pub mod mappings;
pub mod publish;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use attachkit_core::config::AppConfig;
use attachkit_core::error::AppError;
use attachkit_core::traits::storage::FileStore;
use attachkit_lifecycle::FileAttributeLifecycle;
use attachkit_storage::{CachedPublisher, DirectoryPublisher, LocalFileStore};

use crate::output::OutputFormat;

/// attachkit: file attribute storage for record-backed uploads
#[derive(Debug, Parser)]
#[command(name = "attachkit", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded next to the configuration file
    #[arg(short, long, env = "ATTACHKIT_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List resolved attribute mappings
    Mappings,
    /// Publish a directory and print its URL prefix
    Publish(publish::PublishArgs),
    /// Commit a staged file as a new record would
    Commit(file::FileArgs),
    /// Delete a committed file and clear its reference
    Remove(file::FileArgs),
    /// Delete a staged upload that will not be committed
    Discard(file::FileArgs),
    /// Show existence, MIME type, and URL of a committed file
    Inspect(file::FileArgs),
}

impl Cli {
    /// Load configuration from the file given on the command line
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load(&self.config, &self.env)
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        let ctx = AppContext::new(config)?;
        match &self.command {
            Commands::Mappings => mappings::execute(&ctx, self.format).await,
            Commands::Publish(args) => publish::execute(args, &ctx, self.format).await,
            Commands::Commit(args) => file::commit(args, &ctx, self.format).await,
            Commands::Remove(args) => file::remove(args, &ctx).await,
            Commands::Discard(args) => file::discard(args, &ctx).await,
            Commands::Inspect(args) => file::inspect(args, &ctx, self.format).await,
        }
    }
}

/// Shared services built from configuration.
#[derive(Debug)]
pub struct AppContext {
    /// Loaded configuration.
    pub config: AppConfig,
    /// Backing filesystem.
    pub store: Arc<dyn FileStore>,
    /// Publisher with a per-process cache.
    pub publisher: CachedPublisher<DirectoryPublisher>,
}

impl AppContext {
    /// Build the store and publisher.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let publisher = DirectoryPublisher::from_config(&config.publish, &config.aliases)?;
        Ok(Self {
            config,
            store: Arc::new(LocalFileStore::new()),
            publisher: CachedPublisher::new(publisher),
        })
    }

    /// Resolve the configured attributes into a lifecycle.
    pub async fn lifecycle(&self) -> Result<FileAttributeLifecycle, AppError> {
        FileAttributeLifecycle::new(
            &self.config.upload,
            &self.config.aliases,
            self.store.clone(),
            &self.publisher,
        )
        .await
    }
}
