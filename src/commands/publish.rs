//! Directory publishing command.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use attachkit_core::error::AppError;
use attachkit_core::traits::publisher::AssetPublisher;
use attachkit_storage::paths;

use super::AppContext;
use crate::output::{self, OutputFormat};

/// Arguments for the publish command
#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Directory to publish (aliases allowed)
    pub dir: String,
}

/// Publish result row
#[derive(Debug, Serialize, Tabled)]
struct PublishRow {
    /// Source directory
    source: String,
    /// Public URL prefix
    url: String,
}

/// Publish a directory under the configured web root.
pub async fn execute(
    args: &PublishArgs,
    ctx: &AppContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let source = PathBuf::from(ctx.config.aliases.resolve(&args.dir)?);
    let source = paths::normalize(&source)?;
    let url = ctx.publisher.publish(&source).await?;

    output::print_row(
        &PublishRow {
            source: paths::display_dir(&source),
            url: format!("{}/", url.trim_end_matches('/')),
        },
        format,
    )?;
    Ok(())
}
