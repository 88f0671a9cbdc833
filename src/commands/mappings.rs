//! Attribute mapping listing.

use serde::Serialize;
use tabled::Tabled;

use attachkit_core::error::AppError;
use attachkit_storage::paths;

use super::AppContext;
use crate::output::{self, OutputFormat};

/// Mapping display row
#[derive(Debug, Serialize, Tabled)]
struct MappingRow {
    /// Attribute name
    attribute: String,
    /// Committed files directory
    path: String,
    /// Staging directory
    temp_path: String,
    /// Public URL prefix
    url: String,
}

/// List every configured attribute with its resolved directories.
pub async fn execute(ctx: &AppContext, format: OutputFormat) -> Result<(), AppError> {
    let lifecycle = ctx.lifecycle().await?;
    let rows: Vec<MappingRow> = lifecycle
        .mappings()
        .map(|m| MappingRow {
            attribute: m.attribute().to_string(),
            path: paths::display_dir(m.path()),
            temp_path: paths::display_dir(m.temp_path()),
            url: m.url_prefix().to_string(),
        })
        .collect();

    output::print_rows(&rows, format)?;
    Ok(())
}
