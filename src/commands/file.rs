//! Per-file commands: commit, remove, discard, inspect.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use attachkit_core::error::AppError;
use attachkit_lifecycle::{
    CommitOutcome, FileAttributeLifecycle, MemoryRecord, StagedFileRemover,
};

use super::AppContext;
use crate::output::{self, Notice, OutputFormat};

/// Arguments shared by per-file commands
#[derive(Debug, Args)]
pub struct FileArgs {
    /// Managed attribute name
    pub attribute: String,
    /// File name as stored in the attribute
    pub name: String,
}

/// Commit result row
#[derive(Debug, Serialize, Tabled)]
struct CommitRow {
    /// Attribute name
    attribute: String,
    /// Commit branch taken
    outcome: String,
    /// Stored value after the commit
    value: String,
    /// Public URL
    url: String,
}

/// File status row
#[derive(Debug, Serialize, Tabled)]
struct InspectRow {
    /// Attribute name
    attribute: String,
    /// File name
    name: String,
    /// Present on disk
    exists: bool,
    /// Content type
    mime_type: String,
    /// Public URL
    url: String,
}

/// Move a staged upload into permanent storage as a record insert would.
pub async fn commit(
    args: &FileArgs,
    ctx: &AppContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let lifecycle = ctx.lifecycle().await?;
    ensure_managed(&lifecycle, &args.attribute)?;

    let mut record = MemoryRecord::new();
    lifecycle.attach(&mut record);
    record.set(&args.attribute, args.name.as_str());
    record.validate()?;

    let outcomes = lifecycle.before_insert(&mut record).await;
    let outcome = outcomes
        .get(&args.attribute)
        .copied()
        .unwrap_or(CommitOutcome::Unchanged);

    let value = record.get(&args.attribute).as_str().unwrap_or_default().to_string();
    let url = lifecycle
        .url_for(&record, &args.attribute)
        .unwrap_or_default();

    output::print_row(
        &CommitRow {
            attribute: args.attribute.clone(),
            outcome: format!("{:?}", outcome),
            value,
            url,
        },
        format,
    )?;

    if outcome != CommitOutcome::Committed {
        output::notify(
            Notice::Warning,
            &format!("'{}' was not committed; the attribute was cleared", args.name),
        );
    }
    Ok(())
}

/// Delete a committed file and clear its reference.
pub async fn remove(args: &FileArgs, ctx: &AppContext) -> Result<(), AppError> {
    let lifecycle = ctx.lifecycle().await?;
    ensure_managed(&lifecycle, &args.attribute)?;

    let mut record = MemoryRecord::loaded([(args.attribute.as_str(), args.name.as_str())]);
    if lifecycle.remove_attribute(&mut record, &args.attribute).await {
        output::notify(Notice::Success, &format!("Removed '{}'", args.name));
    } else {
        output::notify(Notice::Warning, &format!("'{}' could not be removed", args.name));
    }
    Ok(())
}

/// Delete a staged upload.
pub async fn discard(args: &FileArgs, ctx: &AppContext) -> Result<(), AppError> {
    let lifecycle = ctx.lifecycle().await?;
    let mapping = lifecycle.mapping(&args.attribute).ok_or_else(|| unmanaged(&args.attribute))?;

    let remover = StagedFileRemover::for_staging(mapping, ctx.store.clone());
    if remover.remove(&args.name).await? {
        output::notify(Notice::Success, &format!("Discarded staged '{}'", args.name));
    } else {
        output::notify(Notice::Warning, &format!("No staged file named '{}'", args.name));
    }
    Ok(())
}

/// Report existence, content type, and URL of a committed file.
pub async fn inspect(
    args: &FileArgs,
    ctx: &AppContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let lifecycle = ctx.lifecycle().await?;
    ensure_managed(&lifecycle, &args.attribute)?;

    let record = MemoryRecord::loaded([(args.attribute.as_str(), args.name.as_str())]);
    let row = InspectRow {
        attribute: args.attribute.clone(),
        name: args.name.clone(),
        exists: lifecycle.exists_for(&record, &args.attribute).await,
        mime_type: lifecycle
            .mime_type_for(&record, &args.attribute)
            .await
            .unwrap_or_else(|| "-".to_string()),
        url: lifecycle
            .url_for(&record, &args.attribute)
            .unwrap_or_default(),
    };

    output::print_row(&row, format)?;
    Ok(())
}

fn ensure_managed(lifecycle: &FileAttributeLifecycle, attribute: &str) -> Result<(), AppError> {
    match lifecycle.mapping(attribute) {
        Some(_) => Ok(()),
        None => Err(unmanaged(attribute)),
    }
}

fn unmanaged(attribute: &str) -> AppError {
    AppError::not_found(format!("Attribute '{}' is not configured", attribute))
}
