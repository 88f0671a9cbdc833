//! File attribute lifecycle.
//!
//! Reacts to record persistence events by committing staged uploads into
//! permanent storage and reclaiming files that are no longer referenced.
//!
//! Filesystem failures never abort the surrounding save. A failed commit
//! degrades locally instead: on insert the attribute is cleared, on update
//! it is reverted to the previously committed value. Delete failures are
//! always ignored.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use attachkit_core::config::{Aliases, UploadConfig};
use attachkit_core::error::AppError;
use attachkit_core::events::{UploadEvent, UploadEventBus};
use attachkit_core::result::AppResult;
use attachkit_core::traits::publisher::AssetPublisher;
use attachkit_core::traits::record::{OwningRecord, ValidationRule};
use attachkit_core::traits::storage::FileStore;

use crate::mapping::AttributeMapping;

/// Persistence hook points the lifecycle reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordEvent {
    /// Before a new record is inserted.
    BeforeInsert,
    /// Before an existing record is updated.
    BeforeUpdate,
    /// Before a record is deleted.
    BeforeDelete,
}

/// Which branch a commit took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitOutcome {
    /// The staged file was moved into permanent storage.
    Committed,
    /// The attribute was emptied on update; the old file was reclaimed.
    Cleared,
    /// Nothing to do (empty value on insert, or unmanaged attribute).
    Unchanged,
    /// No staged file (or its directory could not be prepared). The
    /// attribute was cleared on insert or reverted on update.
    StagingMissing,
    /// The move failed. The attribute was cleared.
    CommitFailed,
}

/// Commits, replaces, and deletes files behind managed record attributes.
#[derive(Debug, Clone)]
pub struct FileAttributeLifecycle {
    /// Attribute name → resolved mapping.
    mappings: BTreeMap<String, AttributeMapping>,
    /// Delete the old file after a successful replacement.
    unlink_on_save: bool,
    /// Delete files when the record is deleted.
    unlink_on_delete: bool,
    /// Backing filesystem.
    store: Arc<dyn FileStore>,
    /// Receives `AfterUpload` notifications.
    events: UploadEventBus,
}

impl FileAttributeLifecycle {
    /// Resolve every configured attribute.
    ///
    /// Fails fast with a configuration error if no attributes are
    /// configured or any entry lacks `path`/`temp_path`. Missing URLs are
    /// derived through `publisher`; pass a
    /// [`CachedPublisher`](attachkit_storage::CachedPublisher) to publish
    /// each directory only once.
    pub async fn new(
        config: &UploadConfig,
        aliases: &Aliases,
        store: Arc<dyn FileStore>,
        publisher: &dyn AssetPublisher,
    ) -> AppResult<Self> {
        if config.attributes.is_empty() {
            return Err(AppError::configuration(
                "Invalid or empty attributes configuration",
            ));
        }

        let mut mappings = BTreeMap::new();
        for (attribute, entry) in &config.attributes {
            let mapping = AttributeMapping::resolve(attribute, entry, aliases, publisher).await?;
            debug!(
                attribute = %attribute,
                path = %mapping.path().display(),
                temp_path = %mapping.temp_path().display(),
                url = %mapping.url_prefix(),
                "Resolved attribute mapping"
            );
            mappings.insert(attribute.clone(), mapping);
        }

        Ok(Self {
            mappings,
            unlink_on_save: config.unlink_on_save,
            unlink_on_delete: config.unlink_on_delete,
            store,
            events: UploadEventBus::default(),
        })
    }

    /// Use an existing event bus instead of a private one.
    pub fn with_event_bus(mut self, events: UploadEventBus) -> Self {
        self.events = events;
        self
    }

    /// The bus `AfterUpload` events are published on.
    pub fn events(&self) -> &UploadEventBus {
        &self.events
    }

    /// Mapping for a managed attribute.
    pub fn mapping(&self, attribute: &str) -> Option<&AttributeMapping> {
        self.mappings.get(attribute)
    }

    /// All mappings, ordered by attribute name.
    pub fn mappings(&self) -> impl Iterator<Item = &AttributeMapping> {
        self.mappings.values()
    }

    /// Register the string validation rule for every managed attribute.
    pub fn attach<R: OwningRecord + ?Sized>(&self, record: &mut R) {
        for attribute in self.mappings.keys() {
            record.add_validator(attribute, ValidationRule::String);
        }
    }

    /// Dispatch a persistence hook.
    pub async fn handle<R: OwningRecord + ?Sized>(&self, event: RecordEvent, record: &mut R) {
        match event {
            RecordEvent::BeforeInsert => {
                self.before_insert(record).await;
            }
            RecordEvent::BeforeUpdate => {
                self.before_update(record).await;
            }
            RecordEvent::BeforeDelete => {
                self.before_delete(record).await;
            }
        }
    }

    /// Commit every managed attribute that has a value.
    pub async fn before_insert<R: OwningRecord + ?Sized>(
        &self,
        record: &mut R,
    ) -> BTreeMap<String, CommitOutcome> {
        let mut outcomes = BTreeMap::new();
        for attribute in self.mappings.keys() {
            if current_value(record, attribute).is_some() {
                let outcome = self.commit(record, attribute, true).await;
                outcomes.insert(attribute.clone(), outcome);
            }
        }
        outcomes
    }

    /// Commit every managed attribute whose value changed since load.
    pub async fn before_update<R: OwningRecord + ?Sized>(
        &self,
        record: &mut R,
    ) -> BTreeMap<String, CommitOutcome> {
        let mut outcomes = BTreeMap::new();
        for attribute in self.mappings.keys() {
            if record.is_attribute_changed(attribute) {
                let outcome = self.commit(record, attribute, false).await;
                outcomes.insert(attribute.clone(), outcome);
            }
        }
        outcomes
    }

    /// Delete the committed files of a record about to be deleted, if
    /// `unlink_on_delete` is set. Returns how many files were removed.
    pub async fn before_delete<R: OwningRecord + ?Sized>(&self, record: &mut R) -> usize {
        if !self.unlink_on_delete {
            return 0;
        }
        let mut removed = 0;
        for (attribute, mapping) in &self.mappings {
            if let Some(name) = current_value(record, attribute) {
                if self.delete_quietly(mapping.file(&name)).await {
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Commit the staged file named by `attribute`'s current value.
    ///
    /// Never fails: every filesystem problem maps onto an outcome and the
    /// record's in-memory value is adjusted so that it never points at a
    /// file that is not on disk.
    pub async fn commit<R: OwningRecord + ?Sized>(
        &self,
        record: &mut R,
        attribute: &str,
        insert: bool,
    ) -> CommitOutcome {
        let Some(mapping) = self.mappings.get(attribute) else {
            return CommitOutcome::Unchanged;
        };
        let old = old_value(record, attribute);

        let Some(name) = current_value(record, attribute) else {
            if insert {
                return CommitOutcome::Unchanged;
            }
            match &old {
                Some(old) => {
                    self.delete_quietly(mapping.file(old)).await;
                    info!(attribute, file = %old, "Attribute cleared, old file reclaimed");
                }
                None => debug!(attribute, "Attribute cleared, no previous file"),
            }
            return CommitOutcome::Cleared;
        };

        let staged = mapping.temp_file(&name);
        let dest = mapping.file(&name);

        if let (Some(staged), Some(dest)) = (&staged, &dest) {
            if self.is_staged(staged).await && self.prepare_dir(mapping.path()).await {
                return match self.store.rename(staged, dest).await {
                    Ok(()) => {
                        self.after_commit(record, mapping, &name, old.as_deref(), dest, insert)
                            .await;
                        CommitOutcome::Committed
                    }
                    Err(e) => {
                        warn!(attribute, file = %name, error = %e, "Failed to commit staged file");
                        record.set_attribute(attribute, None);
                        CommitOutcome::CommitFailed
                    }
                };
            }
        }

        if insert {
            warn!(attribute, file = %name, "No staged file, clearing attribute");
            record.set_attribute(attribute, None);
        } else {
            warn!(attribute, file = %name, "No staged file, reverting attribute");
            record.set_attribute(attribute, old);
        }
        CommitOutcome::StagingMissing
    }

    /// Delete the committed file and, only if that succeeded, persist the
    /// attribute as empty. Returns whether both happened.
    pub async fn remove_attribute<R: OwningRecord + ?Sized>(
        &self,
        record: &mut R,
        attribute: &str,
    ) -> bool {
        let Some(mapping) = self.mappings.get(attribute) else {
            return false;
        };
        let file = current_value(record, attribute).and_then(|name| mapping.file(&name));
        if !self.delete_quietly(file).await {
            return false;
        }

        match record.update_attributes(&[(attribute, None)]).await {
            Ok(rows) => rows > 0,
            Err(e) => {
                warn!(attribute, error = %e, "File removed but attribute update failed");
                false
            }
        }
    }

    /// Public URL of the current file, if any.
    pub fn url_for<R: OwningRecord + ?Sized>(&self, record: &R, attribute: &str) -> Option<String> {
        let mapping = self.mappings.get(attribute)?;
        current_value(record, attribute).map(|name| mapping.url(&name))
    }

    /// MIME type of the committed file, classified from its content.
    pub async fn mime_type_for<R: OwningRecord + ?Sized>(
        &self,
        record: &R,
        attribute: &str,
    ) -> Option<String> {
        let path = self.file_path(record, attribute)?;
        match self.store.mime_type(&path).await {
            Ok(mime) => mime,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "MIME detection failed");
                None
            }
        }
    }

    /// Whether the committed file is present on disk.
    pub async fn exists_for<R: OwningRecord + ?Sized>(&self, record: &R, attribute: &str) -> bool {
        match self.file_path(record, attribute) {
            Some(path) => self.store.exists(&path).await.unwrap_or(false),
            None => false,
        }
    }

    /// Committed location of the current value.
    pub fn file_path<R: OwningRecord + ?Sized>(
        &self,
        record: &R,
        attribute: &str,
    ) -> Option<PathBuf> {
        let mapping = self.mappings.get(attribute)?;
        current_value(record, attribute).and_then(|name| mapping.file(&name))
    }

    /// Staged location of the current value.
    pub fn temp_file_path<R: OwningRecord + ?Sized>(
        &self,
        record: &R,
        attribute: &str,
    ) -> Option<PathBuf> {
        let mapping = self.mappings.get(attribute)?;
        current_value(record, attribute).and_then(|name| mapping.temp_file(&name))
    }

    /// Committed location of the previously persisted value.
    pub fn old_file_path<R: OwningRecord + ?Sized>(
        &self,
        record: &R,
        attribute: &str,
    ) -> Option<PathBuf> {
        let mapping = self.mappings.get(attribute)?;
        old_value(record, attribute).and_then(|name| mapping.file(&name))
    }

    async fn after_commit<R: OwningRecord + ?Sized>(
        &self,
        record: &R,
        mapping: &AttributeMapping,
        name: &str,
        old: Option<&str>,
        dest: &Path,
        insert: bool,
    ) {
        info!(
            attribute = mapping.attribute(),
            file = name,
            path = %dest.display(),
            "Committed staged file"
        );

        if !insert && self.unlink_on_save {
            // A same-name replacement already overwrote the old file.
            if let Some(old) = old.filter(|old| *old != name) {
                self.delete_quietly(mapping.file(old)).await;
            }
        }

        self.events.publish(UploadEvent::AfterUpload {
            record: record.record_key(),
            attribute: mapping.attribute().to_string(),
            file_name: name.to_string(),
            path: dest.display().to_string(),
        });
    }

    async fn is_staged(&self, staged: &Path) -> bool {
        match self.store.is_file(staged).await {
            Ok(found) => found,
            Err(e) => {
                debug!(path = %staged.display(), error = %e, "Cannot stat staged file");
                false
            }
        }
    }

    async fn prepare_dir(&self, dir: &Path) -> bool {
        match self.store.create_dir(dir).await {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Cannot create storage directory");
                false
            }
        }
    }

    /// Best-effort delete. Returns whether a file was removed.
    async fn delete_quietly(&self, file: Option<PathBuf>) -> bool {
        let Some(file) = file else {
            return false;
        };
        match self.store.delete(&file).await {
            Ok(removed) => removed,
            Err(e) => {
                debug!(path = %file.display(), error = %e, "Ignoring delete failure");
                false
            }
        }
    }
}

/// Current value, with empty strings treated as "no file".
fn current_value<R: OwningRecord + ?Sized>(record: &R, attribute: &str) -> Option<String> {
    record.attribute(attribute).filter(|v| !v.is_empty())
}

/// Previously persisted value, with empty strings treated as "no file".
fn old_value<R: OwningRecord + ?Sized>(record: &R, attribute: &str) -> Option<String> {
    record.old_attribute(attribute).filter(|v| !v.is_empty())
}
