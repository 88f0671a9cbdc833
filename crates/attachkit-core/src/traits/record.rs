//! Capability contract required of any record whose attributes are
//! lifecycle-managed.
//!
//! Persistence backends provide an adapter implementing [`OwningRecord`]
//! and forward their before-insert / before-update / before-delete hooks to
//! the lifecycle. The lifecycle reads and writes attribute values through
//! this trait but never owns the record.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// A validation rule registered on a record attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationRule {
    /// The value must be a string (or empty).
    String,
}

/// A persisted row whose attributes can hold file names.
///
/// Empty strings and `None` both mean "no file".
#[async_trait]
pub trait OwningRecord: Send + Sync {
    /// Current in-memory value of an attribute.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Overwrite the in-memory value of an attribute. `None` clears it.
    fn set_attribute(&mut self, name: &str, value: Option<String>);

    /// Value of the attribute as last loaded from (or saved to) storage.
    fn old_attribute(&self, name: &str) -> Option<String>;

    /// Whether the in-memory value differs from the stored one.
    fn is_attribute_changed(&self, name: &str) -> bool {
        self.attribute(name) != self.old_attribute(name)
    }

    /// Register a validation rule with the record's validation subsystem.
    fn add_validator(&mut self, attribute: &str, rule: ValidationRule);

    /// Persist only the given attributes, bypassing lifecycle hooks.
    /// Returns the number of rows affected.
    async fn update_attributes(&mut self, values: &[(&str, Option<String>)]) -> AppResult<u64>;

    /// Identity of the record for event payloads.
    fn record_key(&self) -> Option<String> {
        None
    }
}
