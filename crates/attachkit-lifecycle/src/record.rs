//! In-memory [`OwningRecord`] adapter.
//!
//! Holds attribute values as JSON with a snapshot of what was last
//! persisted. Useful for tests, for the CLI, and as a reference for
//! adapters over real persistence backends.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use attachkit_core::error::AppError;
use attachkit_core::result::AppResult;
use attachkit_core::traits::record::{OwningRecord, ValidationRule};

/// A record kept entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecord {
    key: Option<String>,
    attributes: BTreeMap<String, Value>,
    persisted: BTreeMap<String, Value>,
    is_persisted: bool,
    validators: Vec<(String, ValidationRule)>,
}

impl MemoryRecord {
    /// A new, never-saved record.
    pub fn new() -> Self {
        Self::default()
    }

    /// A record as freshly loaded from storage with the given string values.
    pub fn loaded<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let attributes: BTreeMap<String, Value> = values
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();
        Self {
            persisted: attributes.clone(),
            attributes,
            is_persisted: true,
            ..Self::default()
        }
    }

    /// Set the record identity reported in events.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Assign a raw value (any JSON) to an attribute.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    /// Raw value of an attribute.
    pub fn get(&self, name: &str) -> &Value {
        self.attributes.get(name).unwrap_or(&Value::Null)
    }

    /// Snapshot current values as persisted, as a save would.
    pub fn mark_persisted(&mut self) {
        self.persisted = self.attributes.clone();
        self.is_persisted = true;
    }

    /// Whether the record has been saved at least once.
    pub fn is_persisted(&self) -> bool {
        self.is_persisted
    }

    /// Registered validation rules.
    pub fn validators(&self) -> &[(String, ValidationRule)] {
        &self.validators
    }

    /// Run registered validation rules.
    pub fn validate(&self) -> AppResult<()> {
        let failed: Vec<&str> = self
            .validators
            .iter()
            .filter(|(attribute, rule)| match rule {
                ValidationRule::String => {
                    !matches!(self.get(attribute), Value::Null | Value::String(_))
                }
            })
            .map(|(attribute, _)| attribute.as_str())
            .collect();

        if failed.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "Attributes must be strings: {}",
                failed.join(", ")
            )))
        }
    }

    fn persisted_value(&self, name: &str) -> &Value {
        self.persisted.get(name).unwrap_or(&Value::Null)
    }
}

fn string_value(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

#[async_trait]
impl OwningRecord for MemoryRecord {
    fn attribute(&self, name: &str) -> Option<String> {
        string_value(self.get(name))
    }

    fn set_attribute(&mut self, name: &str, value: Option<String>) {
        let value = value.map(Value::String).unwrap_or(Value::Null);
        self.attributes.insert(name.to_string(), value);
    }

    fn old_attribute(&self, name: &str) -> Option<String> {
        string_value(self.persisted_value(name))
    }

    fn is_attribute_changed(&self, name: &str) -> bool {
        self.get(name) != self.persisted_value(name)
    }

    fn add_validator(&mut self, attribute: &str, rule: ValidationRule) {
        let exists = self
            .validators
            .iter()
            .any(|(a, r)| a == attribute && *r == rule);
        if !exists {
            self.validators.push((attribute.to_string(), rule));
        }
    }

    async fn update_attributes(&mut self, values: &[(&str, Option<String>)]) -> AppResult<u64> {
        if !self.is_persisted {
            return Ok(0);
        }
        for (name, value) in values {
            let value = value.clone().map(Value::String).unwrap_or(Value::Null);
            self.attributes.insert(name.to_string(), value.clone());
            self.persisted.insert(name.to_string(), value);
        }
        Ok(1)
    }

    fn record_key(&self) -> Option<String> {
        self.key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_tracking() {
        let mut record = MemoryRecord::loaded([("avatar", "x.png")]);
        assert!(!record.is_attribute_changed("avatar"));
        assert_eq!(record.old_attribute("avatar").as_deref(), Some("x.png"));

        record.set_attribute("avatar", Some("y.png".into()));
        assert!(record.is_attribute_changed("avatar"));
        assert_eq!(record.old_attribute("avatar").as_deref(), Some("x.png"));

        record.mark_persisted();
        assert!(!record.is_attribute_changed("avatar"));
        assert_eq!(record.old_attribute("avatar").as_deref(), Some("y.png"));
    }

    #[test]
    fn test_string_validator() {
        let mut record = MemoryRecord::new();
        record.add_validator("avatar", ValidationRule::String);
        record.add_validator("avatar", ValidationRule::String);
        assert_eq!(record.validators().len(), 1);

        assert!(record.validate().is_ok());
        record.set("avatar", "x.png");
        assert!(record.validate().is_ok());
        record.set("avatar", 42);
        assert!(record.validate().is_err());
        assert_eq!(record.attribute("avatar"), None);
    }

    #[tokio::test]
    async fn test_update_attributes_persists() {
        let mut record = MemoryRecord::loaded([("avatar", "x.png")]);
        let rows = record.update_attributes(&[("avatar", None)]).await.unwrap();
        assert_eq!(rows, 1);
        assert_eq!(record.attribute("avatar"), None);
        assert!(!record.is_attribute_changed("avatar"));

        let mut fresh = MemoryRecord::new();
        assert_eq!(fresh.update_attributes(&[("avatar", None)]).await.unwrap(), 0);
    }
}
