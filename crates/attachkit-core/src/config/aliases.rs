//! Path alias table (`@app/web/files` style prefixes).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Alias values may themselves start with an alias, up to this depth.
const MAX_ALIAS_DEPTH: usize = 8;

/// Mapping of alias name (without the leading `@`) to a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Aliases(HashMap<String, String>);

impl Aliases {
    /// Create an empty alias table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alias. A leading `@` on the name is ignored.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let name = name.trim_start_matches('@').to_string();
        self.0.insert(name, value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up an alias by name (without `@`).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Expand a leading `@alias` in `path`. Paths without one are returned
    /// unchanged.
    pub fn resolve(&self, path: &str) -> Result<String, AppError> {
        let mut current = path.to_string();
        for _ in 0..MAX_ALIAS_DEPTH {
            let Some(stripped) = current.strip_prefix('@') else {
                return Ok(current);
            };
            let (name, rest) = match stripped.find(['/', '\\']) {
                Some(idx) => stripped.split_at(idx),
                None => (stripped, ""),
            };
            let root = self
                .get(name)
                .ok_or_else(|| AppError::configuration(format!("Invalid path alias: @{name}")))?;
            current = format!("{}{}", root.trim_end_matches(['/', '\\']), rest);
        }
        Err(AppError::configuration(format!(
            "Path alias nesting too deep: {path}"
        )))
    }
}
