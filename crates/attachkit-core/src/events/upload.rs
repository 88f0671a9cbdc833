//! Upload lifecycle events.

use serde::{Deserialize, Serialize};

/// Events raised by the file attribute lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UploadEvent {
    /// A staged file was committed into permanent storage.
    AfterUpload {
        /// Identity of the owning record, if the adapter exposes one.
        record: Option<String>,
        /// The managed attribute.
        attribute: String,
        /// Stored file name (the attribute's value).
        file_name: String,
        /// Absolute path of the committed file.
        path: String,
    },
}

impl UploadEvent {
    /// The attribute this event concerns.
    pub fn attribute(&self) -> &str {
        match self {
            Self::AfterUpload { attribute, .. } => attribute,
        }
    }
}
