//! Collaborator traits defined in `attachkit-core` and implemented by
//! other crates or by the embedding application.

pub mod publisher;
pub mod record;
pub mod storage;

pub use publisher::AssetPublisher;
pub use record::{OwningRecord, ValidationRule};
pub use storage::FileStore;
