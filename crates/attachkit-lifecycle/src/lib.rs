//! # attachkit-lifecycle
//!
//! Binds record attributes holding file names to storage directories.
//! A persistence layer forwards its before-insert, before-update, and
//! before-delete hooks to [`FileAttributeLifecycle`], which moves staged
//! uploads into permanent storage, reclaims superseded files, and exposes
//! URL / MIME / existence accessors for the view layer.

pub mod lifecycle;
pub mod mapping;
pub mod record;
pub mod remover;

pub use lifecycle::{CommitOutcome, FileAttributeLifecycle, RecordEvent};
pub use mapping::AttributeMapping;
pub use record::MemoryRecord;
pub use remover::StagedFileRemover;
