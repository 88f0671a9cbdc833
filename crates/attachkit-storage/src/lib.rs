//! # attachkit-storage
//!
//! File store and asset publishing implementations for attachkit: a local
//! filesystem [`FileStore`](attachkit_core::traits::FileStore), content-based
//! MIME detection, a directory publisher, and a memoizing publish cache.

pub mod mime;
pub mod paths;
pub mod providers;
pub mod publisher;

pub use providers::local::LocalFileStore;
pub use publisher::{CachedPublisher, DirectoryPublisher};
