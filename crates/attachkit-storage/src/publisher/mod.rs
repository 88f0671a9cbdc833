//! Asset publishing: exposing storage directories under a public URL.

pub mod cached;
pub mod directory;

pub use cached::CachedPublisher;
pub use directory::DirectoryPublisher;
