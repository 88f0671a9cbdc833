//! # attachkit-core
//!
//! Core crate for attachkit. Contains the collaborator traits the file
//! attribute lifecycle depends on (owning record, file store, asset
//! publisher), configuration schemas, upload domain events, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other attachkit crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
