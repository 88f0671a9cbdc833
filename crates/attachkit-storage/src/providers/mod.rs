//! File store provider implementations.

pub mod local;
