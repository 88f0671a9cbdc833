//! Convenience result type alias for attachkit.

use crate::error::AppError;

/// A specialized `Result` type for attachkit operations.
pub type AppResult<T> = Result<T, AppError>;
