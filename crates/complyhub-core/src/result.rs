//! Convenience result type alias for ComplyHub.

use crate::error::AppError;

/// A specialized `Result` type for ComplyHub operations.
pub type AppResult<T> = Result<T, AppError>;
