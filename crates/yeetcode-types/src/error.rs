//! Error types for value construction and parsing

use thiserror::Error;

/// Errors raised while building domain values from raw input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("Invalid username: {0:?}")]
    InvalidUsername(String),

    #[error("Unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

/// Result type for value construction
pub type TypeResult<T> = Result<T, TypeError>;
