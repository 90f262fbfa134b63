//! Submission feed errors

use thiserror::Error;

/// Failures of the submission feed collaborator
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    #[error("Submission feed unavailable: {0}")]
    Unavailable(String),

    #[error("Submission feed rate limited")]
    RateLimited,

    #[error("Malformed feed response: {0}")]
    InvalidResponse(String),
}

/// Result type for feed operations
pub type FeedResult<T> = Result<T, FeedError>;
