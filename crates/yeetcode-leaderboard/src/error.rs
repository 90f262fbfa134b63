//! Leaderboard errors

use thiserror::Error;

/// Leaderboard errors
#[derive(Debug, Clone, Error)]
pub enum LeaderboardError {
    #[error("Leaderboard source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Group not found: {0}")]
    GroupNotFound(String),
}

/// Result type for leaderboard operations
pub type LeaderboardResult<T> = Result<T, LeaderboardError>;
