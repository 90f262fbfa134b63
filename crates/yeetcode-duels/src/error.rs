//! Duel error types

use thiserror::Error;
use yeetcode_types::{Difficulty, DuelId};

/// Failures of the persistence collaborator
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failures of the problem catalog collaborator
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("No problems available for difficulty {0}")]
    NoProblems(Difficulty),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Duel operation errors
#[derive(Debug, Clone, Error)]
pub enum DuelError {
    #[error("Duel not found: {0}")]
    NotFound(DuelId),

    #[error("Invalid participant: {0}")]
    InvalidParticipant(String),

    #[error("Invalid state for duel {id}: {reason}")]
    InvalidState { id: DuelId, reason: String },

    #[error("Duel expired: {0}")]
    DuelExpired(DuelId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Problem catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl DuelError {
    pub(crate) fn invalid_state(id: DuelId, reason: impl Into<String>) -> Self {
        Self::InvalidState {
            id,
            reason: reason.into(),
        }
    }

    /// Whether retrying the same call later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Catalog(CatalogError::Unavailable(_)))
    }
}

/// Result type for duel operations
pub type DuelResult<T> = Result<T, DuelError>;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
