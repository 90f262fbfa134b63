//! Leaderboard snapshot collaborator

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use yeetcode_types::LeaderboardEntry;

use crate::{LeaderboardError, LeaderboardResult};

/// Provides the current leaderboard of a study group
#[async_trait]
pub trait LeaderboardSource: Send + Sync {
    async fn snapshot(&self, group: &str) -> LeaderboardResult<Vec<LeaderboardEntry>>;
}

/// In-memory leaderboards keyed by group code
#[derive(Default)]
pub struct InMemoryLeaderboardSource {
    groups: RwLock<HashMap<String, Vec<LeaderboardEntry>>>,
    offline: AtomicBool,
}

impl InMemoryLeaderboardSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a group's leaderboard
    pub fn set_group(&self, group: impl Into<String>, entries: Vec<LeaderboardEntry>) {
        self.groups.write().insert(group.into(), entries);
    }

    /// Apply `update` to a group's leaderboard, creating it if missing
    pub fn update_group<F>(&self, group: &str, update: F)
    where
        F: FnOnce(&mut Vec<LeaderboardEntry>),
    {
        let mut groups = self.groups.write();
        update(groups.entry(group.to_string()).or_default());
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl LeaderboardSource for InMemoryLeaderboardSource {
    async fn snapshot(&self, group: &str) -> LeaderboardResult<Vec<LeaderboardEntry>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LeaderboardError::SourceUnavailable(
                "in-memory source offline".to_string(),
            ));
        }
        self.groups
            .read()
            .get(group)
            .cloned()
            .ok_or_else(|| LeaderboardError::GroupNotFound(group.to_string()))
    }
}
