//! Leaderboard types
//!
//! A leaderboard snapshot is a point-in-time list of per-member solve counts
//! for one study group, keyed by username.

use serde::{Deserialize, Serialize};

use crate::Username;

/// Solved-problem counts plus bonus awards, the input to XP scoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveStats {
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
    /// Daily challenges, bounties and duel wins
    #[serde(rename = "bonusXP")]
    pub bonus_xp: u64,
}

impl SolveStats {
    pub fn new(easy: u64, medium: u64, hard: u64, bonus_xp: u64) -> Self {
        Self {
            easy,
            medium,
            hard,
            bonus_xp,
        }
    }

    pub fn total_solved(&self) -> u64 {
        self.easy.saturating_add(self.medium).saturating_add(self.hard)
    }
}

/// One member's row in a group leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub username: Username,
    pub display_name: String,
    #[serde(flatten)]
    pub stats: SolveStats,
    #[serde(default)]
    pub university: Option<String>,
}

impl LeaderboardEntry {
    pub fn new(username: Username, display_name: impl Into<String>, stats: SolveStats) -> Self {
        Self {
            username,
            display_name: display_name.into(),
            stats,
            university: None,
        }
    }

    pub fn with_university(mut self, university: impl Into<String>) -> Self {
        self.university = Some(university.into());
        self
    }
}
