//! Ranked standings

use serde::{Deserialize, Serialize};

use yeetcode_rank::{calculate_xp, tier_label, TierLabel};
use yeetcode_types::{LeaderboardEntry, Username};

/// One ranked leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    /// 1-indexed
    pub rank: usize,
    pub username: Username,
    pub display_name: String,
    pub university: Option<String>,
    pub xp: u64,
    pub tier: TierLabel,
}

impl StandingRow {
    /// Display name, or the username when none was set
    pub fn name(&self) -> &str {
        display_name(&self.display_name, &self.username)
    }
}

pub(crate) fn display_name<'a>(display_name: &'a str, username: &'a Username) -> &'a str {
    if display_name.trim().is_empty() {
        username.as_str()
    } else {
        display_name
    }
}

/// Entries paired with XP, highest first. Equal XP keeps the input order.
pub(crate) fn by_xp(entries: &[LeaderboardEntry]) -> Vec<(&LeaderboardEntry, u64)> {
    let mut ranked: Vec<(&LeaderboardEntry, u64)> = entries
        .iter()
        .map(|entry| (entry, calculate_xp(&entry.stats)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Rank a snapshot for display
pub fn rank_entries(entries: &[LeaderboardEntry]) -> Vec<StandingRow> {
    by_xp(entries)
        .into_iter()
        .enumerate()
        .map(|(idx, (entry, xp))| StandingRow {
            rank: idx + 1,
            username: entry.username.clone(),
            display_name: entry.display_name.clone(),
            university: entry.university.clone(),
            xp,
            tier: tier_label(xp),
        })
        .collect()
}
