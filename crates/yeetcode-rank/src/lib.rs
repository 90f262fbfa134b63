//! YeetCode Rank - XP scoring and tier labels
//!
//! Pure functions only: no I/O, no clock, no allocation beyond labels.
//!
//! # XP
//!
//! ```text
//! xp = easy*100 + medium*300 + hard*500 + bonusXP
//! ```
//!
//! # Example
//!
//! ```
//! use yeetcode_rank::{calculate_xp, tier_label, SolveStats};
//!
//! let xp = calculate_xp(&SolveStats::new(40, 20, 5, 0));
//! assert_eq!(xp, 12_500);
//! assert_eq!(tier_label(xp).to_string(), "Recursion Wizard I");
//! ```

pub mod tiers;

use serde::{Deserialize, Serialize};

pub use tiers::{tier_label, tier_progress_percent, xp_to_next_tier, Subdivision, Tier, TierLabel};
pub use yeetcode_types::{Difficulty, SolveStats};

/// Total XP for a member's stats.
///
/// Saturates instead of overflowing, so the function is total and stays
/// monotonic non-decreasing in every input.
pub fn calculate_xp(stats: &SolveStats) -> u64 {
    stats
        .easy
        .saturating_mul(Difficulty::Easy.base_xp())
        .saturating_add(stats.medium.saturating_mul(Difficulty::Medium.base_xp()))
        .saturating_add(stats.hard.saturating_mul(Difficulty::Hard.base_xp()))
        .saturating_add(stats.bonus_xp)
}

/// Everything the UI shows about a member's rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankSummary {
    pub xp: u64,
    pub label: TierLabel,
    /// Percent through the current tier, 0..=100
    pub progress_percent: f64,
    /// XP still needed to enter the next tier; `None` in the top tier
    pub xp_to_next_tier: Option<u64>,
}

impl RankSummary {
    pub fn for_xp(xp: u64) -> Self {
        Self {
            xp,
            label: tier_label(xp),
            progress_percent: tier_progress_percent(xp),
            xp_to_next_tier: xp_to_next_tier(xp),
        }
    }

    pub fn for_stats(stats: &SolveStats) -> Self {
        Self::for_xp(calculate_xp(stats))
    }
}
