//! Rank tiers
//!
//! Nine named XP brackets covering `[0, ∞)`. Lower bounds are inclusive.
//! Every bounded tier is cut into three equal sub-ranks (I lowest, III
//! highest). The top tier has no upper bound: it never leaves sub-rank I,
//! its progress reads 100%, and there is no next tier to climb to.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Tiers
// ============================================================================

/// Named XP bracket, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    ScriptKiddie,
    Debugger,
    StackOverflower,
    AlgorithmApprentice,
    LoopGuru,
    RecursionWizard,
    RegexSorcerer,
    MasterYeeter,
    GrandmasterYeeter,
}

impl Tier {
    /// All tiers in ascending XP order
    pub const ALL: [Tier; 9] = [
        Tier::ScriptKiddie,
        Tier::Debugger,
        Tier::StackOverflower,
        Tier::AlgorithmApprentice,
        Tier::LoopGuru,
        Tier::RecursionWizard,
        Tier::RegexSorcerer,
        Tier::MasterYeeter,
        Tier::GrandmasterYeeter,
    ];

    /// Locate the tier containing `xp`
    pub fn for_xp(xp: u64) -> Self {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|tier| xp >= tier.min_xp())
            .unwrap_or(Tier::ScriptKiddie)
    }

    /// Inclusive lower bound
    pub fn min_xp(&self) -> u64 {
        match self {
            Self::ScriptKiddie => 0,
            Self::Debugger => 500,
            Self::StackOverflower => 1_500,
            Self::AlgorithmApprentice => 3_500,
            Self::LoopGuru => 6_500,
            Self::RecursionWizard => 12_000,
            Self::RegexSorcerer => 20_000,
            Self::MasterYeeter => 35_000,
            Self::GrandmasterYeeter => 50_000,
        }
    }

    /// Inclusive upper bound; `None` for the unbounded top tier
    pub fn max_xp(&self) -> Option<u64> {
        self.next().map(|next| next.min_xp() - 1)
    }

    /// Number of XP values in the tier
    pub fn width(&self) -> Option<u64> {
        self.max_xp().map(|max| max - self.min_xp() + 1)
    }

    pub fn next(&self) -> Option<Tier> {
        let idx = Self::ALL.iter().position(|t| t == self)?;
        Self::ALL.get(idx + 1).copied()
    }

    pub fn is_top(&self) -> bool {
        self.next().is_none()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ScriptKiddie => "Script Kiddie",
            Self::Debugger => "Debugger",
            Self::StackOverflower => "Stack Overflower",
            Self::AlgorithmApprentice => "Algorithm Apprentice",
            Self::LoopGuru => "Loop Guru",
            Self::RecursionWizard => "Recursion Wizard",
            Self::RegexSorcerer => "Regex Sorcerer",
            Self::MasterYeeter => "Master Yeeter",
            Self::GrandmasterYeeter => "Grandmaster Yeeter",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Subdivisions
// ============================================================================

/// Sub-rank within a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Subdivision {
    I,
    II,
    III,
}

impl fmt::Display for Subdivision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::I => "I",
            Self::II => "II",
            Self::III => "III",
        };
        f.write_str(s)
    }
}

/// Tier plus sub-rank, displayed as e.g. `Loop Guru II`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TierLabel {
    pub tier: Tier,
    pub subdivision: Subdivision,
}

impl fmt::Display for TierLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tier, self.subdivision)
    }
}

/// Tier and sub-rank for an XP total
pub fn tier_label(xp: u64) -> TierLabel {
    let tier = Tier::for_xp(xp);

    let subdivision = match tier.width() {
        Some(width) => {
            let sub_size = width / 3;
            let min = tier.min_xp();
            if xp >= min + 2 * sub_size {
                Subdivision::III
            } else if xp >= min + sub_size {
                Subdivision::II
            } else {
                Subdivision::I
            }
        }
        None => Subdivision::I,
    };

    TierLabel { tier, subdivision }
}

/// Percent through the current tier; the top tier reads 100
pub fn tier_progress_percent(xp: u64) -> f64 {
    let tier = Tier::for_xp(xp);
    match tier.width() {
        Some(width) => (xp - tier.min_xp()) as f64 / width as f64 * 100.0,
        None => 100.0,
    }
}

/// XP still needed to reach the next tier; `None` once in the top tier
pub fn xp_to_next_tier(xp: u64) -> Option<u64> {
    Tier::for_xp(xp).next().map(|next| next.min_xp() - xp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_are_contiguous() {
        assert_eq!(Tier::ALL[0].min_xp(), 0);
        for pair in Tier::ALL.windows(2) {
            assert_eq!(pair[0].max_xp(), Some(pair[1].min_xp() - 1));
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(Tier::GrandmasterYeeter.max_xp(), None);
        assert!(Tier::GrandmasterYeeter.is_top());
    }

    #[test]
    fn test_lower_bounds_are_inclusive() {
        assert_eq!(Tier::for_xp(499), Tier::ScriptKiddie);
        assert_eq!(Tier::for_xp(500), Tier::Debugger);
        assert_eq!(Tier::for_xp(11_999), Tier::LoopGuru);
        assert_eq!(Tier::for_xp(12_000), Tier::RecursionWizard);
        assert_eq!(Tier::for_xp(u64::MAX), Tier::GrandmasterYeeter);
    }

    #[test]
    fn test_boundary_labels() {
        assert_eq!(tier_label(499).to_string(), "Script Kiddie III");
        assert_eq!(tier_label(500).to_string(), "Debugger I");
        assert_ne!(tier_label(499).tier, tier_label(500).tier);
    }

    #[test]
    fn test_subdivisions() {
        // Debugger: [500, 1499], width 1000, sub size 333
        assert_eq!(tier_label(832).subdivision, Subdivision::I);
        assert_eq!(tier_label(833).subdivision, Subdivision::II);
        assert_eq!(tier_label(1_165).subdivision, Subdivision::II);
        assert_eq!(tier_label(1_166).subdivision, Subdivision::III);

        // Recursion Wizard: [12000, 19999], sub size 2666
        assert_eq!(tier_label(12_500).to_string(), "Recursion Wizard I");
    }

    #[test]
    fn test_top_tier_policy() {
        let label = tier_label(1_000_000);
        assert_eq!(label.tier, Tier::GrandmasterYeeter);
        assert_eq!(label.subdivision, Subdivision::I);
        assert_eq!(tier_progress_percent(50_000), 100.0);
        assert_eq!(xp_to_next_tier(75_000), None);
    }

    #[test]
    fn test_progress_and_next_tier() {
        assert_eq!(tier_progress_percent(0), 0.0);
        assert_eq!(tier_progress_percent(250), 50.0);
        assert!(tier_progress_percent(499) < 100.0);
        assert_eq!(xp_to_next_tier(0), Some(500));
        assert_eq!(xp_to_next_tier(49_999), Some(1));
    }
}
