//! Duel types for YeetCode
//!
//! A duel is a timed 1-on-1 race between two group members to solve the same
//! problem. These are plain data types; the transition rules live in the
//! `yeetcode-duels` crate.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{DuelId, TypeError, Username};

/// How long a challenge may stay unanswered before it is swept to REJECTED
pub const PENDING_TTL_HOURS: i64 = 3;

/// How long an accepted duel may run before it is swept to EXPIRED
pub const ACTIVE_TTL_HOURS: i64 = 2;

/// Bonus on top of the difficulty's base XP awarded to a duel winner
pub const DUEL_WIN_BONUS_XP: u64 = 200;

// ============================================================================
// Difficulty
// ============================================================================

/// Concrete problem difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// All concrete difficulties, easiest first
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// XP granted per solved problem of this difficulty
    pub fn base_xp(&self) -> u64 {
        match self {
            Self::Easy => 100,
            Self::Medium => 300,
            Self::Hard => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(TypeError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Difficulty requested by a challenger.
///
/// `Random` only exists at request time; it is resolved to a concrete
/// [`Difficulty`] before a duel is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyChoice {
    Fixed(Difficulty),
    Random,
}

impl From<Difficulty> for DifficultyChoice {
    fn from(difficulty: Difficulty) -> Self {
        Self::Fixed(difficulty)
    }
}

impl FromStr for DifficultyChoice {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("random") {
            return Ok(Self::Random);
        }
        s.parse().map(Self::Fixed)
    }
}

// ============================================================================
// Problem
// ============================================================================

/// A problem selected for a duel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    /// URL slug, e.g. `two-sum`
    pub slug: String,
    pub title: String,
    pub difficulty: Difficulty,
}

impl Problem {
    pub fn new(slug: impl Into<String>, title: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            difficulty,
        }
    }
}

// ============================================================================
// Duel
// ============================================================================

/// Duel lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DuelStatus {
    /// Challenge sent, waiting for the challengee
    Pending,
    /// Accepted, both players racing
    Active,
    /// Both times recorded, winner decided
    Completed,
    /// Declined, or never answered in time
    Rejected,
    /// Accepted but not finished in time
    Expired,
}

impl DuelStatus {
    /// Whether the duel still appears in a member's open duel list
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }

    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }
}

impl fmt::Display for DuelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
        };
        f.write_str(s)
    }
}

/// Which side of a duel a member is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Challenger,
    Challengee,
}

/// Result of a duel from one member's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuelOutcome {
    Won,
    Lost,
    /// Still pending or active
    Undecided,
    /// Rejected or expired; nobody won
    NoContest,
}

/// A 1-on-1 duel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Duel {
    pub duel_id: DuelId,
    pub challenger: Username,
    pub challengee: Username,
    pub difficulty: Difficulty,
    pub status: DuelStatus,
    pub created_at: DateTime<Utc>,
    /// Set on accept; retained after the duel ends
    pub start_time: Option<DateTime<Utc>>,
    pub problem_slug: String,
    pub problem_title: String,
    /// Elapsed milliseconds from `start_time` to the challenger's solve
    pub challenger_time: Option<u64>,
    /// Elapsed milliseconds from `start_time` to the challengee's solve
    pub challengee_time: Option<u64>,
    pub winner: Option<Username>,
    pub xp_awarded: Option<u64>,
    /// Set when the expiry sweep closed the duel, as opposed to a decline
    /// or a finish
    #[serde(default)]
    pub timed_out: bool,
}

impl Duel {
    /// Which side `user` plays, if any
    pub fn side_of(&self, user: &Username) -> Option<Side> {
        if &self.challenger == user {
            Some(Side::Challenger)
        } else if &self.challengee == user {
            Some(Side::Challengee)
        } else {
            None
        }
    }

    pub fn is_participant(&self, user: &Username) -> bool {
        self.side_of(user).is_some()
    }

    /// The other participant
    pub fn opponent_of(&self, user: &Username) -> Option<&Username> {
        match self.side_of(user)? {
            Side::Challenger => Some(&self.challengee),
            Side::Challengee => Some(&self.challenger),
        }
    }

    /// Recorded elapsed time for one side
    pub fn time_for(&self, side: Side) -> Option<u64> {
        match side {
            Side::Challenger => self.challenger_time,
            Side::Challengee => self.challengee_time,
        }
    }

    /// Moment the duel stops being answerable (pending) or winnable (active)
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            DuelStatus::Pending => Some(self.created_at + Duration::hours(PENDING_TTL_HOURS)),
            DuelStatus::Active => self
                .start_time
                .map(|start| start + Duration::hours(ACTIVE_TTL_HOURS)),
            _ => None,
        }
    }

    /// Time left before expiry, floored at zero
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires_at()
            .map(|deadline| (deadline - now).max(Duration::zero()))
    }

    /// Whether the expiry sweep would move this duel to a terminal state at `now`
    pub fn is_due_for_expiry(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map_or(false, |deadline| now >= deadline)
    }

    pub fn outcome_for(&self, user: &Username) -> DuelOutcome {
        match self.status {
            DuelStatus::Pending | DuelStatus::Active => DuelOutcome::Undecided,
            DuelStatus::Rejected | DuelStatus::Expired => DuelOutcome::NoContest,
            DuelStatus::Completed => {
                if self.winner.as_ref() == Some(user) {
                    DuelOutcome::Won
                } else {
                    DuelOutcome::Lost
                }
            }
        }
    }
}

/// Render elapsed milliseconds as `m:ss`
pub fn format_elapsed(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
