//! YeetCode Types - Canonical domain types for the duel and ranking engine
//!
//! This crate contains the foundational types shared by every YeetCode crate,
//! with zero dependencies on other yeetcode crates:
//!
//! - Identity types (DuelId, NotificationId, Username)
//! - Duels, difficulties and problems
//! - Leaderboard entries
//! - Accepted submissions reported by the submission feed
//!
//! # Duel Lifecycle
//!
//! ```text
//! PENDING --accept--> ACTIVE --both times recorded--> COMPLETED
//!    |                   |
//!    +--reject/3h--> REJECTED    +--2h--> EXPIRED
//! ```

pub mod identity;
pub mod duel;
pub mod leaderboard;
pub mod submission;
pub mod error;

pub use identity::*;
pub use duel::*;
pub use leaderboard::*;
pub use submission::*;
pub use error::*;

/// Version of the YeetCode types schema
pub const TYPES_VERSION: &str = "0.1.0";
