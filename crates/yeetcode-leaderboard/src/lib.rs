//! # YeetCode Leaderboard
//!
//! Group standings and live change notifications.
//!
//! - [`rank_entries`]: XP-ordered standings with tier labels
//! - [`diff`]: joined / left / overtake notices between two snapshots
//! - [`NotificationQueue`]: newest-first, at most 3 visible, 5 second TTL
//! - [`RefreshCadence`]: 60 s in front, 600 s in the background
//! - [`LeaderboardMonitor`]: ties the above to a [`LeaderboardSource`]

pub mod cadence;
pub mod detector;
pub mod error;
pub mod monitor;
pub mod notifications;
pub mod source;
pub mod standings;

pub use cadence::{CadenceConfig, RefreshCadence};
pub use detector::{diff, Notification, NotificationKind, NOTIFICATION_TTL_SECS};
pub use error::{LeaderboardError, LeaderboardResult};
pub use monitor::LeaderboardMonitor;
pub use notifications::{NotificationQueue, MAX_VISIBLE_NOTIFICATIONS};
pub use source::{InMemoryLeaderboardSource, LeaderboardSource};
pub use standings::{rank_entries, StandingRow};
