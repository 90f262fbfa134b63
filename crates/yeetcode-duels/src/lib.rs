//! # YeetCode Duels
//!
//! Timed 1-on-1 duels between group members.
//!
//! ## Lifecycle
//!
//! - **Pending**: challenge sent, waiting up to 3 hours for an answer
//! - **Active**: accepted, both players race on the same problem for up to 2 hours
//! - **Completed**: both times recorded, the faster player wins the XP
//! - **Rejected**: declined, or left unanswered too long
//! - **Expired**: active duel ran out of time without a result
//!
//! [`lifecycle`] holds the pure transitions. [`DuelManager`] wraps them with
//! the store, the problem catalog and a clock.

pub mod catalog;
pub mod clock;
pub mod error;
pub mod incoming;
pub mod lifecycle;
pub mod manager;
pub mod store;

pub use catalog::{ProblemCatalog, StaticCatalog};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CatalogError, DuelError, DuelResult, StoreError, StoreResult};
pub use incoming::IncomingDuelDetector;
pub use lifecycle::{duel_reward, valid_transitions, DuelCommand, DuelEvent};
pub use manager::{DuelManager, RECENT_DUELS_LIMIT};
pub use store::{DuelStore, InMemoryDuelStore};

pub use yeetcode_types::{Difficulty, DifficultyChoice, Duel, DuelId, DuelStatus, Username};
