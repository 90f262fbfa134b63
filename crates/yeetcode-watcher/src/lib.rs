//! # YeetCode Watcher
//!
//! Detects when the local user solves an active duel's problem.
//!
//! A [`SubmissionWatcher`] keeps one [`PollingSession`] per duel. Sessions
//! poll the [`SubmissionFeed`] immediately, then back off by
//! [`BackoffPolicy`] until the solve is found, the duel closes, or the
//! session is cancelled. Timers live in a [`TaskScheduler`] keyed by duel id.

pub mod backoff;
pub mod error;
pub mod feed;
pub mod scheduler;
pub mod session;
pub mod watcher;

pub use backoff::BackoffPolicy;
pub use error::{FeedError, FeedResult};
pub use feed::{InMemorySubmissionFeed, SubmissionFeed};
pub use scheduler::TaskScheduler;
pub use session::PollingSession;
pub use watcher::{DuelRecorder, PollOutcome, SubmissionWatcher, WatcherConfig, DEFAULT_BATCH_SIZE};
