//! Polling state for one watched duel

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::time::Duration;

use yeetcode_types::{DuelId, Submission, ACTIVE_TTL_HOURS};

use crate::backoff::BackoffPolicy;

/// One duel being watched for the local user's solve
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingSession {
    pub duel_id: DuelId,
    pub problem_slug: String,
    pub start_timestamp: DateTime<Utc>,
    /// The duel expires here; no polls run at or after it
    pub deadline: DateTime<Utc>,
    pub attempt_count: u32,
    pub current_interval_ms: u64,
}

impl PollingSession {
    pub fn new(duel_id: DuelId, problem_slug: impl Into<String>, start_timestamp: DateTime<Utc>) -> Self {
        Self {
            duel_id,
            problem_slug: problem_slug.into(),
            start_timestamp,
            deadline: start_timestamp + ChronoDuration::hours(ACTIVE_TTL_HOURS),
            attempt_count: 0,
            current_interval_ms: 0,
        }
    }

    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }

    /// Elapsed milliseconds of the first accepted solve of the duel problem
    /// made strictly after the duel started, if the batch contains one.
    pub fn find_solve(&self, submissions: &[Submission]) -> Option<u64> {
        submissions
            .iter()
            .filter(|s| s.is_accepted())
            .find(|s| s.problem_slug == self.problem_slug && s.timestamp > self.start_timestamp)
            .and_then(|s| u64::try_from((s.timestamp - self.start_timestamp).num_milliseconds()).ok())
    }

    /// Count a miss and return the delay before the next poll
    pub fn record_miss(&mut self, policy: &BackoffPolicy) -> Duration {
        self.current_interval_ms = policy.interval_ms(self.attempt_count);
        self.attempt_count = self.attempt_count.saturating_add(1);
        Duration::from_millis(self.current_interval_ms)
    }
}
