//! Stepped exponential backoff between polls

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_MS: u64 = 1_000;
pub const DEFAULT_MAX_MS: u64 = 30_000;
/// Misses per doubling
pub const DEFAULT_STEP: u32 = 3;

/// Interval after the n-th consecutive miss is
/// `min(base_ms * 2^(n / step), max_ms)`, counting misses from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    pub base_ms: u64,
    pub max_ms: u64,
    pub step: u32,
}

impl BackoffPolicy {
    pub fn new(base_ms: u64, max_ms: u64, step: u32) -> Self {
        Self {
            base_ms,
            max_ms,
            step: step.max(1),
        }
    }

    /// Delay in milliseconds after `misses` earlier misses
    pub fn interval_ms(&self, misses: u32) -> u64 {
        let doublings = misses / self.step.max(1);
        let factor = 1u64.checked_shl(doublings).unwrap_or(u64::MAX);
        self.base_ms.saturating_mul(factor).min(self.max_ms)
    }

    pub fn interval(&self, misses: u32) -> Duration {
        Duration::from_millis(self.interval_ms(misses))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_MS, DEFAULT_MAX_MS, DEFAULT_STEP)
    }
}
