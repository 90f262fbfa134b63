//! Focus-aware refresh cadence
//!
//! The leaderboard refreshes every minute while the app is in front and
//! every ten minutes in the background. Regaining focus triggers an
//! immediate refresh, but never sooner than a minute after the last one.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const FOREGROUND_INTERVAL_SECS: u64 = 60;
pub const BACKGROUND_INTERVAL_SECS: u64 = 600;
pub const MIN_REFRESH_GAP_SECS: u64 = 60;

/// Refresh intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceConfig {
    pub foreground_secs: u64,
    pub background_secs: u64,
    pub min_gap_secs: u64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            foreground_secs: FOREGROUND_INTERVAL_SECS,
            background_secs: BACKGROUND_INTERVAL_SECS,
            min_gap_secs: MIN_REFRESH_GAP_SECS,
        }
    }
}

/// Tracks focus and the last refresh to decide when the next one is due
#[derive(Debug, Clone)]
pub struct RefreshCadence {
    config: CadenceConfig,
    focused: bool,
    last_refresh: Option<DateTime<Utc>>,
}

impl RefreshCadence {
    pub fn new(config: CadenceConfig) -> Self {
        Self {
            config,
            focused: true,
            last_refresh: None,
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    /// Current interval between refreshes
    pub fn interval(&self) -> Duration {
        let secs = if self.focused {
            self.config.foreground_secs
        } else {
            self.config.background_secs
        };
        Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))
    }

    /// Update focus. Returns true when regaining focus should refresh now.
    pub fn set_focus(&mut self, focused: bool, now: DateTime<Utc>) -> bool {
        let regained = focused && !self.focused;
        self.focused = focused;
        regained && self.gap_elapsed(now)
    }

    /// Whether a scheduled refresh is due at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_refresh {
            None => true,
            Some(last) => now >= last + self.interval(),
        }
    }

    pub fn mark_refreshed(&mut self, now: DateTime<Utc>) {
        self.last_refresh = Some(now);
    }

    /// Whole seconds until the next scheduled refresh, zero when due
    pub fn seconds_until_refresh(&self, now: DateTime<Utc>) -> u64 {
        match self.last_refresh {
            None => 0,
            Some(last) => {
                let remaining = (last + self.interval() - now).num_seconds();
                u64::try_from(remaining).unwrap_or(0)
            }
        }
    }

    fn gap_elapsed(&self, now: DateTime<Utc>) -> bool {
        let gap = Duration::seconds(i64::try_from(self.config.min_gap_secs).unwrap_or(i64::MAX));
        self.last_refresh.map_or(true, |last| now >= last + gap)
    }
}

impl Default for RefreshCadence {
    fn default() -> Self {
        Self::new(CadenceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreground_and_background_intervals() {
        let start = Utc::now();
        let mut cadence = RefreshCadence::default();
        assert!(cadence.is_due(start));

        cadence.mark_refreshed(start);
        assert!(!cadence.is_due(start + Duration::seconds(59)));
        assert!(cadence.is_due(start + Duration::seconds(60)));

        cadence.set_focus(false, start);
        assert!(!cadence.is_due(start + Duration::seconds(599)));
        assert!(cadence.is_due(start + Duration::seconds(600)));
        assert_eq!(cadence.seconds_until_refresh(start + Duration::seconds(100)), 500);
    }

    #[test]
    fn test_focus_regain_respects_min_gap() {
        let start = Utc::now();
        let mut cadence = RefreshCadence::default();
        cadence.mark_refreshed(start);

        cadence.set_focus(false, start + Duration::seconds(5));
        assert!(!cadence.set_focus(true, start + Duration::seconds(30)));

        cadence.set_focus(false, start + Duration::seconds(40));
        assert!(cadence.set_focus(true, start + Duration::seconds(61)));
    }

    #[test]
    fn test_focus_while_focused_does_nothing() {
        let start = Utc::now();
        let mut cadence = RefreshCadence::default();
        assert!(!cadence.set_focus(true, start));
        assert_eq!(cadence.seconds_until_refresh(start), 0);
    }
}
