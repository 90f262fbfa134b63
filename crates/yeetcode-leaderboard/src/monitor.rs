//! Leaderboard Monitor
//!
//! Pulls snapshots for one group on the refresh cadence, diffs each against
//! the previous one and keeps the resulting notifications in the visible
//! queue.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info};

use yeetcode_types::LeaderboardEntry;

use crate::cadence::{CadenceConfig, RefreshCadence};
use crate::detector::{diff, Notification};
use crate::notifications::NotificationQueue;
use crate::source::LeaderboardSource;
use crate::standings::{rank_entries, StandingRow};
use crate::LeaderboardResult;

/// Refreshes one group's leaderboard and tracks changes
pub struct LeaderboardMonitor {
    source: Arc<dyn LeaderboardSource>,
    group: String,
    previous: RwLock<Vec<LeaderboardEntry>>,
    queue: RwLock<NotificationQueue>,
    cadence: RwLock<RefreshCadence>,
}

impl LeaderboardMonitor {
    pub fn new(source: Arc<dyn LeaderboardSource>, group: impl Into<String>, cadence: CadenceConfig) -> Self {
        Self {
            source,
            group: group.into(),
            previous: RwLock::new(Vec::new()),
            queue: RwLock::new(NotificationQueue::new()),
            cadence: RwLock::new(RefreshCadence::new(cadence)),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Fetch a snapshot now and return the notifications it produced
    pub async fn refresh(&self, now: DateTime<Utc>) -> LeaderboardResult<Vec<Notification>> {
        let current = self.source.snapshot(&self.group).await?;

        let notifications = {
            let mut previous = self.previous.write();
            let notifications = diff(&previous, &current, now);
            *previous = current;
            notifications
        };

        {
            let mut queue = self.queue.write();
            queue.prune(now);
            queue.extend(notifications.iter().cloned());
        }
        self.cadence.write().mark_refreshed(now);

        if notifications.is_empty() {
            debug!(group = %self.group, "Leaderboard unchanged");
        }
        for notification in &notifications {
            info!(
                group = %self.group,
                kind = %notification.kind,
                user = %notification.username,
                "{}",
                notification.message
            );
        }
        Ok(notifications)
    }

    /// Refresh only if the cadence says one is due
    pub async fn refresh_if_due(&self, now: DateTime<Utc>) -> LeaderboardResult<Option<Vec<Notification>>> {
        if !self.cadence.read().is_due(now) {
            return Ok(None);
        }
        self.refresh(now).await.map(Some)
    }

    /// Record a focus change; refreshes right away when focus comes back
    /// and the minimum gap has passed.
    pub async fn set_focus(&self, focused: bool, now: DateTime<Utc>) -> LeaderboardResult<Option<Vec<Notification>>> {
        let refresh_now = self.cadence.write().set_focus(focused, now);
        debug!(group = %self.group, focused, refresh_now, "Focus changed");
        if refresh_now {
            self.refresh(now).await.map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn seconds_until_refresh(&self, now: DateTime<Utc>) -> u64 {
        self.cadence.read().seconds_until_refresh(now)
    }

    /// Visible notifications, newest first
    pub fn notifications(&self, now: DateTime<Utc>) -> Vec<Notification> {
        self.queue.read().visible(now)
    }

    /// Standings of the last fetched snapshot
    pub fn standings(&self) -> Vec<StandingRow> {
        rank_entries(&self.previous.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryLeaderboardSource;
    use crate::{LeaderboardError, NotificationKind};
    use chrono::Duration;
    use yeetcode_types::{SolveStats, Username};

    fn entry(name: &str, easy: u64) -> LeaderboardEntry {
        LeaderboardEntry::new(Username::new(name).unwrap(), name, SolveStats::new(easy, 0, 0, 0))
    }

    fn monitor(source: Arc<InMemoryLeaderboardSource>) -> LeaderboardMonitor {
        LeaderboardMonitor::new(source, "ABC123", CadenceConfig::default())
    }

    #[tokio::test]
    async fn test_refresh_cycle() {
        let source = Arc::new(InMemoryLeaderboardSource::new());
        source.set_group("ABC123", vec![entry("alice", 5), entry("bob", 4)]);
        let monitor = monitor(source.clone());
        let start = Utc::now();

        assert!(monitor.refresh(start).await.unwrap().is_empty());
        assert_eq!(monitor.standings()[0].username.as_str(), "alice");

        source.update_group("ABC123", |entries| {
            entries[1].stats.easy = 9;
            entries.push(entry("carol", 1));
        });

        assert!(monitor.refresh_if_due(start + Duration::seconds(30)).await.unwrap().is_none());

        let later = start + Duration::seconds(60);
        let notes = monitor.refresh_if_due(later).await.unwrap().unwrap();
        assert_eq!(notes.len(), 2);

        let visible = monitor.notifications(later);
        assert_eq!(visible[0].kind, NotificationKind::Overtake);
        assert_eq!(visible[1].kind, NotificationKind::Joined);
        assert!(monitor.notifications(later + Duration::seconds(5)).is_empty());
    }

    #[tokio::test]
    async fn test_source_failure_keeps_previous_snapshot() {
        let source = Arc::new(InMemoryLeaderboardSource::new());
        source.set_group("ABC123", vec![entry("alice", 5)]);
        let monitor = monitor(source.clone());
        monitor.refresh(Utc::now()).await.unwrap();

        source.set_offline(true);
        let result = monitor.refresh(Utc::now()).await;
        assert!(matches!(result, Err(LeaderboardError::SourceUnavailable(_))));
        assert_eq!(monitor.standings().len(), 1);
    }

    #[tokio::test]
    async fn test_focus_regain_refreshes() {
        let source = Arc::new(InMemoryLeaderboardSource::new());
        source.set_group("ABC123", vec![entry("alice", 5)]);
        let monitor = monitor(source);
        let start = Utc::now();
        monitor.refresh(start).await.unwrap();

        assert!(monitor.set_focus(false, start).await.unwrap().is_none());
        assert!(monitor.set_focus(true, start + Duration::seconds(10)).await.unwrap().is_none());

        monitor.set_focus(false, start + Duration::seconds(20)).await.unwrap();
        assert!(monitor.set_focus(true, start + Duration::seconds(90)).await.unwrap().is_some());
        assert_eq!(monitor.seconds_until_refresh(start + Duration::seconds(90)), 60);
    }
}
