//! Leaderboard change detection
//!
//! Compares two snapshots of the same group and describes what changed:
//! members who joined, members who left, and members who climbed past
//! someone. Departures shift everyone below them up a rank, so a cycle with
//! any departure reports no overtakes at all.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use yeetcode_types::{LeaderboardEntry, NotificationId, Username};

use crate::standings::{by_xp, display_name};

/// How long a notification stays visible
pub const NOTIFICATION_TTL_SECS: i64 = 5;

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Joined,
    Left,
    Overtake,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Joined => "joined",
            Self::Left => "left",
            Self::Overtake => "overtake",
        };
        f.write_str(s)
    }
}

/// A transient leaderboard notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Member the notice is about
    pub username: Username,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        username: Username,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            kind,
            username,
            message: message.into(),
            created_at,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::seconds(NOTIFICATION_TTL_SECS)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

// ============================================================================
// Diff
// ============================================================================

fn ranks(entries: &[LeaderboardEntry]) -> HashMap<&Username, usize> {
    by_xp(entries)
        .into_iter()
        .enumerate()
        .map(|(idx, (entry, _))| (&entry.username, idx + 1))
        .collect()
}

/// Notifications for the change from `previous` to `current`.
///
/// Nothing is reported when `previous` is empty. Order: joins (current
/// snapshot order), departures (previous snapshot order), then overtakes
/// by new rank.
pub fn diff(
    previous: &[LeaderboardEntry],
    current: &[LeaderboardEntry],
    now: DateTime<Utc>,
) -> Vec<Notification> {
    if previous.is_empty() {
        return Vec::new();
    }

    let old_ranks = ranks(previous);
    let new_ranks = ranks(current);
    let mut notifications = Vec::new();

    for entry in current {
        if !old_ranks.contains_key(&entry.username) {
            let name = display_name(&entry.display_name, &entry.username);
            notifications.push(Notification::new(
                NotificationKind::Joined,
                entry.username.clone(),
                format!("{} joined the leaderboard!", name),
                now,
            ));
        }
    }

    let mut departed = false;
    for entry in previous {
        if !new_ranks.contains_key(&entry.username) {
            departed = true;
            let name = display_name(&entry.display_name, &entry.username);
            notifications.push(Notification::new(
                NotificationKind::Left,
                entry.username.clone(),
                format!("{} left the leaderboard", name),
                now,
            ));
        }
    }

    if departed {
        return notifications;
    }

    for (entry, _) in by_xp(current) {
        let (Some(&old_rank), Some(&new_rank)) =
            (old_ranks.get(&entry.username), new_ranks.get(&entry.username))
        else {
            continue;
        };
        if new_rank >= old_rank {
            continue;
        }

        let name = display_name(&entry.display_name, &entry.username);
        let climbed = old_rank - new_rank;
        let message = if climbed == 1 {
            format!("{} moved up to #{}!", name, new_rank)
        } else {
            format!("{} jumped {} spots to #{}!", name, climbed, new_rank)
        };
        notifications.push(Notification::new(
            NotificationKind::Overtake,
            entry.username.clone(),
            message,
            now,
        ));
    }

    notifications
}
