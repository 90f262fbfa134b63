//! Bounded queue of visible notifications

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::detector::Notification;

/// Most notifications shown at once
pub const MAX_VISIBLE_NOTIFICATIONS: usize = 3;

/// Newest-first queue capped at [`MAX_VISIBLE_NOTIFICATIONS`]
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    items: VecDeque<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one notification at the front, evicting the oldest beyond the cap
    pub fn push(&mut self, notification: Notification) {
        self.items.push_front(notification);
        self.items.truncate(MAX_VISIBLE_NOTIFICATIONS);
    }

    /// Add a batch in emission order; the last one ends up newest
    pub fn extend(&mut self, notifications: impl IntoIterator<Item = Notification>) {
        for notification in notifications {
            self.push(notification);
        }
    }

    /// Drop expired notifications; returns how many were removed
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.items.len();
        self.items.retain(|n| !n.is_expired(now));
        before - self.items.len()
    }

    /// Unexpired notifications, newest first
    pub fn visible(&self, now: DateTime<Utc>) -> Vec<Notification> {
        self.items
            .iter()
            .filter(|n| !n.is_expired(now))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::NotificationKind;
    use chrono::Duration;
    use yeetcode_types::Username;

    fn note(name: &str, at: DateTime<Utc>) -> Notification {
        Notification::new(
            NotificationKind::Joined,
            Username::new(name).unwrap(),
            format!("{} joined", name),
            at,
        )
    }

    #[test]
    fn test_cap_keeps_newest() {
        let now = Utc::now();
        let mut queue = NotificationQueue::new();
        queue.extend(["a", "b", "c", "d"].iter().map(|n| note(n, now)));

        let names: Vec<String> = queue
            .visible(now)
            .into_iter()
            .map(|n| n.username.to_string())
            .collect();
        assert_eq!(names, vec!["d", "c", "b"]);
    }

    #[test]
    fn test_expired_items_hidden_and_pruned() {
        let now = Utc::now();
        let mut queue = NotificationQueue::new();
        queue.push(note("old", now));
        queue.push(note("new", now + Duration::seconds(3)));

        let later = now + Duration::seconds(6);
        assert_eq!(queue.visible(later).len(), 1);
        assert_eq!(queue.prune(later), 1);
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.prune(now + Duration::seconds(8)), 1);
        assert!(queue.is_empty());
    }
}
