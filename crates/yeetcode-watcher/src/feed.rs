//! Submission feed collaborator

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use yeetcode_types::{Submission, Username};

use crate::{FeedError, FeedResult};

/// Source of a user's latest submissions
#[async_trait]
pub trait SubmissionFeed: Send + Sync {
    /// Up to `limit` submissions for `user`, most recent first
    async fn fetch_recent_submissions(
        &self,
        user: &Username,
        limit: usize,
    ) -> FeedResult<Vec<Submission>>;
}

/// In-memory feed for testing and the dev harness
#[derive(Default)]
pub struct InMemorySubmissionFeed {
    submissions: RwLock<HashMap<Username, Vec<Submission>>>,
    failures_remaining: AtomicU32,
    fetches: AtomicUsize,
}

impl InMemorySubmissionFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new submission as the user's most recent one
    pub fn push(&self, user: &Username, submission: Submission) {
        self.submissions
            .write()
            .entry(user.clone())
            .or_default()
            .insert(0, submission);
    }

    /// Make the next `count` fetches fail
    pub fn fail_next(&self, count: u32) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    /// Number of fetches served so far, failed ones included
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmissionFeed for InMemorySubmissionFeed {
    async fn fetch_recent_submissions(
        &self,
        user: &Username,
        limit: usize,
    ) -> FeedResult<Vec<Submission>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(FeedError::Unavailable("simulated outage".to_string()));
        }

        Ok(self
            .submissions
            .read()
            .get(user)
            .map(|list| list.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_newest_first_and_limited() {
        let feed = InMemorySubmissionFeed::new();
        let alice = Username::new("alice").unwrap();
        let now = Utc::now();

        feed.push(&alice, Submission::accepted("two-sum", now));
        feed.push(&alice, Submission::accepted("coin-change", now + Duration::seconds(5)));
        feed.push(&alice, Submission::accepted("climbing-stairs", now + Duration::seconds(9)));

        let latest = feed.fetch_recent_submissions(&alice, 2).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].problem_slug, "climbing-stairs");
        assert_eq!(latest[1].problem_slug, "coin-change");
    }

    #[tokio::test]
    async fn test_simulated_failures() {
        let feed = InMemorySubmissionFeed::new();
        let alice = Username::new("alice").unwrap();
        feed.fail_next(2);

        assert!(feed.fetch_recent_submissions(&alice, 10).await.is_err());
        assert!(feed.fetch_recent_submissions(&alice, 10).await.is_err());
        assert!(feed.fetch_recent_submissions(&alice, 10).await.unwrap().is_empty());
        assert_eq!(feed.fetch_count(), 3);
    }
}
