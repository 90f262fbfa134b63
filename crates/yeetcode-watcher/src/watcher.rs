//! Submission Watcher
//!
//! One polling session per active duel. Each session polls the local user's
//! recent submissions, backs off on misses and feed errors, and hands the
//! solve time to the duel manager once the duel problem shows up as accepted.
//! A session closes on its own once the duel's active window has passed.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use yeetcode_duels::{Clock, DuelManager, DuelResult, SystemClock};
use yeetcode_types::{Duel, DuelId, DuelStatus, Username};

use crate::backoff::BackoffPolicy;
use crate::feed::SubmissionFeed;
use crate::scheduler::TaskScheduler;
use crate::session::PollingSession;

/// Submissions fetched per poll
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Where detected solve times go
#[async_trait]
pub trait DuelRecorder: Send + Sync {
    async fn record_submission(
        &self,
        id: &DuelId,
        username: &Username,
        elapsed_ms: u64,
    ) -> DuelResult<Duel>;
}

#[async_trait]
impl DuelRecorder for DuelManager {
    async fn record_submission(
        &self,
        id: &DuelId,
        username: &Username,
        elapsed_ms: u64,
    ) -> DuelResult<Duel> {
        DuelManager::record_submission(self, id, username, elapsed_ms).await
    }
}

/// Watcher tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherConfig {
    pub backoff: BackoffPolicy,
    pub batch_size: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            backoff: BackoffPolicy::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Result of a single poll
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Solve detected and recorded; the session is over
    Recorded(Duel),
    /// Nothing yet; next poll after the given delay
    Retry(Duration),
    /// The duel no longer accepts submissions; the session is over
    Closed,
    /// A session for this duel already exists
    AlreadyWatching,
}

struct PollContext {
    user: Username,
    feed: Arc<dyn SubmissionFeed>,
    recorder: Arc<dyn DuelRecorder>,
    clock: Arc<dyn Clock>,
    config: WatcherConfig,
    sessions: RwLock<HashMap<DuelId, PollingSession>>,
}

enum Step {
    Detected(Duel),
    Miss,
    Closed,
}

impl PollContext {
    async fn poll(&self, session: &PollingSession) -> Step {
        if session.is_past_deadline(self.clock.now()) {
            debug!(duel_id = %session.duel_id, deadline = %session.deadline, "Duel window closed");
            return Step::Closed;
        }

        let submissions = match self
            .feed
            .fetch_recent_submissions(&self.user, self.config.batch_size)
            .await
        {
            Ok(submissions) => submissions,
            Err(err) => {
                warn!(duel_id = %session.duel_id, error = %err, "Submission feed error");
                return Step::Miss;
            }
        };

        let Some(elapsed_ms) = session.find_solve(&submissions) else {
            return Step::Miss;
        };

        match self
            .recorder
            .record_submission(&session.duel_id, &self.user, elapsed_ms)
            .await
        {
            Ok(duel) => {
                info!(
                    duel_id = %session.duel_id,
                    user = %self.user,
                    elapsed_ms,
                    status = %duel.status,
                    "Duel solve detected"
                );
                Step::Detected(duel)
            }
            Err(err) if err.is_transient() => {
                warn!(duel_id = %session.duel_id, error = %err, "Could not record solve, will retry");
                Step::Miss
            }
            Err(err) => {
                debug!(duel_id = %session.duel_id, error = %err, "Duel closed to submissions");
                Step::Closed
            }
        }
    }

    /// Advance the session after a miss and publish it. `None` when the
    /// session was cancelled while the poll was in flight.
    fn miss(&self, session: &mut PollingSession) -> Option<Duration> {
        let delay = session.record_miss(&self.config.backoff);
        let mut sessions = self.sessions.write();
        let slot = sessions.get_mut(&session.duel_id)?;
        *slot = session.clone();

        debug!(
            duel_id = %session.duel_id,
            attempt = session.attempt_count,
            next_ms = session.current_interval_ms,
            "No solve yet"
        );
        Some(delay)
    }

    fn finish(&self, duel_id: &DuelId) {
        self.sessions.write().remove(duel_id);
    }
}

async fn poll_loop(ctx: Arc<PollContext>, mut session: PollingSession) {
    loop {
        match ctx.poll(&session).await {
            Step::Miss => match ctx.miss(&mut session) {
                Some(delay) => tokio::time::sleep(delay).await,
                None => return,
            },
            Step::Detected(_) | Step::Closed => {
                ctx.finish(&session.duel_id);
                return;
            }
        }
    }
}

/// Watches active duels for the local user's solves
pub struct SubmissionWatcher {
    ctx: Arc<PollContext>,
    scheduler: TaskScheduler<DuelId>,
}

impl SubmissionWatcher {
    /// Watcher whose session deadlines follow the system clock
    pub fn new(
        user: Username,
        feed: Arc<dyn SubmissionFeed>,
        recorder: Arc<dyn DuelRecorder>,
        config: WatcherConfig,
    ) -> Self {
        Self::with_clock(user, feed, recorder, Arc::new(SystemClock), config)
    }

    /// Watcher checking session deadlines against `clock`. Use the same clock
    /// as the duel manager so both agree on when a duel expires.
    pub fn with_clock(
        user: Username,
        feed: Arc<dyn SubmissionFeed>,
        recorder: Arc<dyn DuelRecorder>,
        clock: Arc<dyn Clock>,
        config: WatcherConfig,
    ) -> Self {
        Self {
            ctx: Arc::new(PollContext {
                user,
                feed,
                recorder,
                clock,
                config,
                sessions: RwLock::new(HashMap::new()),
            }),
            scheduler: TaskScheduler::new(),
        }
    }

    pub fn user(&self) -> &Username {
        &self.ctx.user
    }

    /// Open a session and poll once right away.
    ///
    /// On a miss the remaining polls run in the background until the solve
    /// is recorded, the duel closes or runs out of time, or the session is
    /// cancelled.
    pub async fn start_watching(
        &self,
        duel_id: DuelId,
        problem_slug: impl Into<String>,
        start_timestamp: DateTime<Utc>,
    ) -> PollOutcome {
        let mut session = PollingSession::new(duel_id, problem_slug, start_timestamp);
        {
            let mut sessions = self.ctx.sessions.write();
            if sessions.contains_key(&duel_id) {
                return PollOutcome::AlreadyWatching;
            }
            sessions.insert(duel_id, session.clone());
        }

        info!(duel_id = %duel_id, problem = %session.problem_slug, "Watching duel");

        match self.ctx.poll(&session).await {
            Step::Detected(duel) => {
                self.ctx.finish(&duel_id);
                PollOutcome::Recorded(duel)
            }
            Step::Closed => {
                self.ctx.finish(&duel_id);
                PollOutcome::Closed
            }
            Step::Miss => match self.ctx.miss(&mut session) {
                Some(delay) => {
                    self.scheduler
                        .start(duel_id, delay, poll_loop(self.ctx.clone(), session));
                    PollOutcome::Retry(delay)
                }
                None => PollOutcome::Closed,
            },
        }
    }

    /// Start watching an ACTIVE duel using its own problem and start time
    pub async fn watch_duel(&self, duel: &Duel) -> Option<PollOutcome> {
        if duel.status != DuelStatus::Active || !duel.is_participant(&self.ctx.user) {
            return None;
        }
        if duel.side_of(&self.ctx.user).and_then(|side| duel.time_for(side)).is_some() {
            return None;
        }
        let start = duel.start_time?;
        Some(
            self.start_watching(duel.duel_id, duel.problem_slug.clone(), start)
                .await,
        )
    }

    /// Stop watching one duel
    pub fn cancel(&self, duel_id: &DuelId) -> bool {
        let had_task = self.scheduler.cancel(duel_id);
        let had_session = self.ctx.sessions.write().remove(duel_id).is_some();
        if had_task || had_session {
            debug!(duel_id = %duel_id, "Stopped watching duel");
        }
        had_task || had_session
    }

    /// Stop every session
    pub fn cancel_all(&self) -> usize {
        self.scheduler.cancel_all();
        let mut sessions = self.ctx.sessions.write();
        let count = sessions.len();
        sessions.clear();
        count
    }

    /// Cancel sessions whose duel is no longer ACTIVE in `current` (or is
    /// missing from it); returns the cancelled duel ids.
    pub fn reconcile(&self, current: &[Duel]) -> Vec<DuelId> {
        let active: HashSet<DuelId> = current
            .iter()
            .filter(|duel| duel.status == DuelStatus::Active)
            .map(|duel| duel.duel_id)
            .collect();

        let stale: Vec<DuelId> = self
            .watched()
            .into_iter()
            .filter(|id| !active.contains(id))
            .collect();

        for id in &stale {
            self.cancel(id);
        }
        stale
    }

    pub fn is_watching(&self, duel_id: &DuelId) -> bool {
        self.ctx.sessions.read().contains_key(duel_id)
    }

    pub fn session(&self, duel_id: &DuelId) -> Option<PollingSession> {
        self.ctx.sessions.read().get(duel_id).cloned()
    }

    pub fn watched(&self) -> Vec<DuelId> {
        self.ctx.sessions.read().keys().copied().collect()
    }
}

impl Drop for SubmissionWatcher {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
