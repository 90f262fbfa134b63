//! Developer harness
//!
//! Wires the duel manager, submission watcher and leaderboard monitor to
//! in-memory collaborators so the whole engine can be driven from one place:
//! seed a group, play a duel end to end, inspect state. [`DevHarness::tick`]
//! runs one pass of the background cycle against the manual clock.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::info;

use yeetcode_duels::{
    Clock, DuelManager, IncomingDuelDetector, InMemoryDuelStore, ManualClock, StaticCatalog,
};
use yeetcode_leaderboard::{
    InMemoryLeaderboardSource, LeaderboardMonitor, Notification, StandingRow,
};
use yeetcode_types::{
    format_elapsed, DifficultyChoice, Duel, DuelId, LeaderboardEntry, SolveStats, Submission,
    Username,
};
use yeetcode_watcher::{InMemorySubmissionFeed, PollOutcome, SubmissionWatcher};

use crate::config::CompanionConfig;

/// Opponent used by the scripted demo
pub const DEMO_RIVAL: &str = "leetrival";

/// How long the demo waits for the watcher to spot a solve
const DETECTION_TIMEOUT: StdDuration = StdDuration::from_secs(120);

/// In-memory collaborators the harness runs against
pub struct Collaborators {
    pub store: Arc<InMemoryDuelStore>,
    pub catalog: Arc<StaticCatalog>,
    pub feed: Arc<InMemorySubmissionFeed>,
    pub leaderboard: Arc<InMemoryLeaderboardSource>,
    pub clock: Arc<ManualClock>,
}

impl Collaborators {
    pub fn in_memory(start: DateTime<Utc>) -> Self {
        Self {
            store: Arc::new(InMemoryDuelStore::new()),
            catalog: Arc::new(StaticCatalog::default()),
            feed: Arc::new(InMemorySubmissionFeed::new()),
            leaderboard: Arc::new(InMemoryLeaderboardSource::new()),
            clock: Arc::new(ManualClock::new(start)),
        }
    }
}

/// Point-in-time view of the harness
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HarnessState {
    pub user: Username,
    pub group: String,
    pub open_duels: Vec<Duel>,
    pub watched_duels: Vec<DuelId>,
    pub notifications: Vec<Notification>,
    pub refresh_in_secs: u64,
}

/// What one background cycle did
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    /// Sessions stopped because their duel left ACTIVE
    pub cancelled: Vec<DuelId>,
    /// Active duels now polled in the background
    pub started: Vec<DuelId>,
    /// `None` when the leaderboard was not due for a refresh
    pub notifications: Option<Vec<Notification>>,
}

/// What the scripted demo did
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoReport {
    pub duel: Duel,
    /// Challenges the rival saw arrive
    pub received_by_rival: usize,
    pub user_time: Option<String>,
    pub rival_time: Option<String>,
    pub notifications: Vec<Notification>,
    pub standings: Vec<StandingRow>,
    pub recent_duels: usize,
}

/// Engine wired to in-memory collaborators
pub struct DevHarness {
    user: Username,
    collaborators: Collaborators,
    manager: Arc<DuelManager>,
    watcher: SubmissionWatcher,
    monitor: LeaderboardMonitor,
}

impl DevHarness {
    pub fn new(config: &CompanionConfig, collaborators: Collaborators) -> anyhow::Result<Self> {
        let user = config.username()?;

        let manager = Arc::new(DuelManager::new(
            collaborators.store.clone(),
            collaborators.catalog.clone(),
            collaborators.clock.clone(),
        ));
        let watcher = SubmissionWatcher::with_clock(
            user.clone(),
            collaborators.feed.clone(),
            manager.clone(),
            collaborators.clock.clone(),
            config.watcher_config(),
        );
        let monitor = LeaderboardMonitor::new(
            collaborators.leaderboard.clone(),
            config.user.group_code.clone(),
            config.cadence_config(),
        );

        Ok(Self {
            user,
            collaborators,
            manager,
            watcher,
            monitor,
        })
    }

    pub fn user(&self) -> &Username {
        &self.user
    }

    pub fn manager(&self) -> &DuelManager {
        &self.manager
    }

    pub fn watcher(&self) -> &SubmissionWatcher {
        &self.watcher
    }

    pub fn monitor(&self) -> &LeaderboardMonitor {
        &self.monitor
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.collaborators.clock.now()
    }

    /// Move the duel and leaderboard clock forward
    pub fn advance(&self, by: Duration) {
        self.collaborators.clock.advance(by);
    }

    /// Fill the group with the local user, the demo rival and two others
    pub fn seed_group(&self) -> anyhow::Result<()> {
        let entries = vec![
            LeaderboardEntry::new(Username::new("gracehopper")?, "Grace", SolveStats::new(30, 10, 2, 0))
                .with_university("Yale"),
            LeaderboardEntry::new(Username::new(DEMO_RIVAL)?, "Rival", SolveStats::new(12, 6, 1, 0)),
            LeaderboardEntry::new(self.user.clone(), "You", SolveStats::new(10, 5, 1, 300)),
            LeaderboardEntry::new(Username::new("linus")?, "Linus", SolveStats::new(4, 0, 0, 0)),
        ];
        self.collaborators
            .leaderboard
            .set_group(self.monitor.group(), entries);
        Ok(())
    }

    /// Credit duel XP to the winner's leaderboard row
    pub fn award_bonus(&self, winner: &Username, xp: u64) {
        self.collaborators
            .leaderboard
            .update_group(self.monitor.group(), |entries| {
                if let Some(entry) = entries.iter_mut().find(|e| &e.username == winner) {
                    entry.stats.bonus_xp = entry.stats.bonus_xp.saturating_add(xp);
                }
            });
    }

    /// Wait until the watcher is done with `duel_id`
    pub async fn wait_for_detection(&self, duel_id: &DuelId) -> anyhow::Result<()> {
        tokio::time::timeout(DETECTION_TIMEOUT, async {
            while self.watcher.is_watching(duel_id) {
                tokio::time::sleep(StdDuration::from_millis(100)).await;
            }
        })
        .await
        .context("watcher did not detect the solve in time")
    }

    /// One pass of the background cycle.
    ///
    /// Sweeps the user's duels, stops sessions for duels that are no longer
    /// active, starts watching newly active ones, then refreshes the
    /// leaderboard if the cadence says it is due.
    pub async fn tick(&self) -> anyhow::Result<TickReport> {
        let open = self.manager.user_duels(&self.user).await?;
        let cancelled = self.watcher.reconcile(&open);

        let mut started = Vec::new();
        for duel in &open {
            if self.watcher.is_watching(&duel.duel_id) {
                continue;
            }
            if let Some(PollOutcome::Retry(_)) = self.watcher.watch_duel(duel).await {
                started.push(duel.duel_id);
            }
        }

        let notifications = self.monitor.refresh_if_due(self.now()).await?;
        Ok(TickReport {
            cancelled,
            started,
            notifications,
        })
    }

    /// Report app focus to the leaderboard cadence. Returns the notifications
    /// when regaining focus triggered a refresh.
    pub async fn set_focus(&self, focused: bool) -> anyhow::Result<Option<Vec<Notification>>> {
        Ok(self.monitor.set_focus(focused, self.now()).await?)
    }

    pub async fn state(&self) -> anyhow::Result<HarnessState> {
        let now = self.now();
        Ok(HarnessState {
            user: self.user.clone(),
            group: self.monitor.group().to_string(),
            open_duels: self.manager.user_duels(&self.user).await?,
            watched_duels: self.watcher.watched(),
            notifications: self.monitor.notifications(now),
            refresh_in_secs: self.monitor.seconds_until_refresh(now),
        })
    }

    /// Play one duel against [`DEMO_RIVAL`] from challenge to leaderboard update
    pub async fn run_demo(&self) -> anyhow::Result<DemoReport> {
        let rival = Username::new(DEMO_RIVAL)?;

        self.seed_group()?;
        self.tick().await?;

        let duel = self
            .manager
            .create_duel(&self.user, &rival, DifficultyChoice::Random)
            .await?;
        info!(problem = %duel.problem_title, difficulty = %duel.difficulty, "Challenge sent");

        let mut rival_inbox = IncomingDuelDetector::new(rival.clone());
        let received = rival_inbox.observe(&self.manager.user_duels(&rival).await?);

        let duel = self.manager.accept_duel(&duel.duel_id).await?;
        let start = duel
            .start_time
            .context("accepted duel has no start time")?;

        let first = self.watcher.watch_duel(&duel).await;
        if !matches!(first, Some(PollOutcome::Retry(_))) {
            anyhow::bail!("expected the first poll to miss, got {:?}", first);
        }

        // Local user solves in 3:25, rival in 5:00.
        self.advance(Duration::minutes(6));
        self.collaborators.feed.push(
            &self.user,
            Submission::accepted(duel.problem_slug.clone(), start + Duration::seconds(205)),
        );
        self.wait_for_detection(&duel.duel_id).await?;

        let duel = self
            .manager
            .record_submission(&duel.duel_id, &rival, 300_000)
            .await?;

        if let (Some(winner), Some(xp)) = (&duel.winner, duel.xp_awarded) {
            self.award_bonus(winner, xp);
        }
        self.collaborators
            .leaderboard
            .update_group(self.monitor.group(), |entries| {
                if let Ok(username) = Username::new("newbie") {
                    entries.push(LeaderboardEntry::new(username, "Newbie", SolveStats::new(1, 0, 0, 0)));
                }
            });

        self.advance(Duration::seconds(60));
        let notifications = self
            .tick()
            .await?
            .notifications
            .context("leaderboard refresh was not due")?;

        Ok(DemoReport {
            user_time: duel.challenger_time.map(format_elapsed),
            rival_time: duel.challengee_time.map(format_elapsed),
            received_by_rival: received.len(),
            notifications,
            standings: self.monitor.standings(),
            recent_duels: self.manager.recent_duels(&self.user).await?.len(),
            duel,
        })
    }

    /// Stop all background polling
    pub fn shutdown(&self) -> usize {
        self.watcher.cancel_all()
    }
}
