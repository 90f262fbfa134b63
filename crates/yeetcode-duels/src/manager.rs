//! Duel Lifecycle Manager
//!
//! Async shell around [`crate::lifecycle`]: load the duel, apply the pure
//! transition, persist if anything changed. Every read runs the expiry sweep
//! first, so callers never observe a duel past its deadline in an open state.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use yeetcode_types::{DifficultyChoice, Duel, DuelId, DuelStatus, Username};

use crate::clock::Clock;
use crate::lifecycle::{self, DuelCommand, DuelEvent};
use crate::{DuelError, DuelResult, DuelStore, ProblemCatalog};

/// How many completed duels `recent_duels` returns
pub const RECENT_DUELS_LIMIT: usize = 10;

/// Owns duel state transitions and expiry
pub struct DuelManager {
    store: Arc<dyn DuelStore>,
    catalog: Arc<dyn ProblemCatalog>,
    clock: Arc<dyn Clock>,
    /// Serializes load-apply-save cycles
    write_lock: Mutex<()>,
}

impl DuelManager {
    pub fn new(
        store: Arc<dyn DuelStore>,
        catalog: Arc<dyn ProblemCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            catalog,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Send a challenge. `Random` is resolved before a problem is chosen.
    pub async fn create_duel(
        &self,
        challenger: &Username,
        challengee: &Username,
        difficulty: DifficultyChoice,
    ) -> DuelResult<Duel> {
        if challenger == challengee {
            return Err(DuelError::InvalidParticipant(format!(
                "{} cannot challenge themselves",
                challenger
            )));
        }

        let difficulty = lifecycle::resolve_difficulty(difficulty, &mut rand::thread_rng());
        let problem = self.catalog.random_problem(difficulty).await?;

        let duel = lifecycle::new_duel(
            challenger.clone(),
            challengee.clone(),
            difficulty,
            problem,
            self.clock.now(),
        )?;

        let _guard = self.write_lock.lock().await;
        self.store.save_duel(&duel).await?;

        info!(
            duel_id = %duel.duel_id,
            challenger = %duel.challenger,
            challengee = %duel.challengee,
            difficulty = %duel.difficulty,
            problem = %duel.problem_slug,
            "Duel created"
        );
        Ok(duel)
    }

    /// Accept a pending challenge and start the clock
    pub async fn accept_duel(&self, id: &DuelId) -> DuelResult<Duel> {
        self.execute(id, DuelCommand::Accept).await
    }

    /// Decline a pending challenge
    pub async fn reject_duel(&self, id: &DuelId) -> DuelResult<Duel> {
        self.execute(id, DuelCommand::Reject).await
    }

    /// Record one participant's solve time; completes the duel on the second
    pub async fn record_submission(
        &self,
        id: &DuelId,
        username: &Username,
        elapsed_ms: u64,
    ) -> DuelResult<Duel> {
        self.execute(
            id,
            DuelCommand::RecordSubmission {
                username: username.clone(),
                elapsed_ms,
            },
        )
        .await
    }

    /// Fetch one duel, expiry applied
    pub async fn get_duel(&self, id: &DuelId) -> DuelResult<Duel> {
        let _guard = self.write_lock.lock().await;
        let mut duel = self.load(id).await?;
        self.sweep_one(&mut duel).await?;
        Ok(duel)
    }

    /// Pending and active duels for `user`, newest first
    pub async fn user_duels(&self, user: &Username) -> DuelResult<Vec<Duel>> {
        let mut duels: Vec<Duel> = self
            .swept_user_duels(user)
            .await?
            .into_iter()
            .filter(|duel| duel.status.is_open())
            .collect();
        duels.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(duels)
    }

    /// Completed duels for `user`, most recently started first
    pub async fn recent_duels(&self, user: &Username) -> DuelResult<Vec<Duel>> {
        let mut duels: Vec<Duel> = self
            .swept_user_duels(user)
            .await?
            .into_iter()
            .filter(|duel| duel.status == DuelStatus::Completed)
            .collect();
        duels.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        duels.truncate(RECENT_DUELS_LIMIT);
        Ok(duels)
    }

    /// Run the expiry sweep over `user`'s duels; returns the ones that timed out
    pub async fn sweep_expired(&self, user: &Username) -> DuelResult<Vec<Duel>> {
        let _guard = self.write_lock.lock().await;
        let mut swept = Vec::new();
        for mut duel in self.store.list_user_duels(user).await? {
            if self.sweep_one(&mut duel).await? {
                swept.push(duel);
            }
        }
        Ok(swept)
    }

    async fn swept_user_duels(&self, user: &Username) -> DuelResult<Vec<Duel>> {
        let _guard = self.write_lock.lock().await;
        let mut duels = self.store.list_user_duels(user).await?;
        for duel in duels.iter_mut() {
            self.sweep_one(duel).await?;
        }
        Ok(duels)
    }

    async fn execute(&self, id: &DuelId, command: DuelCommand) -> DuelResult<Duel> {
        let _guard = self.write_lock.lock().await;
        let mut duel = self.load(id).await?;
        let before = duel.clone();

        let result = lifecycle::apply(&mut duel, &command, self.clock.now());

        if duel != before {
            self.store.save_duel(&duel).await?;
        }

        match result {
            Ok(event) => {
                log_event(&duel, &event);
                Ok(duel)
            }
            Err(err) => {
                warn!(duel_id = %id, command = command.name(), error = %err, "Duel command refused");
                Err(err)
            }
        }
    }

    async fn load(&self, id: &DuelId) -> DuelResult<Duel> {
        self.store
            .get_duel(id)
            .await?
            .ok_or(DuelError::NotFound(*id))
    }

    /// Apply expiry to one loaded duel and persist it if it moved
    async fn sweep_one(&self, duel: &mut Duel) -> DuelResult<bool> {
        match lifecycle::sweep(duel, self.clock.now()) {
            Some(event) => {
                self.store.save_duel(duel).await?;
                log_event(duel, &event);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn log_event(duel: &Duel, event: &DuelEvent) {
    match event {
        DuelEvent::Accepted { start_time } => {
            info!(duel_id = %duel.duel_id, %start_time, "Duel accepted")
        }
        DuelEvent::Rejected => info!(duel_id = %duel.duel_id, "Duel rejected"),
        DuelEvent::SubmissionRecorded { username, elapsed_ms } => {
            info!(duel_id = %duel.duel_id, %username, elapsed_ms, "Duel submission recorded")
        }
        DuelEvent::Completed { winner, xp_awarded } => {
            info!(duel_id = %duel.duel_id, %winner, xp_awarded, "Duel completed")
        }
        DuelEvent::TimedOut { from, to } => {
            debug!(duel_id = %duel.duel_id, %from, %to, "Duel timed out")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::{InMemoryDuelStore, StaticCatalog};
    use chrono::{Duration, Utc};
    use yeetcode_types::Difficulty;

    struct Fixture {
        manager: DuelManager,
        store: Arc<InMemoryDuelStore>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryDuelStore::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let manager = DuelManager::new(
            store.clone(),
            Arc::new(StaticCatalog::default()),
            clock.clone(),
        );
        Fixture {
            manager,
            store,
            clock,
        }
    }

    fn user(name: &str) -> Username {
        Username::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_create_random_duel_persists_concrete_difficulty() {
        let fx = fixture();

        for _ in 0..20 {
            let duel = fx
                .manager
                .create_duel(&user("alice"), &user("bob"), DifficultyChoice::Random)
                .await
                .unwrap();

            assert_eq!(duel.status, DuelStatus::Pending);
            assert!(Difficulty::ALL.contains(&duel.difficulty));

            let stored = fx.manager.get_duel(&duel.duel_id).await.unwrap();
            assert_eq!(stored.difficulty, duel.difficulty);
        }
        assert_eq!(fx.store.len(), 20);
    }

    #[tokio::test]
    async fn test_create_self_duel_fails() {
        let fx = fixture();
        let result = fx
            .manager
            .create_duel(&user("alice"), &user("Alice"), Difficulty::Easy.into())
            .await;
        assert!(matches!(result, Err(DuelError::InvalidParticipant(_))));
        assert!(fx.store.is_empty());
    }

    #[tokio::test]
    async fn test_stale_accept_persists_rejection() {
        let fx = fixture();
        let duel = fx
            .manager
            .create_duel(&user("alice"), &user("bob"), Difficulty::Medium.into())
            .await
            .unwrap();

        fx.clock.advance(Duration::hours(3) + Duration::seconds(1));

        let result = fx.manager.accept_duel(&duel.duel_id).await;
        assert!(matches!(result, Err(DuelError::DuelExpired(_))));

        let stored = fx.manager.get_duel(&duel.duel_id).await.unwrap();
        assert_eq!(stored.status, DuelStatus::Rejected);
        assert!(stored.timed_out);
    }

    #[tokio::test]
    async fn test_accept_after_listing_expired_challenge() {
        let fx = fixture();
        let duel = fx
            .manager
            .create_duel(&user("alice"), &user("bob"), Difficulty::Easy.into())
            .await
            .unwrap();

        fx.clock.advance(Duration::hours(4));
        assert!(fx.manager.user_duels(&user("bob")).await.unwrap().is_empty());

        let result = fx.manager.accept_duel(&duel.duel_id).await;
        assert!(matches!(result, Err(DuelError::DuelExpired(id)) if id == duel.duel_id));
    }

    #[tokio::test]
    async fn test_accept_declined_duel_is_invalid_state() {
        let fx = fixture();
        let duel = fx
            .manager
            .create_duel(&user("alice"), &user("bob"), Difficulty::Easy.into())
            .await
            .unwrap();
        fx.manager.reject_duel(&duel.duel_id).await.unwrap();

        fx.clock.advance(Duration::hours(4));
        let result = fx.manager.accept_duel(&duel.duel_id).await;
        assert!(matches!(result, Err(DuelError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_full_duel_flow() {
        let fx = fixture();
        let duel = fx
            .manager
            .create_duel(&user("alice"), &user("bob"), Difficulty::Easy.into())
            .await
            .unwrap();

        let active = fx.manager.accept_duel(&duel.duel_id).await.unwrap();
        assert_eq!(active.status, DuelStatus::Active);

        fx.manager
            .record_submission(&duel.duel_id, &user("alice"), 120_000)
            .await
            .unwrap();
        let done = fx
            .manager
            .record_submission(&duel.duel_id, &user("bob"), 90_000)
            .await
            .unwrap();

        assert_eq!(done.status, DuelStatus::Completed);
        assert_eq!(done.winner, Some(user("bob")));
        assert_eq!(done.xp_awarded, Some(300));

        let recent = fx.manager.recent_duels(&user("alice")).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert!(fx.manager.user_duels(&user("alice")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_duel_not_found() {
        let fx = fixture();
        let result = fx.manager.accept_duel(&DuelId::new()).await;
        assert!(matches!(result, Err(DuelError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_sweep_expired_reports_timeouts() {
        let fx = fixture();
        let pending = fx
            .manager
            .create_duel(&user("alice"), &user("bob"), Difficulty::Easy.into())
            .await
            .unwrap();
        let active = fx
            .manager
            .create_duel(&user("carol"), &user("alice"), Difficulty::Hard.into())
            .await
            .unwrap();
        fx.manager.accept_duel(&active.duel_id).await.unwrap();

        fx.clock.advance(Duration::hours(2));
        let swept = fx.manager.sweep_expired(&user("alice")).await.unwrap();
        assert_eq!(swept.len(), 1);
        assert_eq!(swept[0].duel_id, active.duel_id);
        assert_eq!(swept[0].status, DuelStatus::Expired);

        let open = fx.manager.user_duels(&user("alice")).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].duel_id, pending.duel_id);

        fx.clock.advance(Duration::hours(1));
        assert!(fx.manager.user_duels(&user("alice")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_outage_surfaces_as_transient_error() {
        let fx = fixture();
        fx.store.set_offline(true);

        let err = fx
            .manager
            .create_duel(&user("alice"), &user("bob"), Difficulty::Easy.into())
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}
