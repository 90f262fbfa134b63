//! Persistence collaborator for duels
//!
//! The real store lives behind the group's backend; this crate only needs
//! three primitive operations. [`InMemoryDuelStore`] backs tests and the dev
//! harness.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use yeetcode_types::{Duel, DuelId, Username};

use crate::{StoreError, StoreResult};

/// Durable storage for duel records
#[async_trait]
pub trait DuelStore: Send + Sync {
    /// Fetch one duel
    async fn get_duel(&self, id: &DuelId) -> StoreResult<Option<Duel>>;

    /// Every duel in which `user` is challenger or challengee, any status
    async fn list_user_duels(&self, user: &Username) -> StoreResult<Vec<Duel>>;

    /// Insert or overwrite a duel record
    async fn save_duel(&self, duel: &Duel) -> StoreResult<()>;
}

/// In-memory duel store for testing
pub struct InMemoryDuelStore {
    duels: RwLock<HashMap<DuelId, Duel>>,
    offline: AtomicBool,
}

impl InMemoryDuelStore {
    pub fn new() -> Self {
        Self {
            duels: RwLock::new(HashMap::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulate a backend outage: every call fails until switched back
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.duels.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.duels.read().is_empty()
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store offline".to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryDuelStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DuelStore for InMemoryDuelStore {
    async fn get_duel(&self, id: &DuelId) -> StoreResult<Option<Duel>> {
        self.check_online()?;
        Ok(self.duels.read().get(id).cloned())
    }

    async fn list_user_duels(&self, user: &Username) -> StoreResult<Vec<Duel>> {
        self.check_online()?;
        Ok(self
            .duels
            .read()
            .values()
            .filter(|duel| duel.is_participant(user))
            .cloned()
            .collect())
    }

    async fn save_duel(&self, duel: &Duel) -> StoreResult<()> {
        self.check_online()?;
        self.duels.write().insert(duel.duel_id, duel.clone());
        Ok(())
    }
}
