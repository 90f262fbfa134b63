//! Incoming challenge detection
//!
//! Compares successive `user_duels` listings and reports PENDING duels
//! addressed to the local user that were not seen before.

use std::collections::HashSet;

use yeetcode_types::{Duel, DuelId, DuelStatus, Username};

/// Tracks which incoming challenges have already been reported
#[derive(Debug)]
pub struct IncomingDuelDetector {
    user: Username,
    seen: HashSet<DuelId>,
}

impl IncomingDuelDetector {
    pub fn new(user: Username) -> Self {
        Self {
            user,
            seen: HashSet::new(),
        }
    }

    pub fn user(&self) -> &Username {
        &self.user
    }

    /// Feed the latest listing; returns challenges received since the last call.
    ///
    /// The first call reports every pending challenge in the listing. Duels
    /// that disappear from the listing are forgotten.
    pub fn observe(&mut self, duels: &[Duel]) -> Vec<Duel> {
        let incoming: Vec<&Duel> = duels
            .iter()
            .filter(|duel| duel.status == DuelStatus::Pending && duel.challengee == self.user)
            .collect();

        let fresh: Vec<Duel> = incoming
            .iter()
            .filter(|duel| !self.seen.contains(&duel.duel_id))
            .map(|duel| (*duel).clone())
            .collect();

        self.seen = incoming.iter().map(|duel| duel.duel_id).collect();
        fresh
    }

    pub fn reset(&mut self) {
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::new_duel;
    use chrono::Utc;
    use yeetcode_types::{Difficulty, Problem};

    fn user(name: &str) -> Username {
        Username::new(name).unwrap()
    }

    fn challenge(from: &str, to: &str) -> Duel {
        new_duel(
            user(from),
            user(to),
            Difficulty::Easy,
            Problem::new("two-sum", "Two Sum", Difficulty::Easy),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_reports_only_new_incoming() {
        let mut detector = IncomingDuelDetector::new(user("bob"));
        let first = challenge("alice", "bob");
        let outgoing = challenge("bob", "carol");

        let reported = detector.observe(&[first.clone(), outgoing.clone()]);
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].duel_id, first.duel_id);

        assert!(detector.observe(&[first.clone(), outgoing]).is_empty());

        let second = challenge("carol", "bob");
        let reported = detector.observe(&[first, second.clone()]);
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].duel_id, second.duel_id);
    }

    #[test]
    fn test_accepted_challenge_not_reported() {
        let mut detector = IncomingDuelDetector::new(user("bob"));
        let mut duel = challenge("alice", "bob");
        duel.status = DuelStatus::Active;
        assert!(detector.observe(&[duel]).is_empty());
    }
}
