//! Pure duel state transitions
//!
//! Nothing here performs I/O or reads the clock. Each operation takes the
//! current time and a command, mutates the duel value in place and reports
//! what happened. The caller persists the duel whenever it changed, even
//! when the command itself failed: an expired challenge is swept to
//! REJECTED by the same call that refuses to accept it.
//!
//! ```text
//! PENDING --accept--> ACTIVE --both times--> COMPLETED
//! PENDING --reject | 3h--> REJECTED
//! ACTIVE  --2h from start--> EXPIRED
//! ```

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use yeetcode_types::{
    Difficulty, DifficultyChoice, Duel, DuelId, DuelStatus, Problem, Side, Username,
    DUEL_WIN_BONUS_XP,
};

use crate::{DuelError, DuelResult};

/// A request to move a duel forward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuelCommand {
    Accept,
    Reject,
    RecordSubmission { username: Username, elapsed_ms: u64 },
}

impl DuelCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::RecordSubmission { .. } => "record submission",
        }
    }
}

/// What a successful transition (or sweep) did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuelEvent {
    Accepted { start_time: DateTime<Utc> },
    Rejected,
    /// First of the two times arrived
    SubmissionRecorded { username: Username, elapsed_ms: u64 },
    /// Second time arrived and a winner was decided
    Completed { winner: Username, xp_awarded: u64 },
    /// Applied by the expiry sweep
    TimedOut { from: DuelStatus, to: DuelStatus },
}

/// Lifecycle states reachable from `status`
pub fn valid_transitions(status: DuelStatus) -> Vec<DuelStatus> {
    match status {
        DuelStatus::Pending => vec![DuelStatus::Active, DuelStatus::Rejected],
        DuelStatus::Active => vec![DuelStatus::Completed, DuelStatus::Expired],
        DuelStatus::Completed | DuelStatus::Rejected | DuelStatus::Expired => vec![],
    }
}

/// Turn a requested difficulty into a concrete one, uniformly for `Random`
pub fn resolve_difficulty<R: Rng + ?Sized>(choice: DifficultyChoice, rng: &mut R) -> Difficulty {
    match choice {
        DifficultyChoice::Fixed(difficulty) => difficulty,
        DifficultyChoice::Random => Difficulty::ALL[rng.gen_range(0..Difficulty::ALL.len())],
    }
}

/// XP awarded to the winner of a duel at `difficulty`
pub fn duel_reward(difficulty: Difficulty) -> u64 {
    difficulty.base_xp() + DUEL_WIN_BONUS_XP
}

/// Build a fresh PENDING duel
pub fn new_duel(
    challenger: Username,
    challengee: Username,
    difficulty: Difficulty,
    problem: Problem,
    now: DateTime<Utc>,
) -> DuelResult<Duel> {
    if challenger == challengee {
        return Err(DuelError::InvalidParticipant(format!(
            "{} cannot challenge themselves",
            challenger
        )));
    }

    Ok(Duel {
        duel_id: DuelId::new(),
        challenger,
        challengee,
        difficulty,
        status: DuelStatus::Pending,
        created_at: now,
        start_time: None,
        problem_slug: problem.slug,
        problem_title: problem.title,
        challenger_time: None,
        challengee_time: None,
        winner: None,
        xp_awarded: None,
        timed_out: false,
    })
}

/// Apply the expiry rules at `now`.
///
/// Pending duels unanswered for 3 hours become REJECTED; active duels
/// running for 2 hours become EXPIRED with no winner and no XP.
pub fn sweep(duel: &mut Duel, now: DateTime<Utc>) -> Option<DuelEvent> {
    if !duel.is_due_for_expiry(now) {
        return None;
    }

    let from = duel.status;
    let to = match from {
        DuelStatus::Pending => DuelStatus::Rejected,
        DuelStatus::Active => DuelStatus::Expired,
        _ => return None,
    };

    duel.status = to;
    duel.winner = None;
    duel.xp_awarded = None;
    duel.timed_out = true;
    Some(DuelEvent::TimedOut { from, to })
}

/// Apply `command` to `duel` at `now`.
///
/// Runs the expiry sweep first, so a command against a duel that has just
/// timed out fails while the duel itself moves to its terminal state.
pub fn apply(duel: &mut Duel, command: &DuelCommand, now: DateTime<Utc>) -> DuelResult<DuelEvent> {
    sweep(duel, now);

    match command {
        DuelCommand::Accept => accept(duel, now),
        DuelCommand::Reject => reject(duel),
        DuelCommand::RecordSubmission { username, elapsed_ms } => {
            record_submission(duel, username, *elapsed_ms)
        }
    }
}

fn accept(duel: &mut Duel, now: DateTime<Utc>) -> DuelResult<DuelEvent> {
    match duel.status {
        DuelStatus::Pending => {
            duel.status = DuelStatus::Active;
            duel.start_time = Some(now);
            Ok(DuelEvent::Accepted { start_time: now })
        }
        // Unanswered challenges stay "expired" to the challengee, whichever
        // call happened to sweep them.
        DuelStatus::Rejected if duel.timed_out => Err(DuelError::DuelExpired(duel.duel_id)),
        status => Err(DuelError::invalid_state(
            duel.duel_id,
            format!("cannot accept a {} duel", status),
        )),
    }
}

fn reject(duel: &mut Duel) -> DuelResult<DuelEvent> {
    if duel.status != DuelStatus::Pending {
        return Err(DuelError::invalid_state(
            duel.duel_id,
            format!("cannot reject a {} duel", duel.status),
        ));
    }
    duel.status = DuelStatus::Rejected;
    Ok(DuelEvent::Rejected)
}

fn record_submission(duel: &mut Duel, username: &Username, elapsed_ms: u64) -> DuelResult<DuelEvent> {
    if duel.status != DuelStatus::Active {
        return Err(DuelError::invalid_state(
            duel.duel_id,
            format!("cannot record a submission on a {} duel", duel.status),
        ));
    }

    let side = duel.side_of(username).ok_or_else(|| {
        DuelError::InvalidParticipant(format!("{} is not part of duel {}", username, duel.duel_id))
    })?;

    if duel.time_for(side).is_some() {
        return Err(DuelError::invalid_state(
            duel.duel_id,
            format!("{} already has a recorded time", username),
        ));
    }

    match side {
        Side::Challenger => duel.challenger_time = Some(elapsed_ms),
        Side::Challengee => duel.challengee_time = Some(elapsed_ms),
    }

    match (duel.challenger_time, duel.challengee_time) {
        (Some(challenger_ms), Some(challengee_ms)) => {
            // Equal times go to whoever was recorded first, i.e. the other side.
            let challenger_wins = match challenger_ms.cmp(&challengee_ms) {
                std::cmp::Ordering::Less => true,
                std::cmp::Ordering::Greater => false,
                std::cmp::Ordering::Equal => side == Side::Challengee,
            };
            let winner = if challenger_wins {
                duel.challenger.clone()
            } else {
                duel.challengee.clone()
            };
            let xp_awarded = duel_reward(duel.difficulty);

            duel.status = DuelStatus::Completed;
            duel.winner = Some(winner.clone());
            duel.xp_awarded = Some(xp_awarded);
            Ok(DuelEvent::Completed { winner, xp_awarded })
        }
        _ => Ok(DuelEvent::SubmissionRecorded {
            username: username.clone(),
            elapsed_ms,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn user(name: &str) -> Username {
        Username::new(name).unwrap()
    }

    fn pending(difficulty: Difficulty, now: DateTime<Utc>) -> Duel {
        new_duel(
            user("alice"),
            user("bob"),
            difficulty,
            Problem::new("two-sum", "Two Sum", difficulty),
            now,
        )
        .unwrap()
    }

    fn record(name: &str, elapsed_ms: u64) -> DuelCommand {
        DuelCommand::RecordSubmission {
            username: user(name),
            elapsed_ms,
        }
    }

    #[test]
    fn test_self_challenge_rejected() {
        let result = new_duel(
            user("alice"),
            user("ALICE"),
            Difficulty::Easy,
            Problem::new("two-sum", "Two Sum", Difficulty::Easy),
            Utc::now(),
        );
        assert!(matches!(result, Err(DuelError::InvalidParticipant(_))));
    }

    #[test]
    fn test_random_difficulty_always_concrete() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let difficulty = resolve_difficulty(DifficultyChoice::Random, &mut rng);
            assert!(Difficulty::ALL.contains(&difficulty));
            seen.insert(difficulty);
        }
        assert_eq!(seen.len(), 3);
        assert_eq!(
            resolve_difficulty(DifficultyChoice::Fixed(Difficulty::Hard), &mut rng),
            Difficulty::Hard
        );
    }

    #[test]
    fn test_accept_sets_start_time() {
        let created = Utc::now();
        let mut duel = pending(Difficulty::Easy, created);
        let now = created + Duration::minutes(10);

        let event = apply(&mut duel, &DuelCommand::Accept, now).unwrap();

        assert_eq!(event, DuelEvent::Accepted { start_time: now });
        assert_eq!(duel.status, DuelStatus::Active);
        assert_eq!(duel.start_time, Some(now));
    }

    #[test]
    fn test_accept_after_three_hours_rejects() {
        let created = Utc::now();
        let mut duel = pending(Difficulty::Easy, created);

        let result = apply(&mut duel, &DuelCommand::Accept, created + Duration::hours(3));

        assert!(matches!(result, Err(DuelError::DuelExpired(_))));
        assert_eq!(duel.status, DuelStatus::Rejected);
        assert!(duel.start_time.is_none());
        assert!(duel.timed_out);
    }

    #[test]
    fn test_accept_after_earlier_sweep_still_expired() {
        let created = Utc::now();
        let mut duel = pending(Difficulty::Easy, created);
        assert!(sweep(&mut duel, created + Duration::hours(3)).is_some());

        let result = apply(&mut duel, &DuelCommand::Accept, created + Duration::hours(5));
        assert!(matches!(result, Err(DuelError::DuelExpired(_))));
    }

    #[test]
    fn test_accept_twice_is_invalid_state() {
        let now = Utc::now();
        let mut duel = pending(Difficulty::Easy, now);
        apply(&mut duel, &DuelCommand::Accept, now).unwrap();

        let result = apply(&mut duel, &DuelCommand::Accept, now);
        assert!(matches!(result, Err(DuelError::InvalidState { .. })));
        assert_eq!(duel.status, DuelStatus::Active);
    }

    #[test]
    fn test_reject_only_from_pending() {
        let now = Utc::now();
        let mut duel = pending(Difficulty::Medium, now);

        assert_eq!(apply(&mut duel, &DuelCommand::Reject, now).unwrap(), DuelEvent::Rejected);
        assert!(matches!(
            apply(&mut duel, &DuelCommand::Reject, now),
            Err(DuelError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_easy_duel_completes_with_faster_winner() {
        let now = Utc::now();
        let mut duel = pending(Difficulty::Easy, now);
        apply(&mut duel, &DuelCommand::Accept, now).unwrap();

        let first = apply(&mut duel, &record("alice", 120_000), now + Duration::minutes(2)).unwrap();
        assert!(matches!(first, DuelEvent::SubmissionRecorded { .. }));
        assert_eq!(duel.status, DuelStatus::Active);
        assert!(duel.winner.is_none());

        let second = apply(&mut duel, &record("bob", 90_000), now + Duration::minutes(3)).unwrap();
        assert_eq!(
            second,
            DuelEvent::Completed {
                winner: user("bob"),
                xp_awarded: 300
            }
        );
        assert_eq!(duel.status, DuelStatus::Completed);
        assert_eq!(duel.winner, Some(user("bob")));
        assert_eq!(duel.xp_awarded, Some(300));
    }

    #[test]
    fn test_tie_goes_to_first_recorded() {
        let now = Utc::now();
        let mut duel = pending(Difficulty::Hard, now);
        apply(&mut duel, &DuelCommand::Accept, now).unwrap();

        apply(&mut duel, &record("bob", 60_000), now).unwrap();
        apply(&mut duel, &record("alice", 60_000), now).unwrap();

        assert_eq!(duel.winner, Some(user("bob")));
        assert_eq!(duel.xp_awarded, Some(700));
    }

    #[test]
    fn test_second_submission_for_same_player_rejected() {
        let now = Utc::now();
        let mut duel = pending(Difficulty::Easy, now);
        apply(&mut duel, &DuelCommand::Accept, now).unwrap();
        apply(&mut duel, &record("alice", 50_000), now).unwrap();

        let result = apply(&mut duel, &record("alice", 10_000), now);

        assert!(matches!(result, Err(DuelError::InvalidState { .. })));
        assert_eq!(duel.challenger_time, Some(50_000));
    }

    #[test]
    fn test_submission_from_outsider_rejected() {
        let now = Utc::now();
        let mut duel = pending(Difficulty::Easy, now);
        apply(&mut duel, &DuelCommand::Accept, now).unwrap();

        let result = apply(&mut duel, &record("carol", 1_000), now);
        assert!(matches!(result, Err(DuelError::InvalidParticipant(_))));
    }

    #[test]
    fn test_submission_on_pending_duel_rejected() {
        let now = Utc::now();
        let mut duel = pending(Difficulty::Easy, now);
        let result = apply(&mut duel, &record("alice", 1_000), now);
        assert!(matches!(result, Err(DuelError::InvalidState { .. })));
    }

    #[test]
    fn test_active_duel_expires_after_two_hours() {
        let start = Utc::now();
        let mut duel = pending(Difficulty::Easy, start);
        apply(&mut duel, &DuelCommand::Accept, start).unwrap();
        apply(&mut duel, &record("alice", 30_000), start).unwrap();

        assert!(sweep(&mut duel, start + Duration::minutes(119)).is_none());

        let event = sweep(&mut duel, start + Duration::hours(2));
        assert_eq!(
            event,
            Some(DuelEvent::TimedOut {
                from: DuelStatus::Active,
                to: DuelStatus::Expired
            })
        );
        assert!(duel.winner.is_none());
        assert!(duel.xp_awarded.is_none());

        let late = apply(&mut duel, &record("bob", 10_000), start + Duration::hours(3));
        assert!(matches!(late, Err(DuelError::InvalidState { .. })));
    }

    #[test]
    fn test_terminal_states_have_no_transitions() {
        assert!(valid_transitions(DuelStatus::Completed).is_empty());
        assert!(valid_transitions(DuelStatus::Expired).is_empty());
        assert!(valid_transitions(DuelStatus::Pending).contains(&DuelStatus::Active));
    }
}
