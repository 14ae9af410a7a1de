//! Initial lottery: one round per preference rank.
//!
//! Round `rank`:
//! 1. stop if every show is full;
//! 2. snapshot fairness buckets over all applicants (frozen for the round);
//! 3. for each show in input order, draw among applicants whose
//!    `preferences[rank]` names it, fewest wins first.
//!
//! Priority is therefore (win count ↑, rank ↑); the RNG only breaks ties
//! among equally placed, conflict-free applicants for the same show.

use lt_core::{DrawRng, GrantError, Roster};
use tracing::{debug, info};

use crate::engine::{run_pass, Cadence, Grant, PassPlan, Phase};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialOutcome {
    /// Rounds actually executed (≤ max_orders).
    pub rounds_run: u32,
    /// True when the loop ended because every show filled up.
    pub stopped_full: bool,
    pub grants: Vec<Grant>,
}

pub fn run_initial(roster: &mut Roster, max_orders: u32, rng: &mut DrawRng) -> Result<InitialOutcome, GrantError> {
    let pool: Vec<usize> = (0..roster.applicants().len()).collect();
    let mut out = InitialOutcome::default();

    for rank in 0..max_orders {
        if roster.all_full() {
            out.stopped_full = true;
            break;
        }
        let r = rank as usize;
        let plan = PassPlan { phase: Phase::Initial, rank: Some(rank), cadence: Cadence::Frozen };
        let grants = run_pass(
            roster,
            &pool,
            plan,
            |who, show| who.preference_at(r) == Some(show.id()),
            rng,
        )?;
        debug!(rank, granted = grants.len(), "initial round done");
        out.grants.extend(grants);
        out.rounds_run += 1;
    }

    info!(
        rounds = out.rounds_run,
        stopped_full = out.stopped_full,
        granted = out.grants.len(),
        "initial lottery finished"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lt_core::{Applicant, Show, ShowId};

    fn sid(s: &str) -> ShowId { s.parse().unwrap() }

    fn app(id: &str, prefs: &[&str]) -> Applicant {
        let p = prefs.iter().map(|s| if s.is_empty() { None } else { Some(sid(s)) }).collect();
        Applicant::new(id.parse().unwrap(), p)
    }

    fn wins(r: &Roster, ix: usize) -> Vec<&str> {
        r.applicant(ix).wins().iter().map(|s| s.as_str()).collect()
    }

    #[test]
    fn scenario_two_applicants_two_single_seat_shows() {
        let shows = vec![
            Show::new(sid("R1"), "morning", "playX", 1),
            Show::new(sid("R2"), "afternoon", "playY", 1),
        ];
        let apps = vec![app("P1", &["R1", "R2"]), app("P2", &["R1", "R2"])];
        let mut r = Roster::new(apps, shows).unwrap();
        let mut rng = DrawRng::from_seed_u64(1);
        let out = run_initial(&mut r, 2, &mut rng).unwrap();

        // Seed 1: the R1 draw swaps [P1, P2] → P2 wins; P1 then takes R2 at rank 1.
        assert_eq!(wins(&r, 0), vec!["R2"]);
        assert_eq!(wins(&r, 1), vec!["R1"]);
        assert_eq!(out.rounds_run, 2);
        assert!(!out.stopped_full);
        assert_eq!(out.grants.len(), 2);
        assert_eq!(out.grants[1].rank, Some(1));
    }

    #[test]
    fn shared_slot_blocks_second_win() {
        let shows = vec![
            Show::new(sid("R1"), "morning", "playX", 2),
            Show::new(sid("R3"), "morning", "playZ", 2),
        ];
        let mut r = Roster::new(vec![app("P3", &["R1", "R3"])], shows).unwrap();
        let mut rng = DrawRng::from_seed_u64(1);
        run_initial(&mut r, 2, &mut rng).unwrap();
        assert_eq!(wins(&r, 0), vec!["R1"]);
        assert_eq!(r.show(1).holder_count(), 0);
    }

    #[test]
    fn stops_early_when_everything_is_full() {
        let shows = vec![Show::new(sid("R1"), "a", "x", 1)];
        let apps = vec![app("P1", &["R1", "", ""])];
        let mut r = Roster::new(apps, shows).unwrap();
        let mut rng = DrawRng::from_seed_u64(3);
        let out = run_initial(&mut r, 3, &mut rng).unwrap();
        assert_eq!(out.rounds_run, 1);
        assert!(out.stopped_full);
    }

    #[test]
    fn later_round_draws_among_equal_buckets() {
        // Round 0 gives each applicant their own first choice. In round 1 both
        // rank R3 (one seat) and both hold one win, so they share bucket 1 and
        // the seat is drawn.
        let shows = vec![
            Show::new(sid("R1"), "s1", "p1", 1),
            Show::new(sid("R2"), "s2", "p2", 1),
            Show::new(sid("R3"), "s3", "p3", 1),
        ];
        let apps = vec![app("P1", &["R1", "R3"]), app("P2", &["R2", "R3"])];
        let mut r = Roster::new(apps, shows).unwrap();
        let mut rng = DrawRng::from_seed_u64(1);
        let out = run_initial(&mut r, 2, &mut rng).unwrap();
        assert_eq!(out.grants.len(), 3);
        assert_eq!(out.grants[2].bucket, 1);
        assert_eq!(r.show(2).holder_count(), 1);
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn fewer_wins_go_first_within_a_round() {
        // P1 wins R1 at rank 0. At rank 1, P1 (1 win) and P2 (0 wins) both want
        // R2 with one seat: P2's bucket is served first, no draw needed.
        let shows = vec![
            Show::new(sid("R1"), "s1", "p1", 1),
            Show::new(sid("R2"), "s2", "p2", 1),
        ];
        let apps = vec![app("P1", &["R1", "R2"]), app("P2", &["", "R2"])];
        let mut r = Roster::new(apps, shows).unwrap();
        let mut rng = DrawRng::from_seed_u64(99);
        run_initial(&mut r, 2, &mut rng).unwrap();
        assert_eq!(wins(&r, 0), vec!["R1"]);
        assert_eq!(wins(&r, 1), vec!["R2"]);
        assert_eq!(rng.draws(), 0);
    }
}
