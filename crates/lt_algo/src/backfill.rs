//! Backfill (vacancy) pass: re-offer leftover seats to an opt-in subset.
//!
//! Rank-agnostic: preferences are not consulted. Any opted-in applicant who
//! does not hold the show and has no conflict with it is eligible. Fairness
//! buckets are rebuilt from live state before every show, since a single
//! applicant can pick up several seats during this one pass.

use std::collections::BTreeSet;

use lt_core::{ApplicantId, DrawRng, GrantError, Roster};
use tracing::{debug, info};

use crate::engine::{run_pass, Cadence, Grant, PassPlan, Phase};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillOutcome {
    /// Opted-in ids that matched an applicant in the roster.
    pub candidates: usize,
    pub grants: Vec<Grant>,
}

/// Run the backfill pass for `opt_in`. Ids naming no applicant are ignored.
/// An empty candidate set is a no-op and draws nothing.
pub fn run_backfill(
    roster: &mut Roster,
    opt_in: &BTreeSet<ApplicantId>,
    rng: &mut DrawRng,
) -> Result<BackfillOutcome, GrantError> {
    let pool: Vec<usize> = roster
        .applicants()
        .iter()
        .enumerate()
        .filter(|(_, a)| opt_in.contains(a.id()))
        .map(|(ix, _)| ix)
        .collect();

    if pool.is_empty() {
        debug!("backfill skipped: no opted-in applicants");
        return Ok(BackfillOutcome::default());
    }

    let plan = PassPlan { phase: Phase::Backfill, rank: None, cadence: Cadence::Live };
    let grants = run_pass(roster, &pool, plan, |_, _| true, rng)?;

    info!(candidates = pool.len(), granted = grants.len(), "backfill finished");
    Ok(BackfillOutcome { candidates: pool.len(), grants })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lt_core::{Applicant, Show, ShowId};

    fn sid(s: &str) -> ShowId { s.parse().unwrap() }
    fn aid(s: &str) -> ApplicantId { s.parse().unwrap() }

    fn roster() -> Roster {
        let shows = vec![
            Show::new(sid("S0"), "t0", "p0", 1),
            Show::new(sid("S1"), "t1", "p1", 1),
            Show::new(sid("S2"), "t2", "p2", 1),
        ];
        let apps = vec![
            Applicant::new(aid("P1"), vec![None]),
            Applicant::new(aid("P2"), vec![None]),
            Applicant::new(aid("P3"), vec![None]),
        ];
        let mut r = Roster::new(apps, shows).unwrap();
        r.grant(1, 0).unwrap(); // P2 already holds S0
        r
    }

    fn set(ids: &[&str]) -> BTreeSet<ApplicantId> {
        ids.iter().map(|s| aid(s)).collect()
    }

    #[test]
    fn empty_opt_in_changes_nothing() {
        let mut r = roster();
        let before: Vec<usize> = r.shows().iter().map(Show::holder_count).collect();
        let mut rng = DrawRng::from_seed_u64(1);
        let out = run_backfill(&mut r, &BTreeSet::new(), &mut rng).unwrap();
        let after: Vec<usize> = r.shows().iter().map(Show::holder_count).collect();
        assert_eq!(before, after);
        assert!(out.grants.is_empty());
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut r = roster();
        let mut rng = DrawRng::from_seed_u64(1);
        let out = run_backfill(&mut r, &set(&["ghost"]), &mut rng).unwrap();
        assert_eq!(out.candidates, 0);
        assert!(out.grants.is_empty());
    }

    #[test]
    fn groups_are_refreshed_per_show() {
        // S1: P1 (0 wins) beats P2 (1 win) outright. Before S2 the groups are
        // rebuilt: both now hold one win, so S2 is drawn between them.
        let mut r = roster();
        let mut rng = DrawRng::from_seed_u64(1);
        let out = run_backfill(&mut r, &set(&["P1", "P2"]), &mut rng).unwrap();
        assert_eq!(out.candidates, 2);
        assert_eq!(out.grants.len(), 2);
        assert_eq!(rng.draws(), 1);
        // Seed 1 swaps [P1, P2] → P2 takes S2.
        let p1: Vec<&str> = r.applicant(0).wins().iter().map(|s| s.as_str()).collect();
        let p2: Vec<&str> = r.applicant(1).wins().iter().map(|s| s.as_str()).collect();
        assert_eq!(p1, vec!["S1"]);
        assert_eq!(p2, vec!["S0", "S2"]);
        assert!(out.grants.iter().all(|g| g.phase == Phase::Backfill && g.rank.is_none()));
    }

    #[test]
    fn only_opted_in_applicants_receive_seats() {
        let mut r = roster();
        let mut rng = DrawRng::from_seed_u64(8);
        let out = run_backfill(&mut r, &set(&["P1"]), &mut rng).unwrap();
        assert!(out.grants.iter().all(|g| g.applicant.as_str() == "P1"));
        assert!(r.applicant(2).wins().is_empty());
        // P1 takes both free shows (no shared keys).
        assert_eq!(r.applicant(0).win_count(), 2);
    }
}
