//! INITIAL + BACKFILL over one shared draw RNG.

use std::collections::BTreeSet;

use tracing::info;

use lt_algo::{run_backfill, run_initial, BackfillOutcome, Grant, InitialOutcome};
use lt_core::{ApplicantId, DrawRng, GrantError, Params, Roster};

#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub roster: Roster,
    pub initial: InitialOutcome,
    /// `None` when vacancy is disabled; the backfill pass never ran.
    pub backfill: Option<BackfillOutcome>,
    /// Draws consumed across both passes.
    pub draws: u64,
}

impl AllocationOutcome {
    pub fn grants(&self) -> impl Iterator<Item = &Grant> {
        self.initial.grants.iter().chain(self.backfill.iter().flat_map(|b| b.grants.iter()))
    }
}

pub fn allocate(
    mut roster: Roster,
    params: &Params,
    opt_in: &BTreeSet<ApplicantId>,
    seed: u64,
) -> Result<AllocationOutcome, GrantError> {
    let mut rng = DrawRng::from_seed_u64(seed);

    let initial = run_initial(&mut roster, params.max_orders, &mut rng)?;

    let backfill = if params.enable_vacancy {
        Some(run_backfill(&mut roster, opt_in, &mut rng)?)
    } else {
        info!("backfill disabled");
        None
    };

    info!(
        seats_filled = roster.seats_filled(),
        capacity = roster.total_capacity(),
        draws = rng.draws(),
        "allocation finished"
    );

    Ok(AllocationOutcome { draws: rng.draws(), roster, initial, backfill })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lt_core::{Applicant, Show};

    fn roster() -> Roster {
        let a = |id: &str, p: &[&str]| Applicant::new(id.parse().unwrap(), p.iter().map(|s| Some(s.parse().unwrap())).collect());
        let s = |id: &str, slot: &str, play: &str, cap| Show::new(id.parse().unwrap(), slot, play, cap);
        Roster::new(
            vec![a("P1", &["R1"]), a("P2", &["R1"])],
            vec![s("R1", "am", "x", 1), s("R2", "pm", "y", 1)],
        )
        .unwrap()
    }

    #[test]
    fn disabled_vacancy_skips_backfill() {
        let params = Params { max_orders: 1, ..Params::default() };
        let opt_in: BTreeSet<ApplicantId> = ["P1".parse().unwrap(), "P2".parse().unwrap()].into();
        let out = allocate(roster(), &params, &opt_in, 1).unwrap();
        assert!(out.backfill.is_none());
        assert_eq!(out.roster.show(1).holder_count(), 0);
    }

    #[test]
    fn enabled_vacancy_fills_leftovers_for_opt_in() {
        let params = Params { max_orders: 1, enable_vacancy: true, ..Params::default() };
        let opt_in: BTreeSet<ApplicantId> = ["P1".parse().unwrap(), "P2".parse().unwrap()].into();
        let out = allocate(roster(), &params, &opt_in, 1).unwrap();
        let bf = out.backfill.as_ref().unwrap();
        assert_eq!(bf.grants.len(), 1);
        assert_eq!(out.roster.seats_filled(), 2);
        // R1's loser is the only zero-win applicant, so R2 goes to them without a draw.
        assert_ne!(out.roster.show(0).holders(), out.roster.show(1).holders());
        assert_eq!(out.grants().count(), 2);
    }
}
