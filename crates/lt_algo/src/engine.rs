//! The selection pass shared by both allocation engines.
//!
//! One pass walks shows in input order. For each show with free seats it walks
//! fairness buckets (fewest wins first), filters the bucket to eligible,
//! not-yet-holding, conflict-free applicants, draws winners for the remaining
//! seats and grants them through `Roster::grant`.
//!
//! The engines differ only in who is eligible and in [`Cadence`]:
//! the initial rounds freeze one fairness snapshot per pass, backfill regroups
//! from live state before every show.

use lt_core::{Applicant, ApplicantId, DrawRng, GrantError, Roster, Show, ShowId};
use tracing::debug;

use crate::conflict::conflicts;
use crate::fairness::FairnessGroups;
use crate::select::select_winners;

/// When the fairness grouping is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Once at the start of the pass; wins granted during the pass do not
    /// move anyone between buckets.
    Frozen,
    /// Recomputed from current state immediately before each show.
    Live,
}

/// Which pass produced a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initial,
    Backfill,
}

/// One seat handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub applicant: ApplicantId,
    pub show: ShowId,
    pub phase: Phase,
    /// 0-based preference rank for initial grants; `None` for backfill.
    pub rank: Option<u32>,
    /// Win count of the bucket the winner was drawn from.
    pub bucket: usize,
}

/// Fixed description of a pass: its phase, rank and grouping cadence.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PassPlan {
    pub phase: Phase,
    pub rank: Option<u32>,
    pub cadence: Cadence,
}

/// Run one pass over every show for the applicants in `pool` (roster indices,
/// input order). `wants(applicant, show)` is the pass-specific eligibility.
pub(crate) fn run_pass<F>(
    roster: &mut Roster,
    pool: &[usize],
    plan: PassPlan,
    mut wants: F,
    rng: &mut DrawRng,
) -> Result<Vec<Grant>, GrantError>
where
    F: FnMut(&Applicant, &Show) -> bool,
{
    let frozen = match plan.cadence {
        Cadence::Frozen => Some(group_pool(roster, pool)),
        Cadence::Live => None,
    };

    let mut grants = Vec::new();
    for show in 0..roster.shows().len() {
        if roster.show(show).is_full() {
            continue;
        }
        let live;
        let groups = match &frozen {
            Some(g) => g,
            None => {
                live = group_pool(roster, pool);
                &live
            }
        };
        fill_show(roster, show, groups, plan, &mut wants, rng, &mut grants)?;
    }
    Ok(grants)
}

fn group_pool(roster: &Roster, pool: &[usize]) -> FairnessGroups<usize> {
    FairnessGroups::build(pool.iter().map(|&ix| (ix, roster.applicant(ix))))
}

fn fill_show<F>(
    roster: &mut Roster,
    show: usize,
    groups: &FairnessGroups<usize>,
    plan: PassPlan,
    wants: &mut F,
    rng: &mut DrawRng,
    grants: &mut Vec<Grant>,
) -> Result<(), GrantError>
where
    F: FnMut(&Applicant, &Show) -> bool,
{
    let mut seats = roster.show(show).remaining() as usize;

    for (bucket, members) in groups.iter() {
        if seats == 0 {
            break;
        }
        let candidates: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&a| {
                let (who, target) = (roster.applicant(a), roster.show(show));
                wants(who, target) && !who.holds(target.id()) && !conflicts(roster, a, show)
            })
            .collect();
        if candidates.is_empty() {
            continue;
        }

        let winners = select_winners(&candidates, seats, rng);
        debug!(
            show = %roster.show(show).id(),
            bucket,
            candidates = candidates.len(),
            seats,
            winners = winners.len(),
            "selection step"
        );
        for a in winners {
            roster.grant(a, show)?;
            seats -= 1;
            grants.push(Grant {
                applicant: roster.applicant(a).id().clone(),
                show: roster.show(show).id().clone(),
                phase: plan.phase,
                rank: plan.rank,
                bucket,
            });
        }
    }
    Ok(())
}
