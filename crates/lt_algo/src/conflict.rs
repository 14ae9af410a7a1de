//! Conflict check: may an applicant take a show given what they already hold?

use lt_core::{Roster, ShowId};

/// Which exclusion key clashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKey {
    Slot,
    Play,
}

/// True iff a show already won by `applicant` shares a slot or play with `show`.
#[inline]
pub fn conflicts(roster: &Roster, applicant: usize, show: usize) -> bool {
    find_conflict(roster, applicant, show).is_some()
}

/// First held show clashing with `show`, and the key it clashes on.
/// O(win count) index lookups; no side effects.
pub fn find_conflict(roster: &Roster, applicant: usize, show: usize) -> Option<(&ShowId, ConflictKey)> {
    let candidate = roster.show(show);
    roster.held_shows(applicant).find_map(|held| {
        if held.slot() == candidate.slot() {
            Some((held.id(), ConflictKey::Slot))
        } else if held.play() == candidate.play() {
            Some((held.id(), ConflictKey::Play))
        } else {
            None
        }
    })
}
