//! Applicants, shows, and the `Roster` that keeps both sides of every
//! assignment in step.
//!
//! Invariants held by `Roster` at all times:
//! - `show.holders.len() <= show.capacity`
//! - no applicant holds two shows sharing a slot or a play
//! - `show ∈ applicant.wins  <=>  applicant ∈ show.holders`
//! - applicant ids and show ids are unique
//!
//! `wins`/`holders` are private; the only way to change them is
//! [`Roster::grant`], which updates both sides together.

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{GrantError, RosterError};
use crate::ids::{ApplicantId, ShowId};

/// A capacity-limited show with two mutual-exclusion keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Show {
    id: ShowId,
    slot: String,
    play: String,
    capacity: u32,
    holders: BTreeSet<ApplicantId>,
}

impl Show {
    pub fn new(id: ShowId, slot: impl Into<String>, play: impl Into<String>, capacity: u32) -> Self {
        Self {
            id,
            slot: slot.into(),
            play: play.into(),
            capacity,
            holders: BTreeSet::new(),
        }
    }

    #[inline] pub fn id(&self) -> &ShowId { &self.id }
    /// Time slot (first exclusion key).
    #[inline] pub fn slot(&self) -> &str { &self.slot }
    /// Underlying play/item (second exclusion key).
    #[inline] pub fn play(&self) -> &str { &self.play }
    #[inline] pub fn capacity(&self) -> u32 { self.capacity }
    /// Holders in ascending id order.
    #[inline] pub fn holders(&self) -> &BTreeSet<ApplicantId> { &self.holders }
    #[inline] pub fn holder_count(&self) -> usize { self.holders.len() }

    /// Unused seats.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.holders.len() as u32)
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    /// True when both shows cannot be held by the same applicant.
    #[inline]
    pub fn shares_key_with(&self, other: &Show) -> bool {
        self.slot == other.slot || self.play == other.play
    }
}

/// An applicant with a fixed-length ranked preference list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applicant {
    id: ApplicantId,
    preferences: Vec<Option<ShowId>>,
    wins: BTreeSet<ShowId>,
}

impl Applicant {
    /// `preferences[rank]` is `None` where the applicant left that rank blank.
    pub fn new(id: ApplicantId, preferences: Vec<Option<ShowId>>) -> Self {
        Self {
            id,
            preferences,
            wins: BTreeSet::new(),
        }
    }

    #[inline] pub fn id(&self) -> &ApplicantId { &self.id }
    #[inline] pub fn preferences(&self) -> &[Option<ShowId>] { &self.preferences }

    /// Preference at `rank` (0-based); `None` for a blank or out-of-range rank.
    #[inline]
    pub fn preference_at(&self, rank: usize) -> Option<&ShowId> {
        self.preferences.get(rank).and_then(Option::as_ref)
    }

    /// Wins in ascending id order.
    #[inline] pub fn wins(&self) -> &BTreeSet<ShowId> { &self.wins }
    #[inline] pub fn win_count(&self) -> usize { self.wins.len() }

    #[inline]
    pub fn holds(&self, show: &ShowId) -> bool {
        self.wins.contains(show)
    }
}

/// Owns every applicant and show (in input order) plus id → index maps.
#[derive(Debug, Clone)]
pub struct Roster {
    applicants: Vec<Applicant>,
    shows: Vec<Show>,
    applicant_ix: BTreeMap<ApplicantId, usize>,
    show_ix: BTreeMap<ShowId, usize>,
}

impl Roster {
    /// Build a roster, rejecting duplicate applicant or show ids.
    /// Every duplicated value is reported (sorted, once each).
    pub fn new(applicants: Vec<Applicant>, shows: Vec<Show>) -> Result<Self, RosterError> {
        let (applicant_ix, dup_applicants) = index_unique(applicants.iter().map(Applicant::id));
        let (show_ix, dup_shows) = index_unique(shows.iter().map(Show::id));

        if !dup_applicants.is_empty() || !dup_shows.is_empty() {
            return Err(RosterError::Duplicates {
                applicants: dup_applicants,
                shows: dup_shows,
            });
        }

        Ok(Self {
            applicants,
            shows,
            applicant_ix,
            show_ix,
        })
    }

    #[inline] pub fn applicants(&self) -> &[Applicant] { &self.applicants }
    #[inline] pub fn shows(&self) -> &[Show] { &self.shows }
    #[inline] pub fn applicant(&self, ix: usize) -> &Applicant { &self.applicants[ix] }
    #[inline] pub fn show(&self, ix: usize) -> &Show { &self.shows[ix] }

    pub fn applicant_index(&self, id: &str) -> Option<usize> {
        self.applicant_ix.get(id).copied()
    }

    pub fn show_index(&self, id: &str) -> Option<usize> {
        self.show_ix.get(id).copied()
    }

    pub fn show_by_id(&self, id: &str) -> Option<&Show> {
        self.show_index(id).map(|ix| &self.shows[ix])
    }

    /// Shows currently held by applicant `ix`, resolved through the id index.
    pub fn held_shows(&self, ix: usize) -> impl Iterator<Item = &Show> + '_ {
        self.applicants[ix]
            .wins
            .iter()
            .filter_map(move |id| self.show_by_id(id.as_str()))
    }

    /// True when no show has a free seat (vacuously true with no shows).
    pub fn all_full(&self) -> bool {
        self.shows.iter().all(Show::is_full)
    }

    /// Seats across all shows.
    pub fn total_capacity(&self) -> u64 {
        self.shows.iter().map(|s| s.capacity as u64).sum()
    }

    /// Seats already assigned across all shows.
    pub fn seats_filled(&self) -> u64 {
        self.shows.iter().map(|s| s.holders.len() as u64).sum()
    }

    /// Assign show `show` to applicant `applicant`, touching both sides.
    ///
    /// Refuses to overfill a show, to grant a held show twice, or to grant a
    /// show sharing a slot/play with one the applicant already holds.
    pub fn grant(&mut self, applicant: usize, show: usize) -> Result<(), GrantError> {
        if applicant >= self.applicants.len() || show >= self.shows.len() {
            return Err(GrantError::OutOfRange { applicant, show });
        }

        let target = &self.shows[show];
        let who = &self.applicants[applicant];
        if target.is_full() {
            return Err(GrantError::ShowFull {
                show: target.id.clone(),
                capacity: target.capacity,
            });
        }
        if who.holds(&target.id) {
            return Err(GrantError::AlreadyHeld {
                applicant: who.id.clone(),
                show: target.id.clone(),
            });
        }
        if let Some(held) = self.held_shows(applicant).find(|h| h.shares_key_with(target)) {
            return Err(GrantError::Conflict {
                applicant: who.id.clone(),
                show: target.id.clone(),
                held: held.id.clone(),
            });
        }

        let show_id = self.shows[show].id.clone();
        let applicant_id = self.applicants[applicant].id.clone();
        self.applicants[applicant].wins.insert(show_id);
        self.shows[show].holders.insert(applicant_id);
        Ok(())
    }
}

/// Index ids by first position; collect every id seen more than once.
fn index_unique<'a, I, K>(ids: I) -> (BTreeMap<K, usize>, Vec<K>)
where
    I: Iterator<Item = &'a K>,
    K: Ord + Clone + 'a,
{
    let mut index = BTreeMap::new();
    let mut dups = BTreeSet::new();
    for (ix, id) in ids.enumerate() {
        if index.contains_key(id) {
            dups.insert(id.clone());
        } else {
            index.insert(id.clone(), ix);
        }
    }
    (index, dups.into_iter().collect())
}
