// crates/lt_algo/src/lib.rs
//! Lottery algorithms. No I/O; every random choice goes through the caller's
//! `DrawRng`, so a fixed seed replays a run exactly.
//!
//! Leaves first: [`fairness`], [`conflict`], [`select`]; then the shared
//! selection pass in [`engine`] and the two drivers built on it,
//! [`initial`] and [`backfill`].

#![forbid(unsafe_code)]

pub mod fairness;
pub mod conflict;
pub mod select;
pub mod engine;
pub mod initial;
pub mod backfill;

pub use backfill::{run_backfill, BackfillOutcome};
pub use conflict::{conflicts, find_conflict, ConflictKey};
pub use engine::{Cadence, Grant, Phase};
pub use fairness::{FairnessGroups, WinCount};
pub use initial::{run_initial, InitialOutcome};
pub use select::select_winners;
