//! lt_core — Core types, roster state, params, and deterministic RNG.
//!
//! This crate is **I/O-free**. It defines the stable types shared across the
//! engine (`lt_io`, `lt_algo`, `lt_pipeline`, `lt_report`, `lt_cli`).
//!
//! - Tokens: `ApplicantId`, `ShowId`
//! - Entities: `Applicant`, `Show`, and the `Roster` that owns both sides of
//!   every assignment
//! - `Params`: max preference rank count, vacancy gate, seed
//! - `DrawRng`: seedable xorshift128 stream used for every lottery draw
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod errors;
pub mod ids;
pub mod entities;
pub mod variables;
pub mod rng;

pub use entities::{Applicant, Roster, Show};
pub use errors::{CoreError, GrantError, IdError, RosterError};
pub use ids::{ApplicantId, ShowId};
pub use rng::DrawRng;
pub use variables::{Params, MAX_ORDERS_LIMIT};
