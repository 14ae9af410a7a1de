//! Error sets for core-domain parsing, roster construction and grants.

use thiserror::Error;

use crate::ids::{ApplicantId, ShowId};

/// Returned when validating or parsing token ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("id is empty")]
    Empty,
    #[error("id contains non-ASCII or NUL bytes")]
    NonAscii,
    #[error("id is longer than 64 bytes")]
    TooLong,
    #[error("id has characters outside [A-Za-z0-9_.:-]")]
    BadShape,
}

/// Minimal error set for parameter domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("domain out of range: {0}")]
    DomainOutOfRange(&'static str),
}

/// Fatal input problems detected while assembling a `Roster`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("{}", describe_duplicates(.applicants, .shows))]
    Duplicates {
        applicants: Vec<ApplicantId>,
        shows: Vec<ShowId>,
    },
}

/// A grant that would break a roster invariant. The engines never produce
/// these; seeing one means a caller bypassed the eligibility filters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrantError {
    #[error("index out of range: applicant #{applicant}, show #{show}")]
    OutOfRange { applicant: usize, show: usize },
    #[error("show {show} is already at capacity {capacity}")]
    ShowFull { show: ShowId, capacity: u32 },
    #[error("applicant {applicant} already holds {show}")]
    AlreadyHeld { applicant: ApplicantId, show: ShowId },
    #[error("applicant {applicant} cannot take {show}: shares a slot or play with {held}")]
    Conflict {
        applicant: ApplicantId,
        show: ShowId,
        held: ShowId,
    },
}

fn describe_duplicates(applicants: &[ApplicantId], shows: &[ShowId]) -> String {
    let mut parts = Vec::new();
    if !applicants.is_empty() {
        parts.push(format!("duplicate applicant ids: {}", join(applicants)));
    }
    if !shows.is_empty() {
        parts.push(format!("duplicate show ids: {}", join(shows)));
    }
    parts.join("; ")
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}
