//! crates/lt_io/src/lib.rs
//! Single-source-of-truth I/O crate for the lottery engine.
//!
//! - `records`: applicants / shows / vacancy CSV → `lt_core` entities
//! - `params`: JSON parameter file → `lt_core::Params`
//! - `canonical_json`: sorted-key compact JSON + atomic file writes
//! - `hasher`: SHA-256 digests and `RES:` / `RUN:` ids
//! - `writer`: CSV result tables
//!
//! Shared error type (`IoError`) with `From` conversions used across modules.

#![forbid(unsafe_code)]

use thiserror::Error;

pub mod canonical_json;
pub mod hasher;
pub mod params;
pub mod records;
pub mod writer;

/// Unified error for lt_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem read failures (open, read).
    #[error("read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem write failures (create_dir_all, rename, fsync, …).
    #[error("write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV framing/encoding errors.
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// A well-formed file whose content breaks a record rule.
    #[error("{file} line {line}: {msg}")]
    Record { file: String, line: u64, msg: String },

    /// Hashing / canonicalization failures.
    #[error("hash error: {0}")]
    Hash(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps no pointer; callers may enrich this.
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}
