//! crates/lt_pipeline/src/build_result.rs
//! BUILD_RESULT: final holders and wins as a canonical, self-identifying document.
//!
//! - Shows and applicants keep input order; every id list is sorted ascending.
//! - `id = "RES:" + sha256(canonical bytes of the document without `id`)`.
//! - The CSV tables are flat projections of the same document.

use serde::{Deserialize, Serialize};

use lt_core::Roster;
use lt_io::canonical_json::to_canonical_bytes;
use lt_io::hasher::{res_id, sha256_canonical, sha256_hex};

use crate::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDoc {
    pub id: String,
    #[serde(flatten)]
    pub body: ResultBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultBody {
    pub shows: Vec<ShowResult>,
    pub applicants: Vec<ApplicantResult>,
    pub summary: ResultSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowResult {
    pub id: String,
    pub slot: String,
    pub play: String,
    pub capacity: u32,
    pub holder_count: usize,
    pub holders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantResult {
    pub id: String,
    pub win_count: usize,
    pub wins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub applicants: usize,
    pub shows: usize,
    pub total_capacity: u64,
    pub seats_filled: u64,
    pub applicants_with_wins: usize,
}

pub fn build_result(roster: &Roster) -> Result<ResultDoc, PipelineError> {
    // BTreeSet iteration is already ascending.
    let shows = roster
        .shows()
        .iter()
        .map(|s| ShowResult {
            id: s.id().to_string(),
            slot: s.slot().to_string(),
            play: s.play().to_string(),
            capacity: s.capacity(),
            holder_count: s.holder_count(),
            holders: s.holders().iter().map(|a| a.to_string()).collect(),
        })
        .collect();
    let applicants: Vec<ApplicantResult> = roster
        .applicants()
        .iter()
        .map(|a| ApplicantResult {
            id: a.id().to_string(),
            win_count: a.win_count(),
            wins: a.wins().iter().map(|s| s.to_string()).collect(),
        })
        .collect();
    let summary = ResultSummary {
        applicants: roster.applicants().len(),
        shows: roster.shows().len(),
        total_capacity: roster.total_capacity(),
        seats_filled: roster.seats_filled(),
        applicants_with_wins: applicants.iter().filter(|a| a.win_count > 0).count(),
    };

    let body = ResultBody { shows, applicants, summary };
    let hex = sha256_canonical(&body)?;
    Ok(ResultDoc { id: res_id(&hex)?, body })
}

/// Re-derive the id of a written `result.json` and check its file digest.
/// Used by the CLI as a post-write self-check.
pub fn verify_result_bytes(bytes: &[u8], expected_sha256: &str) -> Result<(), PipelineError> {
    let actual = sha256_hex(bytes);
    if actual != expected_sha256 {
        return Err(PipelineError::Build(format!("result.json sha256 {actual} != recorded {expected_sha256}")));
    }
    let doc: ResultDoc = serde_json::from_slice(bytes).map_err(|e| PipelineError::Build(format!("result.json: {e}")))?;
    let rederived = res_id(&sha256_canonical(&doc.body)?)?;
    if rederived != doc.id {
        return Err(PipelineError::Build(format!("result id {} does not match content ({rederived})", doc.id)));
    }
    Ok(())
}

/// Canonical bytes exactly as written to `result.json`.
pub fn result_bytes(doc: &ResultDoc) -> Result<Vec<u8>, PipelineError> {
    Ok(to_canonical_bytes(doc)?)
}

// ---------------------------------------- CSV projections ----------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantRow {
    pub id: String,
    pub win_count: usize,
    pub wins: String,
}

impl ApplicantRow {
    pub const HEADER: &'static [&'static str] = &["id", "win_count", "wins"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowRow {
    pub id: String,
    pub slot: String,
    pub play: String,
    pub capacity: u32,
    pub holder_count: usize,
    pub holders: String,
}

impl ShowRow {
    pub const HEADER: &'static [&'static str] = &["id", "slot", "play", "capacity", "holder_count", "holders"];
}

pub fn applicant_rows(doc: &ResultDoc) -> Vec<ApplicantRow> {
    doc.body
        .applicants
        .iter()
        .map(|a| ApplicantRow { id: a.id.clone(), win_count: a.win_count, wins: a.wins.join(";") })
        .collect()
}

pub fn show_rows(doc: &ResultDoc) -> Vec<ShowRow> {
    doc.body
        .shows
        .iter()
        .map(|s| ShowRow {
            id: s.id.clone(),
            slot: s.slot.clone(),
            play: s.play.clone(),
            capacity: s.capacity,
            holder_count: s.holder_count,
            holders: s.holders.join(";"),
        })
        .collect()
}
