//! lt_pipeline — deterministic lottery pipeline
//! (load → validate → resolve seed → initial → backfill → build result → build run record).
//!
//! This crate does no file writing; artifacts are returned as typed documents and
//! the CLI persists them through `lt_io`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use lt_core::{GrantError, Roster};
use lt_io::IoError;

pub mod allocate;
pub mod build_result;
pub mod build_run_record;
pub mod load;
pub mod seed;
pub mod validate;

pub use allocate::{allocate, AllocationOutcome};
pub use build_result::{
    applicant_rows, build_result, result_bytes, show_rows, verify_result_bytes, ApplicantRow, ResultDoc, ShowRow,
};
pub use build_run_record::{build_run_record, normalize_rfc3339_utc, RunRecordDoc};
pub use load::{load_inputs, InputDigests, InputPaths, LoadedInputs, ParamOverrides};
pub use seed::{resolve_seed, ResolvedSeed, SeedSource};
pub use validate::{validate, Severity, ValidationIssue, ValidationReport};

/// Engine identifiers recorded in every run record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMeta {
    pub vendor: String,
    pub name: String,
    pub version: String,
    pub build: String,
}

pub fn engine_identifiers() -> EngineMeta {
    EngineMeta {
        vendor: "lt".to_string(),
        name: "lt_engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: "dev".to_string(),
    }
}

/// Pipeline context: inputs already loaded, plus the run timestamp supplied by the caller.
#[derive(Debug)]
pub struct PipelineCtx {
    pub inputs: LoadedInputs,
    pub engine_meta: EngineMeta,
    pub timestamp_utc: String,
}

#[derive(Debug)]
pub struct PipelineOutputs {
    pub result: ResultDoc,
    pub run_record: RunRecordDoc,
    pub applicant_rows: Vec<ApplicantRow>,
    pub show_rows: Vec<ShowRow>,
    pub report: ValidationReport,
}

/// Single error surface for the pipeline orchestration.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("io: {0}")]
    Io(String),
    #[error("validation failed: {0}")]
    Validate(String),
    #[error("allocation: {0}")]
    Allocate(#[from] GrantError),
    #[error("build: {0}")]
    Build(String),
}

impl From<IoError> for PipelineError {
    fn from(e: IoError) -> Self {
        use PipelineError::*;
        match e {
            IoError::Read { .. } | IoError::Write { .. } => Io(e.to_string()),
            IoError::Csv(_) | IoError::Json { .. } | IoError::Record { .. } => Validate(e.to_string()),
            IoError::Hash(m) => Build(format!("hash: {m}")),
        }
    }
}

// ---------------------------------------- Public API ----------------------------------------

/// Validate, allocate and build both documents from preloaded inputs.
/// Any fatal validation issue aborts before a single draw is made.
pub fn run_with_ctx(ctx: PipelineCtx) -> Result<PipelineOutputs, PipelineError> {
    let PipelineCtx { inputs, engine_meta, timestamp_utc } = ctx;

    // --- VALIDATE ---
    let report = validate(&inputs);
    for issue in report.warnings() {
        warn!(code = issue.code, "{}", issue.message);
    }
    if !report.pass {
        let msg = report.errors().map(|i| i.message.as_str()).collect::<Vec<_>>().join("; ");
        return Err(PipelineError::Validate(msg));
    }

    let roster = Roster::new(inputs.applicants.clone(), inputs.shows.clone())
        .map_err(|e| PipelineError::Validate(e.to_string()))?;
    info!(
        applicants = roster.applicants().len(),
        shows = roster.shows().len(),
        capacity = roster.total_capacity(),
        "inputs loaded"
    );

    // --- RESOLVE_SEED ---
    let seed = resolve_seed(inputs.params.seed);
    info!(seed = seed.value, source = seed.source.as_str(), "seed resolved");

    // --- INITIAL / BACKFILL ---
    let outcome = allocate(roster, &inputs.params, &inputs.opt_in, seed.value)?;

    // --- BUILD_RESULT ---
    let result = build_result(&outcome.roster)?;
    let applicant_rows = applicant_rows(&result);
    let show_rows = show_rows(&result);

    // --- BUILD_RUN_RECORD ---
    let run_record = build_run_record(&timestamp_utc, engine_meta, &inputs, &seed, &outcome, &result)?;
    info!(result_id = %result.id, run_id = %run_record.id, "artifacts built");

    Ok(PipelineOutputs { result, run_record, applicant_rows, show_rows, report })
}

/// Convenience entry: load from paths and run.
pub fn run_from_paths(
    paths: &InputPaths,
    overrides: &ParamOverrides,
    timestamp_utc: &str,
) -> Result<PipelineOutputs, PipelineError> {
    let inputs = load_inputs(paths, overrides)?;
    run_with_ctx(PipelineCtx {
        inputs,
        engine_meta: engine_identifiers(),
        timestamp_utc: timestamp_utc.to_string(),
    })
}
