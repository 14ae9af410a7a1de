//! crates/lt_pipeline/src/build_run_record.rs
//! BUILD_RUN_RECORD: provenance for one run.
//!
//! Records what went in (input digests, effective params, resolved seed),
//! what happened (rounds, draws, every grant) and what came out (result id
//! and file digest).
//! `id = "RUN:<timestamp>-" + sha256(canonical bytes of the record without `id`)`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use lt_algo::{Grant, Phase};
use lt_core::Params;
use lt_io::hasher::{run_id, sha256_canonical, sha256_hex};

use crate::allocate::AllocationOutcome;
use crate::build_result::{result_bytes, ResultDoc};
use crate::load::{InputDigests, LoadedInputs};
use crate::seed::{ResolvedSeed, SeedSource};
use crate::{EngineMeta, PipelineError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecordDoc {
    pub id: String,
    #[serde(flatten)]
    pub body: RunRecordBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecordBody {
    pub timestamp_utc: String,
    pub engine: EngineMeta,
    pub inputs: InputDigests,
    pub params: Params,
    pub seed: SeedEcho,
    pub allocation: AllocationEcho,
    pub grants: Vec<GrantEcho>,
    pub outputs: RunOutputs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedEcho {
    pub value: u64,
    pub source: SeedSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEcho {
    pub rounds_run: u32,
    pub stopped_full: bool,
    pub initial_grants: usize,
    pub backfill_ran: bool,
    pub backfill_candidates: usize,
    pub backfill_grants: usize,
    pub draws: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantEcho {
    pub applicant: String,
    pub show: String,
    pub phase: String,
    /// 1-based preference rank; absent for backfill.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    pub bucket: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutputs {
    pub result_id: String,
    pub result_sha256: String,
}

/// Canonical RFC3339 UTC, whole seconds, trailing `Z`.
pub fn normalize_rfc3339_utc(ts: &str) -> Result<String, PipelineError> {
    let dt: DateTime<Utc> = ts
        .parse::<DateTime<Utc>>()
        .map_err(|_| PipelineError::Build(format!("bad RFC3339 timestamp: {ts:?}")))?;
    Ok(dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

pub fn build_run_record(
    timestamp_utc: &str,
    engine: EngineMeta,
    inputs: &LoadedInputs,
    seed: &ResolvedSeed,
    outcome: &AllocationOutcome,
    result: &ResultDoc,
) -> Result<RunRecordDoc, PipelineError> {
    let timestamp_utc = normalize_rfc3339_utc(timestamp_utc)?;

    let allocation = AllocationEcho {
        rounds_run: outcome.initial.rounds_run,
        stopped_full: outcome.initial.stopped_full,
        initial_grants: outcome.initial.grants.len(),
        backfill_ran: outcome.backfill.is_some(),
        backfill_candidates: outcome.backfill.as_ref().map_or(0, |b| b.candidates),
        backfill_grants: outcome.backfill.as_ref().map_or(0, |b| b.grants.len()),
        draws: outcome.draws,
    };

    let body = RunRecordBody {
        timestamp_utc,
        engine,
        inputs: inputs.digests.clone(),
        params: inputs.params.clone(),
        seed: SeedEcho { value: seed.value, source: seed.source },
        allocation,
        grants: outcome.grants().map(grant_echo).collect(),
        outputs: RunOutputs {
            result_id: result.id.clone(),
            result_sha256: sha256_hex(&result_bytes(result)?),
        },
    };

    let hex = sha256_canonical(&body)?;
    Ok(RunRecordDoc { id: run_id(&body.timestamp_utc, &hex)?, body })
}

fn grant_echo(g: &Grant) -> GrantEcho {
    GrantEcho {
        applicant: g.applicant.to_string(),
        show: g.show.to_string(),
        phase: match g.phase {
            Phase::Initial => "initial",
            Phase::Backfill => "backfill",
        }
        .to_string(),
        rank: g.rank.map(|r| r + 1),
        bucket: g.bucket,
    }
}
