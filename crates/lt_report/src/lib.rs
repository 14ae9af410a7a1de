//! lt_report — pure offline report model + renderers (JSON/HTML).
//!
//! Determinism rules:
//! - No I/O here. Callers supply artifacts already in memory.
//! - Percent strings use one-decimal formatting without float arithmetic.
//! - Stable section order and field names.
//!
//! Inputs are the parsed `result.json` (and optionally `run_record.json`) as
//! `serde_json::Value`, so the report reads exactly what was written.

#![deny(unsafe_code)]

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[cfg(feature = "render_html")]
pub mod render_html;
#[cfg(feature = "render_json")]
pub mod render_json;

pub type ResultArtifact = Value;
pub type RunRecordArtifact = Value;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("missing field {0}")]
    MissingField(String),
    #[error("inconsistent artifact: {0}")]
    Inconsistent(String),
}

// ===== Model =====

#[derive(Clone, Debug, Serialize)]
pub struct ReportModel {
    pub cover: SectionCover,
    pub snapshot: Option<SectionSnapshot>,
    pub shows: Vec<ShowLine>,
    pub distribution: Vec<DistributionLine>,
    pub allocation: Option<SectionAllocation>,
    pub integrity: SectionIntegrity,
}

#[derive(Clone, Debug, Serialize)]
pub struct SectionCover {
    pub title: String,
    pub applicants: u64,
    pub shows: u64,
    pub seats_filled: u64,
    pub total_capacity: u64,
    pub fill_pct_1dp: String,
    pub applicants_with_wins: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct SnapshotVar {
    pub key: String,
    pub value: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct SectionSnapshot {
    pub items: Vec<SnapshotVar>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ShowLine {
    pub id: String,
    pub slot: String,
    pub play: String,
    pub capacity: u64,
    pub holder_count: u64,
    pub holders: Vec<String>,
}

/// How many applicants ended with `wins` wins.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct DistributionLine {
    pub wins: u64,
    pub applicants: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct SectionAllocation {
    pub rounds_run: u64,
    pub initial_grants: u64,
    pub backfill_ran: bool,
    pub backfill_grants: u64,
    pub draws: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct SectionIntegrity {
    pub result_id: String,
    pub run_id: Option<String>,
    pub timestamp_utc: Option<String>,
    pub engine: Option<String>,
    pub seed: Option<String>,
    pub input_digests: Vec<SnapshotVar>,
}

// ===== API =====

/// Build the report model from artifacts. Reads only presentation fields;
/// nothing is recomputed except counts and percentages.
pub fn build_model(result: &ResultArtifact, run: Option<&RunRecordArtifact>) -> Result<ReportModel, ReportError> {
    let result_id = req_str(result, "/id")?;

    let seats_filled = req_u64(result, "/summary/seats_filled")?;
    let total_capacity = req_u64(result, "/summary/total_capacity")?;
    let cover = SectionCover {
        title: "Seat Lottery Result".to_string(),
        applicants: req_u64(result, "/summary/applicants")?,
        shows: req_u64(result, "/summary/shows")?,
        seats_filled,
        total_capacity,
        fill_pct_1dp: percent_1dp(seats_filled, total_capacity),
        applicants_with_wins: req_u64(result, "/summary/applicants_with_wins")?,
    };

    let shows = req_array(result, "/shows")?
        .iter()
        .map(|s| -> Result<ShowLine, ReportError> {
            Ok(ShowLine {
                id: req_str(s, "/id")?,
                slot: req_str(s, "/slot")?,
                play: req_str(s, "/play")?,
                capacity: req_u64(s, "/capacity")?,
                holder_count: req_u64(s, "/holder_count")?,
                holders: str_list(s, "/holders"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(bad) = shows.iter().find(|s| s.holder_count > s.capacity) {
        return Err(ReportError::Inconsistent(format!("show {} holds more than its capacity", bad.id)));
    }

    let mut dist: BTreeMap<u64, u64> = BTreeMap::new();
    for a in req_array(result, "/applicants")? {
        *dist.entry(req_u64(a, "/win_count")?).or_default() += 1;
    }
    let distribution = dist.into_iter().map(|(wins, applicants)| DistributionLine { wins, applicants }).collect();

    let snapshot = run.map(snapshot_from_run);
    let allocation = run.map(|r| SectionAllocation {
        rounds_run: opt_u64(r, "/allocation/rounds_run"),
        initial_grants: opt_u64(r, "/allocation/initial_grants"),
        backfill_ran: r.pointer("/allocation/backfill_ran").and_then(Value::as_bool).unwrap_or(false),
        backfill_grants: opt_u64(r, "/allocation/backfill_grants"),
        draws: opt_u64(r, "/allocation/draws"),
    });

    if let Some(r) = run {
        if let Some(recorded) = r.pointer("/outputs/result_id").and_then(Value::as_str) {
            if recorded != result_id {
                return Err(ReportError::Inconsistent(format!(
                    "run record points at {recorded}, result is {result_id}"
                )));
            }
        }
    }

    let integrity = SectionIntegrity {
        result_id,
        run_id: run.and_then(|r| opt_str(r, "/id")),
        timestamp_utc: run.and_then(|r| opt_str(r, "/timestamp_utc")),
        engine: run.and_then(|r| {
            let name = opt_str(r, "/engine/name")?;
            let version = opt_str(r, "/engine/version").unwrap_or_default();
            Some(format!("{name} v{version}"))
        }),
        seed: run.and_then(|r| {
            let v = r.pointer("/seed/value").and_then(Value::as_u64)?;
            let src = opt_str(r, "/seed/source").unwrap_or_else(|| "unknown".into());
            Some(format!("{v} ({src})"))
        }),
        input_digests: run
            .and_then(|r| r.pointer("/inputs").and_then(Value::as_object))
            .map(|o| {
                let mut items: Vec<SnapshotVar> = o
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| SnapshotVar { key: k.clone(), value: s.to_string() }))
                    .collect();
                items.sort_by(|a, b| a.key.cmp(&b.key));
                items
            })
            .unwrap_or_default(),
    };

    Ok(ReportModel { cover, snapshot, shows, distribution, allocation, integrity })
}

fn snapshot_from_run(run: &Value) -> SectionSnapshot {
    let mut items = Vec::new();
    for key in ["max_orders", "enable_vacancy", "strict_preferences"] {
        if let Some(v) = run.pointer(&format!("/params/{key}")) {
            items.push(SnapshotVar { key: key.to_string(), value: cell_to_string(v) });
        }
    }
    SectionSnapshot { items }
}

// ===== Helpers (pure; no floats) =====

/// `num/den` as a percentage with one decimal, rounded half up. `den == 0` ⇒ "0.0%".
pub fn percent_1dp(num: u64, den: u64) -> String {
    if den == 0 {
        return "0.0%".to_string();
    }
    let tenths = (u128::from(num) * 1000 + u128::from(den) / 2) / u128::from(den);
    format!("{}.{}%", tenths / 10, tenths % 10)
}

fn cell_to_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        _ => v.to_string(),
    }
}

fn req_str(root: &Value, ptr: &str) -> Result<String, ReportError> {
    opt_str(root, ptr).ok_or_else(|| ReportError::MissingField(ptr.to_string()))
}

fn req_u64(root: &Value, ptr: &str) -> Result<u64, ReportError> {
    root.pointer(ptr).and_then(Value::as_u64).ok_or_else(|| ReportError::MissingField(ptr.to_string()))
}

fn req_array<'a>(root: &'a Value, ptr: &str) -> Result<&'a Vec<Value>, ReportError> {
    root.pointer(ptr).and_then(Value::as_array).ok_or_else(|| ReportError::MissingField(ptr.to_string()))
}

fn opt_str(root: &Value, ptr: &str) -> Option<String> {
    root.pointer(ptr).and_then(Value::as_str).map(str::to_string)
}

fn opt_u64(root: &Value, ptr: &str) -> u64 {
    root.pointer(ptr).and_then(Value::as_u64).unwrap_or(0)
}

fn str_list(root: &Value, ptr: &str) -> Vec<String> {
    root.pointer(ptr)
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(|x| x.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}
