//! crates/lt_pipeline/src/validate.rs
//! Structural & referential checks before any draw.
//! Deterministic: issues come out in check order, entities in input order.

use std::collections::{BTreeMap, BTreeSet};

use crate::load::LoadedInputs;

/// Issue severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One validation finding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
}

/// pass = no Error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub pass: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }
}

pub fn validate(inputs: &LoadedInputs) -> ValidationReport {
    let mut issues = Vec::new();

    issues.extend(check_duplicates("applicant", "dup_applicant", inputs.applicants.iter().map(|a| a.id().as_str())));
    issues.extend(check_duplicates("show", "dup_show", inputs.shows.iter().map(|s| s.id().as_str())));
    issues.extend(check_preferences(inputs));
    issues.extend(check_opt_in(inputs));
    issues.extend(check_dropped(inputs));
    if inputs.params.enable_vacancy && !inputs.vacancy_present {
        issues.push(ValidationIssue {
            severity: Severity::Warning,
            code: "no_vacancy_list",
            message: "vacancy enabled but no vacancy list was read; backfill has no candidates".into(),
        });
    }

    ValidationReport { pass: !issues.iter().any(|i| i.severity == Severity::Error), issues }
}

// ------------------------------------------------------------------------------------------------
// Checks
// ------------------------------------------------------------------------------------------------

fn check_duplicates<'a, I>(kind: &str, code: &'static str, ids: I) -> Option<ValidationIssue>
where
    I: Iterator<Item = &'a str>,
{
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for id in ids {
        *seen.entry(id).or_default() += 1;
    }
    let dups: Vec<&str> = seen.into_iter().filter(|(_, n)| *n > 1).map(|(id, _)| id).collect();
    if dups.is_empty() {
        return None;
    }
    Some(ValidationIssue {
        severity: Severity::Error,
        code,
        message: format!("duplicate {kind} ids: {}", dups.join(", ")),
    })
}

/// Preference ids that name no show can never be won. Fatal only in strict mode.
fn check_preferences(inputs: &LoadedInputs) -> Vec<ValidationIssue> {
    let known: BTreeSet<&str> = inputs.shows.iter().map(|s| s.id().as_str()).collect();
    let severity = if inputs.params.strict_preferences { Severity::Error } else { Severity::Warning };

    let mut out = Vec::new();
    for a in &inputs.applicants {
        for (rank, pref) in a.preferences().iter().enumerate() {
            if let Some(show) = pref {
                if !known.contains(show.as_str()) {
                    out.push(ValidationIssue {
                        severity,
                        code: "unknown_preference",
                        message: format!("applicant {} rank {}: unknown show id {}", a.id(), rank + 1, show),
                    });
                }
            }
        }
    }
    out
}

fn check_opt_in(inputs: &LoadedInputs) -> Vec<ValidationIssue> {
    let known: BTreeSet<&str> = inputs.applicants.iter().map(|a| a.id().as_str()).collect();
    inputs
        .opt_in
        .iter()
        .filter(|id| !known.contains(id.as_str()))
        .map(|id| ValidationIssue {
            severity: Severity::Warning,
            code: "unknown_opt_in",
            message: format!("vacancy list names unknown applicant {id}; ignored"),
        })
        .collect()
}

fn check_dropped(inputs: &LoadedInputs) -> Vec<ValidationIssue> {
    inputs
        .dropped_preferences
        .iter()
        .map(|d| ValidationIssue {
            severity: Severity::Warning,
            code: "dropped_preference",
            message: format!(
                "applicant {} line {}: preference {} beyond max_orders={} dropped",
                d.applicant, d.line, d.value, inputs.params.max_orders
            ),
        })
        .collect()
}
