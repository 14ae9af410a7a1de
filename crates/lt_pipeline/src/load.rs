//! LOAD: read params and records from disk, apply overrides, record input digests.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use lt_core::{Applicant, ApplicantId, Params, Show};
use lt_io::params::load_params;
use lt_io::records::{read_applicants, read_shows, read_vacancy, DroppedPreference};

use crate::PipelineError;

#[derive(Debug, Clone, Default)]
pub struct InputPaths {
    /// Absent ⇒ `Params::default()` before overrides.
    pub params: Option<PathBuf>,
    pub applicants: PathBuf,
    pub shows: PathBuf,
    /// Absent path or missing file ⇒ empty opt-in set.
    pub vacancy: Option<PathBuf>,
}

/// Command-line overrides; `Some` wins over the params file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamOverrides {
    pub seed: Option<u64>,
    pub max_orders: Option<u32>,
    pub enable_vacancy: Option<bool>,
    pub strict_preferences: Option<bool>,
}

impl ParamOverrides {
    pub fn apply(&self, params: &mut Params) {
        if let Some(s) = self.seed {
            params.seed = Some(s);
        }
        if let Some(m) = self.max_orders {
            params.max_orders = m;
        }
        if let Some(v) = self.enable_vacancy {
            params.enable_vacancy = v;
        }
        if let Some(s) = self.strict_preferences {
            params.strict_preferences = s;
        }
    }
}

/// SHA-256 of each input file's raw bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDigests {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params_sha256: Option<String>,
    pub applicants_sha256: String,
    pub shows_sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vacancy_sha256: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub params: Params,
    pub applicants: Vec<Applicant>,
    pub shows: Vec<Show>,
    pub opt_in: BTreeSet<ApplicantId>,
    /// False when no vacancy list was configured or the file was missing.
    pub vacancy_present: bool,
    pub dropped_preferences: Vec<DroppedPreference>,
    pub digests: InputDigests,
}

pub fn load_inputs(paths: &InputPaths, overrides: &ParamOverrides) -> Result<LoadedInputs, PipelineError> {
    let (mut params, params_sha256) = match &paths.params {
        Some(p) => {
            let loaded = load_params(p)?;
            (loaded.value, Some(loaded.sha256))
        }
        None => (Params::default(), None),
    };
    overrides.apply(&mut params);
    params.validate().map_err(|e| PipelineError::Validate(e.to_string()))?;

    let applicants = read_applicants(&paths.applicants, params.max_orders)?;
    let shows = read_shows(&paths.shows)?;

    let vacancy = match &paths.vacancy {
        Some(p) => {
            let v = read_vacancy(p)?;
            if v.is_none() {
                warn!(path = %p.display(), "vacancy list not found; treating as empty");
            }
            v
        }
        None => None,
    };
    let vacancy_present = vacancy.is_some();
    let (opt_in, vacancy_sha256) = match vacancy {
        Some(l) => (l.value, Some(l.sha256)),
        None => (BTreeSet::new(), None),
    };

    info!(
        applicants = applicants.value.applicants.len(),
        shows = shows.value.len(),
        opt_in = opt_in.len(),
        max_orders = params.max_orders,
        enable_vacancy = params.enable_vacancy,
        "inputs read"
    );

    Ok(LoadedInputs {
        params,
        applicants: applicants.value.applicants,
        shows: shows.value,
        opt_in,
        vacancy_present,
        dropped_preferences: applicants.value.dropped,
        digests: InputDigests {
            params_sha256,
            applicants_sha256: applicants.sha256,
            shows_sha256: shows.sha256,
            vacancy_sha256,
        },
    })
}
