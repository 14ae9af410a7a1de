//! RESOLVE_SEED: pick the run seed once, before the draw RNG exists.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedSource {
    Configured,
    Clock,
}

impl SeedSource {
    pub fn as_str(self) -> &'static str {
        match self {
            SeedSource::Configured => "configured",
            SeedSource::Clock => "clock",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSeed {
    pub value: u64,
    pub source: SeedSource,
}

/// Configured seed, else wall-clock milliseconds since the epoch.
pub fn resolve_seed(configured: Option<u64>) -> ResolvedSeed {
    resolve_seed_with(configured, || chrono::Utc::now().timestamp_millis().max(0) as u64)
}

pub fn resolve_seed_with<F: FnOnce() -> u64>(configured: Option<u64>, clock_ms: F) -> ResolvedSeed {
    match configured {
        Some(value) => ResolvedSeed { value, source: SeedSource::Configured },
        None => ResolvedSeed { value: clock_ms(), source: SeedSource::Clock },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_seed_does_not_read_clock() {
        let s = resolve_seed_with(Some(5), || panic!("clock read"));
        assert_eq!(s, ResolvedSeed { value: 5, source: SeedSource::Configured });
    }

    #[test]
    fn missing_seed_comes_from_clock() {
        let s = resolve_seed_with(None, || 1_700_000_000_123);
        assert_eq!(s.value, 1_700_000_000_123);
        assert_eq!(s.source, SeedSource::Clock);
    }

    #[test]
    fn source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SeedSource::Clock).unwrap(), r#""clock""#);
    }
}
