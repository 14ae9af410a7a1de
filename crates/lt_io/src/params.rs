//! Parameter file loading (`params.json`).
//!
//! Unknown keys are rejected; missing keys take `Params::default()` values.

use std::fs;
use std::path::Path;

use lt_core::Params;

use crate::hasher::sha256_hex;
use crate::records::Loaded;
use crate::{IoError, IoResult};

pub fn load_params(path: &Path) -> IoResult<Loaded<Params>> {
    let bytes = fs::read(path).map_err(|source| IoError::Read { path: path.display().to_string(), source })?;
    let value = parse_params(&bytes)?;
    Ok(Loaded { value, sha256: sha256_hex(&bytes) })
}

pub fn parse_params(bytes: &[u8]) -> IoResult<Params> {
    let params: Params = serde_json::from_slice(bytes)?;
    params.validate().map_err(|e| IoError::Json { pointer: "/max_orders".into(), msg: e.to_string() })?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let p = parse_params(br#"{"seed": 42}"#).unwrap();
        assert_eq!(p.seed, Some(42));
        assert_eq!(p.max_orders, lt_core::variables::DEFAULT_MAX_ORDERS);
        assert!(!p.enable_vacancy);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_params(br#"{"max_order": 2}"#).unwrap_err();
        assert!(err.to_string().contains("max_order"), "{err}");
    }

    #[test]
    fn zero_orders_is_rejected() {
        let err = parse_params(br#"{"max_orders": 0}"#).unwrap_err();
        assert!(matches!(err, IoError::Json { ref pointer, .. } if pointer == "/max_orders"));
    }
}
