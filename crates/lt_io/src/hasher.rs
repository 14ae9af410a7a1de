//! crates/lt_io/src/hasher.rs
//!
//! SHA-256 digests and artifact ids.
//!
//! - `sha256_canonical(..)` hashes the canonical JSON bytes of a value.
//! - `sha256_hex(..)` hashes raw bytes.
//! - `RES:<hex>` ids come from canonical result bytes; `RUN:<ts>-<hex>` ids
//!   pair the run timestamp with the canonical run-record hash.
//!
//! Hex is always lowercase.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_bytes;
use crate::{IoError, IoResult};

/// SHA-256 over raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over the canonical JSON bytes of `value`.
pub fn sha256_canonical<T: Serialize>(value: &T) -> IoResult<String> {
    Ok(sha256_hex(&to_canonical_bytes(value)?))
}

pub fn res_id(hex64: &str) -> IoResult<String> {
    check_hex64(hex64)?;
    Ok(format!("RES:{hex64}"))
}

/// `RUN:<ts>-<hex>`; `ts` is expected already normalized to RFC3339 UTC.
pub fn run_id(timestamp_utc: &str, hex64: &str) -> IoResult<String> {
    check_hex64(hex64)?;
    if timestamp_utc.is_empty() || !timestamp_utc.ends_with('Z') {
        return Err(IoError::Hash(format!("timestamp must be RFC3339 UTC with Z: {timestamp_utc:?}")));
    }
    Ok(format!("RUN:{timestamp_utc}-{hex64}"))
}

fn check_hex64(s: &str) -> IoResult<()> {
    if s.len() == 64 && s.bytes().all(|c| matches!(c, b'0'..=b'9' | b'a'..=b'f')) {
        Ok(())
    } else {
        Err(IoError::Hash(format!("expected lowercase 64-hex, got {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_input_digest() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn canonical_hash_ignores_key_order() {
        let a = sha256_canonical(&json!({"a": 1, "b": [1, 2]})).unwrap();
        let b = sha256_canonical(&json!({"b": [1, 2], "a": 1})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn ids_check_their_inputs() {
        let h = sha256_hex(b"x");
        assert_eq!(res_id(&h).unwrap(), format!("RES:{h}"));
        assert_eq!(run_id("2026-01-02T03:04:05Z", &h).unwrap(), format!("RUN:2026-01-02T03:04:05Z-{h}"));
        assert!(res_id("ABC").is_err());
        assert!(run_id("2026-01-02 03:04:05", &h).is_err());
    }
}
