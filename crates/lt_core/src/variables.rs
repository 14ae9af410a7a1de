//! Run parameters with safe defaults.
//!
//! Notes:
//! - `max_orders` is the fixed preference-list length, 1..=MAX_ORDERS_LIMIT.
//! - `enable_vacancy` gates the backfill pass over leftover seats.
//! - `seed` is optional here; the pipeline resolves a missing seed from the
//!   wall clock once and records the resolved value.
//! - `strict_preferences` turns unknown preference ids into a fatal error
//!   instead of a warning.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

pub const DEFAULT_MAX_ORDERS: u32 = 3;
/// Upper bound on preference-list length; one round runs per rank.
pub const MAX_ORDERS_LIMIT: u32 = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Params {
    pub max_orders: u32,
    pub enable_vacancy: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub seed: Option<u64>,
    pub strict_preferences: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_orders: DEFAULT_MAX_ORDERS,
            enable_vacancy: false,
            seed: None,
            strict_preferences: false,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_orders == 0 {
            return Err(CoreError::DomainOutOfRange("max_orders must be >= 1"));
        }
        if self.max_orders > MAX_ORDERS_LIMIT {
            return Err(CoreError::DomainOutOfRange("max_orders must be <= 64"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(Params::default().validate().is_ok());
    }

    #[test]
    fn zero_max_orders_is_rejected() {
        let p = Params { max_orders: 0, ..Params::default() };
        assert!(p.validate().is_err());
    }

    #[test]
    fn max_orders_has_an_upper_bound() {
        let at_limit = Params { max_orders: MAX_ORDERS_LIMIT, ..Params::default() };
        assert!(at_limit.validate().is_ok());
        let over = Params { max_orders: MAX_ORDERS_LIMIT + 1, ..Params::default() };
        assert_eq!(over.validate(), Err(CoreError::DomainOutOfRange("max_orders must be <= 64")));
        let huge = Params { max_orders: u32::MAX, ..Params::default() };
        assert!(huge.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_uses_defaults() {
        let p: Params = serde_json::from_str(r#"{"enable_vacancy":true}"#).unwrap();
        assert_eq!(p.max_orders, DEFAULT_MAX_ORDERS);
        assert!(p.enable_vacancy);
        assert_eq!(p.seed, None);
        assert!(serde_json::from_str::<Params>(r#"{"bogus":1}"#).is_err());
    }
}
