//! crates/lt_core/src/ids.rs
//! Token ids for applicants and shows.
//! Deterministic, ASCII-only, strict shapes; no I/O.

use core::borrow::Borrow;
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::IdError;

const TOKEN_MAX_LEN: usize = 64;

/// Quickly verify ASCII (no NUL).
#[inline]
fn is_ascii_no_nul(s: &str) -> bool {
    !s.as_bytes().iter().any(|&b| b == 0 || b > 0x7F)
}

/// Token shape: ^[A-Za-z0-9_.:-]{1,64}$ (ASCII only)
#[inline]
pub fn is_valid_token(s: &str) -> bool {
    check_token(s).is_ok()
}

fn check_token(s: &str) -> Result<(), IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }
    if !is_ascii_no_nul(s) {
        return Err(IdError::NonAscii);
    }
    if s.len() > TOKEN_MAX_LEN {
        return Err(IdError::TooLong);
    }
    let ok = s.bytes().all(|b| {
        b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b':' || b == b'-'
    });
    if ok { Ok(()) } else { Err(IdError::BadShape) }
}

macro_rules! token_newtype {
    ($(#[$m:meta])* $name:ident) => {
        $(#[$m])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
        pub struct $name(String);

        impl $name {
            #[inline] pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl FromStr for $name {
            type Err = IdError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                check_token(s)?;
                Ok($name(s.to_owned()))
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdError;
            #[inline]
            fn try_from(value: &str) -> Result<Self, Self::Error> { value.parse() }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;
            fn try_from(value: String) -> Result<Self, Self::Error> {
                check_token(&value)?;
                Ok($name(value))
            }
        }

        impl From<$name> for String {
            #[inline]
            fn from(id: $name) -> String { id.0 }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str { &self.0 }
        }

        impl Borrow<str> for $name {
            #[inline]
            fn borrow(&self) -> &str { &self.0 }
        }
    }
}

token_newtype!(
    /// Applicant token: ^[A-Za-z0-9_.:-]{1,64}$
    ApplicantId
);
token_newtype!(
    /// Show token: ^[A-Za-z0-9_.:-]{1,64}$
    ShowId
);
