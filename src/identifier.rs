//! Parsing of externally supplied identifiers into `Uuid` keys.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::error::CareError;

/// Canonical hyphenated layout: 8-4-4-4-12.
const CANONICAL_LEN: usize = 36;
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// Which record an identifier is supposed to refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdSubject {
    Doctor,
    Patient,
    Assignment,
}

impl fmt::Display for IdSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Doctor => "doctor",
            Self::Patient => "patient",
            Self::Assignment => "assignment",
        })
    }
}

/// Parse a 36-character canonical UUID string.
///
/// `Uuid::parse_str` also accepts simple, braced and URN forms; those are
/// rejected here so that only one spelling of a key ever reaches the store.
pub fn parse_id(raw: &str, subject: IdSubject) -> Result<Uuid, CareError> {
    let invalid = || CareError::InvalidIdentifierFormat {
        subject,
        value: raw.to_string(),
    };

    if raw.len() != CANONICAL_LEN {
        return Err(invalid());
    }
    let well_formed = raw.bytes().enumerate().all(|(i, b)| {
        if HYPHEN_POSITIONS.contains(&i) {
            b == b'-'
        } else {
            b.is_ascii_hexdigit()
        }
    });
    if !well_formed {
        return Err(invalid());
    }

    Uuid::parse_str(raw).map_err(|_| invalid())
}
