//! 12-digit national identity number, always held in grouped display form.

use std::fmt;

use serde::{Deserialize, Serialize};

const DIGITS: usize = 12;

/// A validated national ID rendered as `XXXX XXXX XXXX`.
///
/// Construction goes through [`NationalId::parse`], so every value in the
/// system is normalised and two IDs compare equal iff their digits match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NationalId(String);

impl NationalId {
    /// Accepts 12 digits (first digit 2-9), either bare or already grouped
    /// as `XXXX XXXX XXXX`. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let digits: String = if trimmed.len() == DIGITS + 2 {
            let bytes = trimmed.as_bytes();
            if bytes[4] != b' ' || bytes[9] != b' ' {
                return None;
            }
            trimmed.split(' ').collect()
        } else {
            trimmed.to_string()
        };

        if digits.len() != DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if matches!(digits.as_bytes()[0], b'0' | b'1') {
            return None;
        }

        Some(Self(format!(
            "{} {} {}",
            &digits[0..4],
            &digits[4..8],
            &digits[8..12]
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for NationalId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid national id: {value}"))
    }
}

impl From<NationalId> for String {
    fn from(id: NationalId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_digits_are_grouped() {
        let id = NationalId::parse("234567890123").unwrap();
        assert_eq!(id.as_str(), "2345 6789 0123");
    }

    #[test]
    fn grouped_form_is_accepted_unchanged() {
        let id = NationalId::parse("2345 6789 0123").unwrap();
        assert_eq!(id, NationalId::parse("234567890123").unwrap());
    }

    #[test]
    fn leading_zero_or_one_rejected() {
        assert!(NationalId::parse("034567890123").is_none());
        assert!(NationalId::parse("134567890123").is_none());
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(NationalId::parse("23456789012").is_none());
        assert!(NationalId::parse("2345678901234").is_none());
        assert!(NationalId::parse("").is_none());
    }

    #[test]
    fn non_digits_rejected() {
        assert!(NationalId::parse("23456789012a").is_none());
        assert!(NationalId::parse("2345-6789-0123").is_none());
        assert!(NationalId::parse("23456 789 0123").is_none());
    }

    #[test]
    fn serde_uses_grouped_string() {
        let id = NationalId::parse("987654321098").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"9876 5432 1098\"");
        let back: NationalId = serde_json::from_str("\"987654321098\"").unwrap();
        assert_eq!(back, id);
    }
}
