//! Declarative field rules for doctor and patient input.
//!
//! Each entity has one static table of `(field, predicate, error kind)`
//! rows. Registration checks every row; a patch checks only the rows whose
//! field was supplied with a non-blank value.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::CareError;
use crate::models::{DoctorPatch, NationalId, NewDoctor, NewPatient, PatientPatch};

static ALPHABETIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    Department,
    NationalId,
    SearchTerm,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FirstName => "first name",
            Self::LastName => "last name",
            Self::Department => "department",
            Self::NationalId => "national ID",
            Self::SearchTerm => "search term",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// Empty or whitespace-only.
    Missing,
    /// Present but not in the accepted format.
    Malformed,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Missing => "must not be empty",
            Self::Malformed => "has an invalid format",
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Predicate {
    NonBlank,
    Alphabetic,
    NationalIdDigits,
}

impl Predicate {
    fn holds(self, value: &str) -> bool {
        match self {
            Self::NonBlank => !value.trim().is_empty(),
            Self::Alphabetic => ALPHABETIC.is_match(value),
            Self::NationalIdDigits => NationalId::parse(value).is_some(),
        }
    }
}

type Rule = (Field, Predicate, FieldErrorKind);

const DOCTOR_RULES: &[Rule] = &[
    (Field::FirstName, Predicate::NonBlank, FieldErrorKind::Missing),
    (Field::FirstName, Predicate::Alphabetic, FieldErrorKind::Malformed),
    (Field::LastName, Predicate::NonBlank, FieldErrorKind::Missing),
    (Field::LastName, Predicate::Alphabetic, FieldErrorKind::Malformed),
    (Field::Department, Predicate::NonBlank, FieldErrorKind::Missing),
    (Field::NationalId, Predicate::NonBlank, FieldErrorKind::Missing),
    (Field::NationalId, Predicate::NationalIdDigits, FieldErrorKind::Malformed),
];

const PATIENT_RULES: &[Rule] = &[
    (Field::FirstName, Predicate::NonBlank, FieldErrorKind::Missing),
    (Field::FirstName, Predicate::Alphabetic, FieldErrorKind::Malformed),
    (Field::LastName, Predicate::NonBlank, FieldErrorKind::Missing),
    (Field::LastName, Predicate::Alphabetic, FieldErrorKind::Malformed),
    (Field::NationalId, Predicate::NonBlank, FieldErrorKind::Missing),
    (Field::NationalId, Predicate::NationalIdDigits, FieldErrorKind::Malformed),
];

/// Run `rules` in order against the values `lookup` yields. Fields for
/// which `lookup` returns `None` are skipped.
fn check<'a>(rules: &[Rule], lookup: impl Fn(Field) -> Option<&'a str>) -> Result<(), CareError> {
    for &(field, predicate, kind) in rules {
        let Some(value) = lookup(field) else {
            continue;
        };
        if !predicate.holds(value) {
            return Err(CareError::Validation { field, kind });
        }
    }
    Ok(())
}

/// A patch value counts only when present and non-blank.
pub(crate) fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

pub fn validate_new_doctor(input: &NewDoctor) -> Result<(), CareError> {
    check(DOCTOR_RULES, move |field| match field {
        Field::FirstName => Some(input.first_name.as_str()),
        Field::LastName => Some(input.last_name.as_str()),
        Field::Department => Some(input.department.as_str()),
        Field::NationalId => Some(input.national_id.as_str()),
        Field::SearchTerm => None,
    })
}

pub fn validate_doctor_patch(patch: &DoctorPatch) -> Result<(), CareError> {
    check(DOCTOR_RULES, move |field| match field {
        Field::FirstName => supplied(&patch.first_name),
        Field::LastName => supplied(&patch.last_name),
        Field::Department => supplied(&patch.department),
        Field::NationalId => supplied(&patch.national_id),
        Field::SearchTerm => None,
    })
}

pub fn validate_new_patient(input: &NewPatient) -> Result<(), CareError> {
    check(PATIENT_RULES, move |field| match field {
        Field::FirstName => Some(input.first_name.as_str()),
        Field::LastName => Some(input.last_name.as_str()),
        Field::NationalId => Some(input.national_id.as_str()),
        Field::Department | Field::SearchTerm => None,
    })
}

pub fn validate_patient_patch(patch: &PatientPatch) -> Result<(), CareError> {
    check(PATIENT_RULES, move |field| match field {
        Field::FirstName => supplied(&patch.first_name),
        Field::LastName => supplied(&patch.last_name),
        Field::NationalId => supplied(&patch.national_id),
        Field::Department | Field::SearchTerm => None,
    })
}

/// Name searches need at least one non-blank character.
pub fn validate_search_term(term: &str) -> Result<&str, CareError> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        return Err(CareError::Validation {
            field: Field::SearchTerm,
            kind: FieldErrorKind::Missing,
        });
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor() -> NewDoctor {
        NewDoctor {
            first_name: "Meera".into(),
            last_name: "Iyer".into(),
            department: "Cardiology".into(),
            national_id: "234567890123".into(),
        }
    }

    fn patient() -> NewPatient {
        NewPatient {
            first_name: "Arjun".into(),
            last_name: "Das".into(),
            national_id: "345678901234".into(),
        }
    }

    fn assert_field_error(result: Result<(), CareError>, field: Field, kind: FieldErrorKind) {
        match result {
            Err(CareError::Validation { field: f, kind: k }) => {
                assert_eq!((f, k), (field, kind));
            }
            other => panic!("expected {field} {kind:?}, got {other:?}"),
        }
    }

    #[test]
    fn valid_doctor_passes() {
        assert!(validate_new_doctor(&doctor()).is_ok());
    }

    #[test]
    fn empty_first_name_is_missing_not_malformed() {
        let input = NewDoctor {
            first_name: String::new(),
            ..doctor()
        };
        assert_field_error(validate_new_doctor(&input), Field::FirstName, FieldErrorKind::Missing);
    }

    #[test]
    fn digits_in_last_name_malformed() {
        let input = NewDoctor {
            last_name: "Iyer2".into(),
            ..doctor()
        };
        assert_field_error(validate_new_doctor(&input), Field::LastName, FieldErrorKind::Malformed);
    }

    #[test]
    fn blank_department_missing() {
        let input = NewDoctor {
            department: "   ".into(),
            ..doctor()
        };
        assert_field_error(validate_new_doctor(&input), Field::Department, FieldErrorKind::Missing);
    }

    #[test]
    fn bad_national_id_malformed() {
        let input = NewPatient {
            national_id: "123456789012".into(),
            ..patient()
        };
        assert_field_error(validate_new_patient(&input), Field::NationalId, FieldErrorKind::Malformed);
    }

    #[test]
    fn rules_run_in_table_order() {
        let input = NewPatient {
            first_name: "A1".into(),
            last_name: String::new(),
            national_id: String::new(),
        };
        assert_field_error(validate_new_patient(&input), Field::FirstName, FieldErrorKind::Malformed);
    }

    #[test]
    fn patch_skips_absent_and_blank_fields() {
        let patch = DoctorPatch {
            first_name: None,
            last_name: Some("  ".into()),
            department: Some("Neurology".into()),
            national_id: None,
        };
        assert!(validate_doctor_patch(&patch).is_ok());
    }

    #[test]
    fn patch_checks_supplied_fields() {
        let patch = PatientPatch {
            national_id: Some("99".into()),
            ..PatientPatch::default()
        };
        assert_field_error(validate_patient_patch(&patch), Field::NationalId, FieldErrorKind::Malformed);
    }

    #[test]
    fn search_term_trimmed_and_required() {
        assert_eq!(validate_search_term("  me ").unwrap(), "me");
        assert!(validate_search_term("   ").is_err());
    }
}
