//! Domain error taxonomy shared by the registry, the assignment engine and
//! the aggregation reader.
//!
//! Each variant is a fixed kind with a stable [`CareError::code`]. Wording
//! shown to API clients is chosen in `api::error`, not here.

use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::identifier::IdSubject;
use crate::validation::{Field, FieldErrorKind};

#[derive(Debug, Error)]
pub enum CareError {
    #[error("Invalid {subject} identifier: {value:?}")]
    InvalidIdentifierFormat { subject: IdSubject, value: String },

    #[error("Invalid {field}: {kind}")]
    Validation { field: Field, kind: FieldErrorKind },

    #[error("Doctor not found: {0}")]
    DoctorNotFound(Uuid),

    #[error("Patient not found: {0}")]
    PatientNotFound(Uuid),

    #[error("Doctor {doctor_id} is already assigned to patient {patient_id}")]
    DoctorAlreadyAssigned { doctor_id: Uuid, patient_id: Uuid },

    #[error("No assignment exists")]
    NoAssignmentExists,

    #[error("Doctor {doctor_id} is already unassigned from patient {patient_id}")]
    DoctorAlreadyUnassigned { doctor_id: Uuid, patient_id: Uuid },

    #[error("Doctor {0} is assigned to a patient")]
    AssignedToPatient(Uuid),

    #[error("Patient {0} is assigned to a doctor")]
    AssignedToDoctor(Uuid),

    #[error("National ID is already registered")]
    NationalIdTaken,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl CareError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifierFormat { .. } => "INVALID_IDENTIFIER",
            Self::Validation { .. } => "VALIDATION_FAILED",
            Self::DoctorNotFound(_) => "DOCTOR_NOT_FOUND",
            Self::PatientNotFound(_) => "PATIENT_NOT_FOUND",
            Self::DoctorAlreadyAssigned { .. } => "DOCTOR_ALREADY_ASSIGNED",
            Self::NoAssignmentExists => "NO_ASSIGNMENT_EXISTS",
            Self::DoctorAlreadyUnassigned { .. } => "DOCTOR_ALREADY_UNASSIGNED",
            Self::AssignedToPatient(_) => "DOCTOR_ASSIGNED_TO_PATIENT",
            Self::AssignedToDoctor(_) => "PATIENT_ASSIGNED_TO_DOCTOR",
            Self::NationalIdTaken => "NATIONAL_ID_TAKEN",
            Self::Database(_) => "INTERNAL",
        }
    }
}

impl From<rusqlite::Error> for CareError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(DatabaseError::from(err))
    }
}
