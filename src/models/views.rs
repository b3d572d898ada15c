use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Doctor, Patient};

/// A patient on a doctor's active list, stamped with when that
/// particular relationship began.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedPatient {
    #[serde(flatten)]
    pub patient: Patient,
    pub assignment_id: Uuid,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedDoctor {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub assignment_id: Uuid,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorWithPatients {
    pub doctor: Doctor,
    pub patients: Vec<AssignedPatient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientWithDoctors {
    pub patient: Patient,
    pub doctors: Vec<AssignedDoctor>,
}
