use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::national_id::NationalId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub national_id: NationalId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_id: Option<String>,
}
