use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::national_id::NationalId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub national_id: NationalId,
}

/// Registration payload. Fields are raw user input until validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewDoctor {
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub national_id: String,
}

/// Partial update. Absent or blank fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
    pub national_id: Option<String>,
}
