use uuid::Uuid;

/// Equality / is-null filter over the assignments table.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssignmentFilter {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub active_only: bool,
}

impl AssignmentFilter {
    pub fn pair(doctor_id: Uuid, patient_id: Uuid) -> Self {
        Self {
            doctor_id: Some(doctor_id),
            patient_id: Some(patient_id),
            active_only: false,
        }
    }

    pub fn active_for_doctor(doctor_id: Uuid) -> Self {
        Self {
            doctor_id: Some(doctor_id),
            patient_id: None,
            active_only: true,
        }
    }

    pub fn active_for_patient(patient_id: Uuid) -> Self {
        Self {
            doctor_id: None,
            patient_id: Some(patient_id),
            active_only: true,
        }
    }

    pub fn active(self) -> Self {
        Self {
            active_only: true,
            ..self
        }
    }
}
