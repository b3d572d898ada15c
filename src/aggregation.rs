//! Composite read views: a doctor with the patients they currently treat,
//! and a patient with the doctors currently treating them.
//!
//! Joined in-process: the active assignments of the root record are read
//! first, then the counterpart records are fetched in one batched lookup
//! and matched back by id. Each entry carries the start time of its own
//! assignment.

use std::collections::HashMap;

use rusqlite::Connection;
use uuid::Uuid;

use crate::assignment::{active_for_doctor, active_for_patient};
use crate::db;
use crate::error::CareError;
use crate::identifier::{parse_id, IdSubject};
use crate::models::*;

pub fn doctor_with_active_patients(
    conn: &Connection,
    raw_doctor_id: &str,
) -> Result<DoctorWithPatients, CareError> {
    let doctor_id = parse_id(raw_doctor_id, IdSubject::Doctor)?;
    let doctor = db::get_doctor(conn, &doctor_id)?.ok_or(CareError::DoctorNotFound(doctor_id))?;
    let active = active_for_doctor(conn, &doctor_id)?;

    let ids: Vec<Uuid> = active.iter().map(|a| a.patient_id).collect();
    let mut by_id: HashMap<Uuid, Patient> = db::get_patients_by_ids(conn, &ids)?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let patients = active
        .into_iter()
        .filter_map(|a| match by_id.remove(&a.patient_id) {
            Some(patient) => Some(AssignedPatient {
                patient,
                assignment_id: a.id,
                assigned_at: a.state.assigned_at(),
            }),
            None => {
                tracing::warn!(
                    assignment_id = %a.id,
                    patient_id = %a.patient_id,
                    "Active assignment references a missing patient"
                );
                None
            }
        })
        .collect::<Vec<_>>();

    if patients.is_empty() {
        return Err(CareError::NoAssignmentExists);
    }

    tracing::debug!(%doctor_id, count = patients.len(), "Built doctor roster");
    Ok(DoctorWithPatients { doctor, patients })
}

pub fn patient_with_active_doctors(
    conn: &Connection,
    raw_patient_id: &str,
) -> Result<PatientWithDoctors, CareError> {
    let patient_id = parse_id(raw_patient_id, IdSubject::Patient)?;
    let patient =
        db::get_patient(conn, &patient_id)?.ok_or(CareError::PatientNotFound(patient_id))?;
    let active = active_for_patient(conn, &patient_id)?;

    let ids: Vec<Uuid> = active.iter().map(|a| a.doctor_id).collect();
    let mut by_id: HashMap<Uuid, Doctor> = db::get_doctors_by_ids(conn, &ids)?
        .into_iter()
        .map(|d| (d.id, d))
        .collect();

    let doctors = active
        .into_iter()
        .filter_map(|a| match by_id.remove(&a.doctor_id) {
            Some(doctor) => Some(AssignedDoctor {
                doctor,
                assignment_id: a.id,
                assigned_at: a.state.assigned_at(),
            }),
            None => {
                tracing::warn!(
                    assignment_id = %a.id,
                    doctor_id = %a.doctor_id,
                    "Active assignment references a missing doctor"
                );
                None
            }
        })
        .collect::<Vec<_>>();

    if doctors.is_empty() {
        return Err(CareError::NoAssignmentExists);
    }

    tracing::debug!(%patient_id, count = doctors.len(), "Built patient care team");
    Ok(PatientWithDoctors { patient, doctors })
}
