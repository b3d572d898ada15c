//! Doctor and patient registry: registration, lookup, name search,
//! partial update and guarded deletion.
//!
//! National IDs are unique across both tables. A doctor and a patient
//! cannot share one.

use rusqlite::Connection;
use uuid::Uuid;

use crate::assignment::{
    begin_write, ensure_doctor_unassigned, ensure_patient_unassigned, require_doctor,
    require_patient,
};
use crate::db::{self, DatabaseError};
use crate::error::CareError;
use crate::identifier::{parse_id, IdSubject};
use crate::models::*;
use crate::validation::{
    supplied, validate_doctor_patch, validate_new_doctor, validate_new_patient,
    validate_patient_patch, validate_search_term, Field, FieldErrorKind,
};

fn normalize_national_id(raw: &str) -> Result<NationalId, CareError> {
    NationalId::parse(raw).ok_or(CareError::Validation {
        field: Field::NationalId,
        kind: FieldErrorKind::Malformed,
    })
}

fn ensure_national_id_free(
    conn: &Connection,
    national_id: &NationalId,
    owner: Option<&Uuid>,
) -> Result<(), CareError> {
    if db::national_id_in_use(conn, national_id, owner)? {
        return Err(CareError::NationalIdTaken);
    }
    Ok(())
}

/// The per-table UNIQUE index on national_id is the last line for writers
/// that slipped past `ensure_national_id_free`.
fn national_id_conflict(err: DatabaseError) -> CareError {
    match err {
        DatabaseError::ConstraintViolation(_) => CareError::NationalIdTaken,
        other => other.into(),
    }
}

/// Copy `value` into `slot` when it differs. Returns whether it did.
fn set_if_changed(slot: &mut String, value: Option<&str>) -> bool {
    match value {
        Some(v) if v != slot.as_str() => {
            *slot = v.to_string();
            true
        }
        _ => false,
    }
}

// ── Doctors ──────────────────────────────────────────────────────────────

pub fn register_doctor(conn: &Connection, input: &NewDoctor) -> Result<Doctor, CareError> {
    validate_new_doctor(input)?;
    let national_id = normalize_national_id(&input.national_id)?;

    let tx = begin_write(conn)?;
    ensure_national_id_free(&tx, &national_id, None)?;

    let doctor = Doctor {
        id: Uuid::new_v4(),
        first_name: input.first_name.clone(),
        last_name: input.last_name.clone(),
        department: input.department.clone(),
        national_id,
    };
    db::insert_doctor(&tx, &doctor).map_err(national_id_conflict)?;
    tx.commit()?;

    tracing::info!(doctor_id = %doctor.id, department = %doctor.department, "Doctor registered");
    Ok(doctor)
}

pub fn get_doctor(conn: &Connection, raw_id: &str) -> Result<Doctor, CareError> {
    let id = parse_id(raw_id, IdSubject::Doctor)?;
    db::get_doctor(conn, &id)?.ok_or(CareError::DoctorNotFound(id))
}

/// Doctors whose first or last name starts with `prefix`, ignoring case.
pub fn search_doctors(conn: &Connection, prefix: &str) -> Result<Vec<Doctor>, CareError> {
    let prefix = validate_search_term(prefix)?;
    let doctors = db::search_doctors_by_name(conn, prefix)?;
    tracing::debug!(prefix, count = doctors.len(), "Doctor name search");
    Ok(doctors)
}

/// Apply the supplied, non-blank fields of `patch` that differ from the
/// stored doctor and return the result.
pub fn patch_doctor(conn: &Connection, raw_id: &str, patch: &DoctorPatch) -> Result<Doctor, CareError> {
    let id = parse_id(raw_id, IdSubject::Doctor)?;
    validate_doctor_patch(patch)?;

    let tx = begin_write(conn)?;
    let mut doctor = db::get_doctor(&tx, &id)?.ok_or(CareError::DoctorNotFound(id))?;

    let mut changed = Vec::new();
    if set_if_changed(&mut doctor.first_name, supplied(&patch.first_name)) {
        changed.push("first_name");
    }
    if set_if_changed(&mut doctor.last_name, supplied(&patch.last_name)) {
        changed.push("last_name");
    }
    if set_if_changed(&mut doctor.department, supplied(&patch.department)) {
        changed.push("department");
    }
    if let Some(raw) = supplied(&patch.national_id) {
        let national_id = normalize_national_id(raw)?;
        if national_id != doctor.national_id {
            ensure_national_id_free(&tx, &national_id, Some(&id))?;
            doctor.national_id = national_id;
            changed.push("national_id");
        }
    }

    if changed.is_empty() {
        return Ok(doctor);
    }
    db::update_doctor(&tx, &doctor).map_err(national_id_conflict)?;
    tx.commit()?;

    tracing::info!(doctor_id = %id, fields = ?changed, "Doctor updated");
    Ok(doctor)
}

/// Remove a doctor. Refused with `AssignedToPatient` while any of their
/// assignments is still open.
pub fn delete_doctor(conn: &Connection, raw_id: &str) -> Result<(), CareError> {
    let id = parse_id(raw_id, IdSubject::Doctor)?;

    let tx = begin_write(conn)?;
    require_doctor(&tx, &id)?;
    ensure_doctor_unassigned(&tx, &id)?;
    db::delete_doctor(&tx, &id)?;
    tx.commit()?;

    tracing::info!(doctor_id = %id, "Doctor deleted");
    Ok(())
}

// ── Patients ─────────────────────────────────────────────────────────────

pub fn register_patient(conn: &Connection, input: &NewPatient) -> Result<Patient, CareError> {
    validate_new_patient(input)?;
    let national_id = normalize_national_id(&input.national_id)?;

    let tx = begin_write(conn)?;
    ensure_national_id_free(&tx, &national_id, None)?;

    let patient = Patient {
        id: Uuid::new_v4(),
        first_name: input.first_name.clone(),
        last_name: input.last_name.clone(),
        national_id,
    };
    db::insert_patient(&tx, &patient).map_err(national_id_conflict)?;
    tx.commit()?;

    tracing::info!(patient_id = %patient.id, "Patient registered");
    Ok(patient)
}

pub fn get_patient(conn: &Connection, raw_id: &str) -> Result<Patient, CareError> {
    let id = parse_id(raw_id, IdSubject::Patient)?;
    db::get_patient(conn, &id)?.ok_or(CareError::PatientNotFound(id))
}

pub fn search_patients(conn: &Connection, prefix: &str) -> Result<Vec<Patient>, CareError> {
    let prefix = validate_search_term(prefix)?;
    let patients = db::search_patients_by_name(conn, prefix)?;
    tracing::debug!(prefix, count = patients.len(), "Patient name search");
    Ok(patients)
}

pub fn patch_patient(
    conn: &Connection,
    raw_id: &str,
    patch: &PatientPatch,
) -> Result<Patient, CareError> {
    let id = parse_id(raw_id, IdSubject::Patient)?;
    validate_patient_patch(patch)?;

    let tx = begin_write(conn)?;
    let mut patient = db::get_patient(&tx, &id)?.ok_or(CareError::PatientNotFound(id))?;

    let mut changed = Vec::new();
    if set_if_changed(&mut patient.first_name, supplied(&patch.first_name)) {
        changed.push("first_name");
    }
    if set_if_changed(&mut patient.last_name, supplied(&patch.last_name)) {
        changed.push("last_name");
    }
    if let Some(raw) = supplied(&patch.national_id) {
        let national_id = normalize_national_id(raw)?;
        if national_id != patient.national_id {
            ensure_national_id_free(&tx, &national_id, Some(&id))?;
            patient.national_id = national_id;
            changed.push("national_id");
        }
    }

    if changed.is_empty() {
        return Ok(patient);
    }
    db::update_patient(&tx, &patient).map_err(national_id_conflict)?;
    tx.commit()?;

    tracing::info!(patient_id = %id, fields = ?changed, "Patient updated");
    Ok(patient)
}

/// Remove a patient. Refused with `AssignedToDoctor` while any of their
/// assignments is still open.
pub fn delete_patient(conn: &Connection, raw_id: &str) -> Result<(), CareError> {
    let id = parse_id(raw_id, IdSubject::Patient)?;

    let tx = begin_write(conn)?;
    require_patient(&tx, &id)?;
    ensure_patient_unassigned(&tx, &id)?;
    db::delete_patient(&tx, &id)?;
    tx.commit()?;

    tracing::info!(patient_id = %id, "Patient deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::{assign, unassign};
    use crate::db::sqlite::open_memory_database;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn new_doctor(first: &str, last: &str, nid: &str) -> NewDoctor {
        NewDoctor {
            first_name: first.into(),
            last_name: last.into(),
            department: "Cardiology".into(),
            national_id: nid.into(),
        }
    }

    fn new_patient(first: &str, last: &str, nid: &str) -> NewPatient {
        NewPatient {
            first_name: first.into(),
            last_name: last.into(),
            national_id: nid.into(),
        }
    }

    #[test]
    fn register_normalizes_and_persists() {
        let conn = test_db();
        let doctor = register_doctor(&conn, &new_doctor("Meera", "Iyer", "234567890123")).unwrap();
        assert_eq!(doctor.national_id.as_str(), "2345 6789 0123");

        let loaded = get_doctor(&conn, &doctor.id.to_string()).unwrap();
        assert_eq!(loaded, doctor);
    }

    #[test]
    fn register_rejects_invalid_fields() {
        let conn = test_db();
        let err = register_patient(&conn, &new_patient("Arjun", "D4s", "334567890123")).unwrap_err();
        assert!(matches!(
            err,
            CareError::Validation {
                field: Field::LastName,
                kind: FieldErrorKind::Malformed
            }
        ));
    }

    #[test]
    fn national_id_unique_across_doctors_and_patients() {
        let conn = test_db();
        register_patient(&conn, &new_patient("Arjun", "Das", "334567890123")).unwrap();

        // Same digits, grouped form, different entity type
        let err = register_doctor(&conn, &new_doctor("Meera", "Iyer", "3345 6789 0123")).unwrap_err();
        assert!(matches!(err, CareError::NationalIdTaken));

        let err = register_patient(&conn, &new_patient("Bina", "Roy", "334567890123")).unwrap_err();
        assert!(matches!(err, CareError::NationalIdTaken));
    }

    #[test]
    fn get_unknown_and_malformed_ids() {
        let conn = test_db();
        let missing = Uuid::new_v4();
        assert!(matches!(
            get_patient(&conn, &missing.to_string()),
            Err(CareError::PatientNotFound(id)) if id == missing
        ));
        assert!(matches!(
            get_doctor(&conn, "not-a-uuid"),
            Err(CareError::InvalidIdentifierFormat { subject: IdSubject::Doctor, .. })
        ));
    }

    #[test]
    fn search_is_case_insensitive_prefix_on_either_name() {
        let conn = test_db();
        register_doctor(&conn, &new_doctor("Meera", "Iyer", "234567890123")).unwrap();
        register_doctor(&conn, &new_doctor("Ravi", "Menon", "534567890123")).unwrap();
        register_doctor(&conn, &new_doctor("Sunil", "Rao", "634567890123")).unwrap();

        let found = search_doctors(&conn, "ME").unwrap();
        let names: Vec<_> = found.iter().map(|d| d.first_name.as_str()).collect();
        assert_eq!(names, vec!["Meera", "Ravi"]);

        assert!(search_doctors(&conn, "zz").unwrap().is_empty());
        assert!(matches!(
            search_doctors(&conn, "  "),
            Err(CareError::Validation { field: Field::SearchTerm, .. })
        ));
    }

    #[test]
    fn search_patients_by_last_name() {
        let conn = test_db();
        register_patient(&conn, &new_patient("Arjun", "Das", "334567890123")).unwrap();
        register_patient(&conn, &new_patient("Bina", "Roy", "434567890123")).unwrap();

        let found = search_patients(&conn, "ro").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name, "Bina");
    }

    #[test]
    fn patch_applies_only_supplied_fields() {
        let conn = test_db();
        let doctor = register_doctor(&conn, &new_doctor("Meera", "Iyer", "234567890123")).unwrap();

        let patch = DoctorPatch {
            last_name: Some("Nair".into()),
            department: Some("  ".into()),
            ..DoctorPatch::default()
        };
        let updated = patch_doctor(&conn, &doctor.id.to_string(), &patch).unwrap();
        assert_eq!(updated.first_name, "Meera");
        assert_eq!(updated.last_name, "Nair");
        assert_eq!(updated.department, "Cardiology");
        assert_eq!(get_doctor(&conn, &doctor.id.to_string()).unwrap(), updated);
    }

    #[test]
    fn patch_keeping_own_national_id_is_allowed() {
        let conn = test_db();
        let patient = register_patient(&conn, &new_patient("Arjun", "Das", "334567890123")).unwrap();

        let patch = PatientPatch {
            national_id: Some("3345 6789 0123".into()),
            ..PatientPatch::default()
        };
        let unchanged = patch_patient(&conn, &patient.id.to_string(), &patch).unwrap();
        assert_eq!(unchanged, patient);
    }

    #[test]
    fn patch_to_taken_national_id_rejected() {
        let conn = test_db();
        register_doctor(&conn, &new_doctor("Meera", "Iyer", "234567890123")).unwrap();
        let patient = register_patient(&conn, &new_patient("Arjun", "Das", "334567890123")).unwrap();

        let patch = PatientPatch {
            national_id: Some("234567890123".into()),
            ..PatientPatch::default()
        };
        assert!(matches!(
            patch_patient(&conn, &patient.id.to_string(), &patch),
            Err(CareError::NationalIdTaken)
        ));
        assert_eq!(get_patient(&conn, &patient.id.to_string()).unwrap(), patient);
    }

    #[test]
    fn patch_validates_and_finds_target() {
        let conn = test_db();
        let doctor = register_doctor(&conn, &new_doctor("Meera", "Iyer", "234567890123")).unwrap();

        let bad = DoctorPatch {
            first_name: Some("M3era".into()),
            ..DoctorPatch::default()
        };
        assert!(matches!(
            patch_doctor(&conn, &doctor.id.to_string(), &bad),
            Err(CareError::Validation { field: Field::FirstName, .. })
        ));

        let good = DoctorPatch {
            first_name: Some("Mira".into()),
            ..DoctorPatch::default()
        };
        assert!(matches!(
            patch_doctor(&conn, &Uuid::new_v4().to_string(), &good),
            Err(CareError::DoctorNotFound(_))
        ));
    }

    #[test]
    fn delete_blocked_while_assigned() {
        let conn = test_db();
        let doctor = register_doctor(&conn, &new_doctor("Meera", "Iyer", "234567890123")).unwrap();
        let patient = register_patient(&conn, &new_patient("Arjun", "Das", "334567890123")).unwrap();
        let (d, p) = (doctor.id.to_string(), patient.id.to_string());

        assign(&conn, &d, &p).unwrap();
        assert!(matches!(delete_doctor(&conn, &d), Err(CareError::AssignedToPatient(_))));
        assert!(matches!(delete_patient(&conn, &p), Err(CareError::AssignedToDoctor(_))));
        assert!(conn.is_autocommit());

        unassign(&conn, &d, &p).unwrap();
        delete_doctor(&conn, &d).unwrap();
        delete_patient(&conn, &p).unwrap();
        assert!(matches!(get_doctor(&conn, &d), Err(CareError::DoctorNotFound(_))));
        assert!(matches!(get_patient(&conn, &p), Err(CareError::PatientNotFound(_))));
    }

    #[test]
    fn delete_unknown_is_not_found() {
        let conn = test_db();
        assert!(matches!(
            delete_patient(&conn, &Uuid::new_v4().to_string()),
            Err(CareError::PatientNotFound(_))
        ));
    }

    #[test]
    fn deleted_national_id_can_be_reused() {
        let conn = test_db();
        let doctor = register_doctor(&conn, &new_doctor("Meera", "Iyer", "234567890123")).unwrap();
        delete_doctor(&conn, &doctor.id.to_string()).unwrap();
        assert!(register_patient(&conn, &new_patient("Arjun", "Das", "234567890123")).is_ok());
    }
}
