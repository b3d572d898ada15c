//! Doctor-patient assignment engine.
//!
//! Each (doctor, patient) pair is either Unassigned (no record, or only
//! closed records) or Assigned (exactly one active record). `assign` and
//! `unassign` are the only transitions. Both run inside an IMMEDIATE
//! transaction so the state check and the write see the same snapshot,
//! and the store's unique partial index on active rows backs that up for
//! writers on other connections.

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::error::CareError;
use crate::identifier::{parse_id, IdSubject};
use crate::models::{Assignment, AssignmentFilter};

/// Wall clock at the precision the store keeps.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn require_doctor(conn: &Connection, id: &Uuid) -> Result<(), CareError> {
    if db::doctor_exists(conn, id)? {
        Ok(())
    } else {
        Err(CareError::DoctorNotFound(*id))
    }
}

pub(crate) fn require_patient(conn: &Connection, id: &Uuid) -> Result<(), CareError> {
    if db::patient_exists(conn, id)? {
        Ok(())
    } else {
        Err(CareError::PatientNotFound(*id))
    }
}

fn parse_pair(raw_doctor_id: &str, raw_patient_id: &str) -> Result<(Uuid, Uuid), CareError> {
    let doctor_id = parse_id(raw_doctor_id, IdSubject::Doctor)?;
    let patient_id = parse_id(raw_patient_id, IdSubject::Patient)?;
    Ok((doctor_id, patient_id))
}

pub(crate) fn begin_write(conn: &Connection) -> Result<Transaction<'_>, CareError> {
    Ok(Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?)
}

/// Start an assignment between a doctor and a patient.
///
/// Fails with `DoctorAlreadyAssigned` while an earlier assignment of the
/// same pair is still open.
pub fn assign(
    conn: &Connection,
    raw_doctor_id: &str,
    raw_patient_id: &str,
) -> Result<Assignment, CareError> {
    let (doctor_id, patient_id) = parse_pair(raw_doctor_id, raw_patient_id)?;

    let tx = begin_write(conn)?;
    require_doctor(&tx, &doctor_id)?;
    require_patient(&tx, &patient_id)?;

    let already_assigned = CareError::DoctorAlreadyAssigned {
        doctor_id,
        patient_id,
    };
    if db::assignment_exists(&tx, &AssignmentFilter::pair(doctor_id, patient_id).active())? {
        return Err(already_assigned);
    }

    let assignment = Assignment::open(doctor_id, patient_id, now());
    match db::insert_assignment(&tx, &assignment) {
        Ok(()) => {}
        Err(DatabaseError::ConstraintViolation(detail)) => {
            tracing::warn!(%doctor_id, %patient_id, %detail, "Concurrent assignment rejected by store");
            return Err(already_assigned);
        }
        Err(e) => return Err(e.into()),
    }
    tx.commit()?;

    tracing::info!(
        assignment_id = %assignment.id,
        %doctor_id,
        %patient_id,
        "Doctor assigned to patient"
    );
    Ok(assignment)
}

/// Close the open assignment of a pair and return the closed record.
pub fn unassign(
    conn: &Connection,
    raw_doctor_id: &str,
    raw_patient_id: &str,
) -> Result<Assignment, CareError> {
    let (doctor_id, patient_id) = parse_pair(raw_doctor_id, raw_patient_id)?;

    let tx = begin_write(conn)?;
    require_doctor(&tx, &doctor_id)?;
    require_patient(&tx, &patient_id)?;

    let pair = AssignmentFilter::pair(doctor_id, patient_id);
    if !db::assignment_exists(&tx, &pair)? {
        return Err(CareError::NoAssignmentExists);
    }

    let already_unassigned = || CareError::DoctorAlreadyUnassigned {
        doctor_id,
        patient_id,
    };
    let active = db::find_assignment(&tx, &pair.active())?.ok_or_else(already_unassigned)?;
    let until = now();
    let state = active.state.close(until).ok_or_else(already_unassigned)?;

    if !db::close_assignment(&tx, &active.id, &until)? {
        return Err(already_unassigned());
    }
    tx.commit()?;

    tracing::info!(
        assignment_id = %active.id,
        %doctor_id,
        %patient_id,
        "Doctor unassigned from patient"
    );
    Ok(Assignment { state, ..active })
}

pub(crate) fn active_for_doctor(conn: &Connection, doctor_id: &Uuid) -> Result<Vec<Assignment>, CareError> {
    let active = db::list_assignments(conn, &AssignmentFilter::active_for_doctor(*doctor_id))?;
    if active.is_empty() {
        return Err(CareError::NoAssignmentExists);
    }
    Ok(active)
}

pub(crate) fn active_for_patient(conn: &Connection, patient_id: &Uuid) -> Result<Vec<Assignment>, CareError> {
    let active = db::list_assignments(conn, &AssignmentFilter::active_for_patient(*patient_id))?;
    if active.is_empty() {
        return Err(CareError::NoAssignmentExists);
    }
    Ok(active)
}

/// Open assignments of a doctor, oldest first.
///
/// An existing doctor with no open assignment yields `NoAssignmentExists`
/// rather than an empty list.
pub fn active_assignments_for_doctor(
    conn: &Connection,
    raw_doctor_id: &str,
) -> Result<Vec<Assignment>, CareError> {
    let doctor_id = parse_id(raw_doctor_id, IdSubject::Doctor)?;
    require_doctor(conn, &doctor_id)?;
    active_for_doctor(conn, &doctor_id)
}

pub fn active_assignments_for_patient(
    conn: &Connection,
    raw_patient_id: &str,
) -> Result<Vec<Assignment>, CareError> {
    let patient_id = parse_id(raw_patient_id, IdSubject::Patient)?;
    require_patient(conn, &patient_id)?;
    active_for_patient(conn, &patient_id)
}

/// One assignment record by id, open or closed.
pub fn get_assignment(conn: &Connection, raw_id: &str) -> Result<Assignment, CareError> {
    let id = parse_id(raw_id, IdSubject::Assignment)?;
    db::get_assignment(conn, &id)?.ok_or(CareError::NoAssignmentExists)
}

/// Every record for the pair, open and closed, oldest first.
pub fn assignment_history(
    conn: &Connection,
    raw_doctor_id: &str,
    raw_patient_id: &str,
) -> Result<Vec<Assignment>, CareError> {
    let (doctor_id, patient_id) = parse_pair(raw_doctor_id, raw_patient_id)?;
    require_doctor(conn, &doctor_id)?;
    require_patient(conn, &patient_id)?;
    Ok(db::list_assignments(conn, &AssignmentFilter::pair(doctor_id, patient_id))?)
}

/// Deletion guard: a doctor with an open assignment cannot be removed.
pub fn ensure_doctor_unassigned(conn: &Connection, doctor_id: &Uuid) -> Result<(), CareError> {
    if db::assignment_exists(conn, &AssignmentFilter::active_for_doctor(*doctor_id))? {
        return Err(CareError::AssignedToPatient(*doctor_id));
    }
    Ok(())
}

/// Deletion guard: a patient with an open assignment cannot be removed.
pub fn ensure_patient_unassigned(conn: &Connection, patient_id: &Uuid) -> Result<(), CareError> {
    if db::assignment_exists(conn, &AssignmentFilter::active_for_patient(*patient_id))? {
        return Err(CareError::AssignedToDoctor(*patient_id));
    }
    Ok(())
}
