use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

/// The single storage-level definition of "active".
pub(crate) const ACTIVE_PREDICATE: &str = "unassigned_at IS NULL";

const ASSIGNMENT_COLUMNS: &str = "id, doctor_id, patient_id, assigned_at, unassigned_at";

struct AssignmentRow {
    id: String,
    doctor_id: String,
    patient_id: String,
    assigned_at: String,
    unassigned_at: Option<String>,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AssignmentRow> {
    Ok(AssignmentRow {
        id: row.get(0)?,
        doctor_id: row.get(1)?,
        patient_id: row.get(2)?,
        assigned_at: row.get(3)?,
        unassigned_at: row.get(4)?,
    })
}

fn assignment_from_row(row: AssignmentRow) -> Result<Assignment, DatabaseError> {
    let assigned_at = parse_timestamp("assignments.assigned_at", &row.assigned_at)?;
    let unassigned_at = row
        .unassigned_at
        .as_deref()
        .map(|ts| parse_timestamp("assignments.unassigned_at", ts))
        .transpose()?;

    Ok(Assignment {
        id: parse_uuid("assignments.id", &row.id)?,
        doctor_id: parse_uuid("assignments.doctor_id", &row.doctor_id)?,
        patient_id: parse_uuid("assignments.patient_id", &row.patient_id)?,
        state: AssignmentState::from_timestamps(assigned_at, unassigned_at),
    })
}

/// WHERE clause and bound values for a filter.
fn filter_clause(filter: &AssignmentFilter) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut values = Vec::new();

    if let Some(doctor_id) = filter.doctor_id {
        values.push(doctor_id.to_string());
        conditions.push(format!("doctor_id = ?{}", values.len()));
    }
    if let Some(patient_id) = filter.patient_id {
        values.push(patient_id.to_string());
        conditions.push(format!("patient_id = ?{}", values.len()));
    }
    if filter.active_only {
        conditions.push(ACTIVE_PREDICATE.to_string());
    }

    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!("WHERE {}", conditions.join(" AND ")), values)
    }
}

pub fn insert_assignment(conn: &Connection, assignment: &Assignment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO assignments (id, doctor_id, patient_id, assigned_at, unassigned_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            assignment.id.to_string(),
            assignment.doctor_id.to_string(),
            assignment.patient_id.to_string(),
            format_timestamp(&assignment.state.assigned_at()),
            assignment.state.unassigned_at().as_ref().map(format_timestamp),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

pub fn get_assignment(conn: &Connection, id: &Uuid) -> Result<Option<Assignment>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = ?1"),
            params![id.to_string()],
            read_row,
        )
        .optional()?;
    row.map(assignment_from_row).transpose()
}

/// First match in assignment order, if any.
pub fn find_assignment(
    conn: &Connection,
    filter: &AssignmentFilter,
) -> Result<Option<Assignment>, DatabaseError> {
    let (clause, values) = filter_clause(filter);
    let row = conn
        .query_row(
            &format!(
                "SELECT {ASSIGNMENT_COLUMNS} FROM assignments {clause}
                 ORDER BY assigned_at, id LIMIT 1"
            ),
            params_from_iter(values.iter()),
            read_row,
        )
        .optional()?;
    row.map(assignment_from_row).transpose()
}

/// All matches, oldest assignment first.
pub fn list_assignments(
    conn: &Connection,
    filter: &AssignmentFilter,
) -> Result<Vec<Assignment>, DatabaseError> {
    let (clause, values) = filter_clause(filter);
    let mut stmt = conn.prepare(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM assignments {clause} ORDER BY assigned_at, id"
    ))?;
    let rows = stmt.query_map(params_from_iter(values.iter()), read_row)?;
    rows.map(|r| assignment_from_row(r?)).collect()
}

pub fn assignment_exists(conn: &Connection, filter: &AssignmentFilter) -> Result<bool, DatabaseError> {
    let (clause, values) = filter_clause(filter);
    let exists = conn.query_row(
        &format!("SELECT EXISTS (SELECT 1 FROM assignments {clause})"),
        params_from_iter(values.iter()),
        |row| row.get::<_, bool>(0),
    )?;
    Ok(exists)
}

/// Stamp `unassigned_at` on a still-active record.
///
/// Returns `false` if the record is unknown or was already closed.
pub fn close_assignment(
    conn: &Connection,
    id: &Uuid,
    until: &DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        &format!("UPDATE assignments SET unassigned_at = ?2 WHERE id = ?1 AND {ACTIVE_PREDICATE}"),
        params![id.to_string(), format_timestamp(until)],
    )?;
    Ok(changed == 1)
}
