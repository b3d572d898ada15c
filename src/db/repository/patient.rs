use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use uuid::Uuid;

use super::{like_prefix, parse_national_id, parse_uuid, placeholders};
use crate::db::DatabaseError;
use crate::models::*;

const PATIENT_COLUMNS: &str = "id, first_name, last_name, national_id";

struct PatientRow {
    id: String,
    first_name: String,
    last_name: String,
    national_id: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        national_id: row.get(3)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: parse_uuid("patients.id", &row.id)?,
        first_name: row.first_name,
        last_name: row.last_name,
        national_id: parse_national_id(&row.national_id)?,
    })
}

fn query_patients(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, read_row)?;
    rows.map(|r| patient_from_row(r?)).collect()
}

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, first_name, last_name, national_id)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            patient.id.to_string(),
            patient.first_name,
            patient.last_name,
            patient.national_id.as_str(),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"),
            params![id.to_string()],
            read_row,
        )
        .optional()?;
    row.map(patient_from_row).transpose()
}

pub fn patient_exists(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let exists = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM patients WHERE id = ?1)",
        params![id.to_string()],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(exists)
}

pub fn update_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE patients SET first_name = ?2, last_name = ?3, national_id = ?4
             WHERE id = ?1",
            params![
                patient.id.to_string(),
                patient.first_name,
                patient.last_name,
                patient.national_id.as_str(),
            ],
        )
        .map_err(DatabaseError::from_write)?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: patient.id.to_string(),
        });
    }
    Ok(())
}

/// Returns `false` when no row had that id.
pub fn delete_patient(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let deleted = conn.execute("DELETE FROM patients WHERE id = ?1", params![id.to_string()])?;
    Ok(deleted > 0)
}

pub fn find_patient_by_national_id(
    conn: &Connection,
    national_id: &NationalId,
) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE national_id = ?1"),
            params![national_id.as_str()],
            read_row,
        )
        .optional()?;
    row.map(patient_from_row).transpose()
}

/// Patients whose first or last name starts with `prefix` (ASCII case-insensitive).
pub fn search_patients_by_name(conn: &Connection, prefix: &str) -> Result<Vec<Patient>, DatabaseError> {
    query_patients(
        conn,
        &format!(
            "SELECT {PATIENT_COLUMNS} FROM patients
             WHERE first_name LIKE ?1 ESCAPE '\\' OR last_name LIKE ?1 ESCAPE '\\'
             ORDER BY last_name, first_name, id"
        ),
        params![like_prefix(prefix)],
    )
}

/// Batch point lookup. Unknown ids are silently absent from the result.
pub fn get_patients_by_ids(conn: &Connection, ids: &[Uuid]) -> Result<Vec<Patient>, DatabaseError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    query_patients(
        conn,
        &format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE id IN ({})",
            placeholders(ids.len())
        ),
        params_from_iter(ids.iter().map(Uuid::to_string)),
    )
}
