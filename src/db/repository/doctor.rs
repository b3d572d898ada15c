use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use uuid::Uuid;

use super::{like_prefix, parse_national_id, parse_uuid, placeholders};
use crate::db::DatabaseError;
use crate::models::*;

const DOCTOR_COLUMNS: &str = "id, first_name, last_name, department, national_id";

// Internal row type for Doctor mapping
struct DoctorRow {
    id: String,
    first_name: String,
    last_name: String,
    department: String,
    national_id: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DoctorRow> {
    Ok(DoctorRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        department: row.get(3)?,
        national_id: row.get(4)?,
    })
}

fn doctor_from_row(row: DoctorRow) -> Result<Doctor, DatabaseError> {
    Ok(Doctor {
        id: parse_uuid("doctors.id", &row.id)?,
        first_name: row.first_name,
        last_name: row.last_name,
        department: row.department,
        national_id: parse_national_id(&row.national_id)?,
    })
}

fn query_doctors(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, read_row)?;
    rows.map(|r| doctor_from_row(r?)).collect()
}

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (id, first_name, last_name, department, national_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            doctor.id.to_string(),
            doctor.first_name,
            doctor.last_name,
            doctor.department,
            doctor.national_id.as_str(),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

pub fn get_doctor(conn: &Connection, id: &Uuid) -> Result<Option<Doctor>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = ?1"),
            params![id.to_string()],
            read_row,
        )
        .optional()?;
    row.map(doctor_from_row).transpose()
}

pub fn doctor_exists(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let exists = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM doctors WHERE id = ?1)",
        params![id.to_string()],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(exists)
}

/// Overwrite every mutable column of an existing doctor.
pub fn update_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE doctors SET first_name = ?2, last_name = ?3, department = ?4, national_id = ?5
             WHERE id = ?1",
            params![
                doctor.id.to_string(),
                doctor.first_name,
                doctor.last_name,
                doctor.department,
                doctor.national_id.as_str(),
            ],
        )
        .map_err(DatabaseError::from_write)?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Doctor".into(),
            id: doctor.id.to_string(),
        });
    }
    Ok(())
}

/// Returns `false` when no row had that id.
pub fn delete_doctor(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let deleted = conn.execute("DELETE FROM doctors WHERE id = ?1", params![id.to_string()])?;
    Ok(deleted > 0)
}

pub fn find_doctor_by_national_id(
    conn: &Connection,
    national_id: &NationalId,
) -> Result<Option<Doctor>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE national_id = ?1"),
            params![national_id.as_str()],
            read_row,
        )
        .optional()?;
    row.map(doctor_from_row).transpose()
}

/// Doctors whose first or last name starts with `prefix` (ASCII case-insensitive).
pub fn search_doctors_by_name(conn: &Connection, prefix: &str) -> Result<Vec<Doctor>, DatabaseError> {
    query_doctors(
        conn,
        &format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors
             WHERE first_name LIKE ?1 ESCAPE '\\' OR last_name LIKE ?1 ESCAPE '\\'
             ORDER BY last_name, first_name, id"
        ),
        params![like_prefix(prefix)],
    )
}

/// Batch point lookup. Unknown ids are silently absent from the result.
pub fn get_doctors_by_ids(conn: &Connection, ids: &[Uuid]) -> Result<Vec<Doctor>, DatabaseError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    query_doctors(
        conn,
        &format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id IN ({})",
            placeholders(ids.len())
        ),
        params_from_iter(ids.iter().map(Uuid::to_string)),
    )
}
