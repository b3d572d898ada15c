//! Repository layer: table-scoped database operations.
//!
//! Free functions over a borrowed `Connection`, one sub-module per table.
//! Rows are read as raw strings first and converted afterwards so that a
//! corrupt value surfaces as `DatabaseError::InvalidRow` instead of a
//! silently defaulted field.

mod assignment;
mod doctor;
mod patient;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::DatabaseError;
use crate::models::NationalId;

pub use assignment::*;
pub use doctor::*;
pub use patient::*;

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| DatabaseError::InvalidRow {
            field: field.into(),
            value: value.into(),
        })
}

pub(crate) fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|_| DatabaseError::InvalidRow {
        field: field.into(),
        value: value.into(),
    })
}

pub(crate) fn parse_national_id(value: &str) -> Result<NationalId, DatabaseError> {
    NationalId::parse(value).ok_or_else(|| DatabaseError::InvalidRow {
        field: "national_id".into(),
        value: value.into(),
    })
}

/// `LIKE` pattern matching values that start with `prefix`, with SQL
/// wildcards in the input escaped (pair with `ESCAPE '\'`).
pub(crate) fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `?,?,?` with `n` placeholders.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

/// Whether any doctor or patient other than `except` holds `national_id`.
pub fn national_id_in_use(
    conn: &Connection,
    national_id: &NationalId,
    except: Option<&Uuid>,
) -> Result<bool, DatabaseError> {
    let except = except.map(|id| id.to_string()).unwrap_or_default();
    let in_use = conn.query_row(
        "SELECT EXISTS (
             SELECT 1 FROM doctors WHERE national_id = ?1 AND id != ?2
             UNION ALL
             SELECT 1 FROM patients WHERE national_id = ?1 AND id != ?2
         )",
        params![national_id.as_str(), except],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(in_use)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::*;
    use chrono::TimeZone;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn doctor(first: &str, last: &str, nid: &str) -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            first_name: first.into(),
            last_name: last.into(),
            department: "Oncology".into(),
            national_id: NationalId::parse(nid).unwrap(),
        }
    }

    fn patient(first: &str, last: &str, nid: &str) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            first_name: first.into(),
            last_name: last.into(),
            national_id: NationalId::parse(nid).unwrap(),
        }
    }

    #[test]
    fn timestamp_round_trip_keeps_micros() {
        let ts = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 58).unwrap()
            + chrono::Duration::microseconds(123_456);
        let text = format_timestamp(&ts);
        assert_eq!(text, "2024-02-29T23:59:58.123456Z");
        assert_eq!(parse_timestamp("t", &text).unwrap(), ts);
    }

    #[test]
    fn bad_timestamp_is_invalid_row() {
        let err = parse_timestamp("assigned_at", "yesterday").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidRow { .. }));
    }

    #[test]
    fn like_prefix_escapes_wildcards() {
        assert_eq!(like_prefix("Ra"), "Ra%");
        assert_eq!(like_prefix("50%_"), "50\\%\\_%");
    }

    #[test]
    fn placeholder_list() {
        assert_eq!(placeholders(3), "?,?,?");
        assert_eq!(placeholders(1), "?");
    }

    #[test]
    fn doctor_insert_and_retrieve() {
        let conn = test_db();
        let doc = doctor("Meera", "Iyer", "234567890123");
        insert_doctor(&conn, &doc).unwrap();
        assert_eq!(get_doctor(&conn, &doc.id).unwrap(), Some(doc.clone()));
        assert!(doctor_exists(&conn, &doc.id).unwrap());
        assert!(!doctor_exists(&conn, &Uuid::new_v4()).unwrap());
    }

    #[test]
    fn doctor_national_id_unique_in_table() {
        let conn = test_db();
        insert_doctor(&conn, &doctor("Meera", "Iyer", "234567890123")).unwrap();
        let err = insert_doctor(&conn, &doctor("Ravi", "Nair", "234567890123")).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }

    #[test]
    fn national_id_checked_across_doctors_and_patients() {
        let conn = test_db();
        let doc = doctor("Meera", "Iyer", "234567890123");
        insert_doctor(&conn, &doc).unwrap();
        let nid = NationalId::parse("234567890123").unwrap();

        assert!(national_id_in_use(&conn, &nid, None).unwrap());
        // The holder itself does not count against its own update
        assert!(!national_id_in_use(&conn, &nid, Some(&doc.id)).unwrap());

        let other = NationalId::parse("876543210987").unwrap();
        insert_patient(&conn, &patient("Arjun", "Das", "876543210987")).unwrap();
        assert!(national_id_in_use(&conn, &other, Some(&doc.id)).unwrap());
    }

    #[test]
    fn doctor_update_and_delete() {
        let conn = test_db();
        let mut doc = doctor("Meera", "Iyer", "234567890123");
        insert_doctor(&conn, &doc).unwrap();

        doc.department = "Neurology".into();
        update_doctor(&conn, &doc).unwrap();
        assert_eq!(get_doctor(&conn, &doc.id).unwrap().unwrap().department, "Neurology");

        assert!(delete_doctor(&conn, &doc.id).unwrap());
        assert!(!delete_doctor(&conn, &doc.id).unwrap());
        assert!(get_doctor(&conn, &doc.id).unwrap().is_none());
    }

    #[test]
    fn update_missing_doctor_is_not_found() {
        let conn = test_db();
        let err = update_doctor(&conn, &doctor("Meera", "Iyer", "234567890123")).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn name_search_is_prefix_and_case_insensitive() {
        let conn = test_db();
        insert_doctor(&conn, &doctor("Meera", "Iyer", "234567890123")).unwrap();
        insert_doctor(&conn, &doctor("Ravi", "Menon", "334567890123")).unwrap();
        insert_doctor(&conn, &doctor("Anil", "Kumar", "434567890123")).unwrap();

        let found = search_doctors_by_name(&conn, "me").unwrap();
        let names: Vec<_> = found.iter().map(|d| d.first_name.as_str()).collect();
        assert_eq!(names, vec!["Meera", "Ravi"]);

        assert!(search_doctors_by_name(&conn, "eer").unwrap().is_empty());
        assert!(search_doctors_by_name(&conn, "%").unwrap().is_empty());
    }

    #[test]
    fn patient_batch_lookup_by_ids() {
        let conn = test_db();
        let a = patient("Arjun", "Das", "234567890123");
        let b = patient("Bina", "Shah", "334567890123");
        insert_patient(&conn, &a).unwrap();
        insert_patient(&conn, &b).unwrap();

        let found = get_patients_by_ids(&conn, &[a.id, Uuid::new_v4(), b.id]).unwrap();
        assert_eq!(found.len(), 2);
        assert!(get_patients_by_ids(&conn, &[]).unwrap().is_empty());
    }

    #[test]
    fn patient_lookup_by_national_id() {
        let conn = test_db();
        let p = patient("Arjun", "Das", "234567890123");
        insert_patient(&conn, &p).unwrap();
        let found = find_patient_by_national_id(&conn, &p.national_id).unwrap();
        assert_eq!(found.map(|f| f.id), Some(p.id));
    }

    #[test]
    fn doctor_lookup_by_national_id() {
        let conn = test_db();
        let d = doctor("Meera", "Rao", "345678901234");
        insert_doctor(&conn, &d).unwrap();

        let spaced = NationalId::parse("3456 7890 1234").unwrap();
        let found = find_doctor_by_national_id(&conn, &spaced).unwrap();
        assert_eq!(found.map(|f| f.id), Some(d.id));

        let unknown = NationalId::parse("999999999999").unwrap();
        assert!(find_doctor_by_national_id(&conn, &unknown).unwrap().is_none());

        let p = patient("Arjun", "Das", "456789012345");
        insert_patient(&conn, &p).unwrap();
        assert!(find_doctor_by_national_id(&conn, &p.national_id).unwrap().is_none());
    }

    #[test]
    fn assignment_filters() {
        let conn = test_db();
        let d = Uuid::new_v4();
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();

        let open = Assignment::open(d, p1, t1);
        let closed = Assignment {
            state: AssignmentState::from_timestamps(t0, Some(t1)),
            ..Assignment::open(d, p2, t0)
        };
        insert_assignment(&conn, &open).unwrap();
        insert_assignment(&conn, &closed).unwrap();

        let all = list_assignments(&conn, &AssignmentFilter {
            doctor_id: Some(d),
            ..AssignmentFilter::default()
        })
        .unwrap();
        assert_eq!(all, vec![closed.clone(), open.clone()]);

        let active = list_assignments(&conn, &AssignmentFilter::active_for_doctor(d)).unwrap();
        assert_eq!(active, vec![open.clone()]);

        assert_eq!(
            find_assignment(&conn, &AssignmentFilter::pair(d, p2).active()).unwrap(),
            None
        );
        assert!(assignment_exists(&conn, &AssignmentFilter::pair(d, p2)).unwrap());
        assert!(!assignment_exists(&conn, &AssignmentFilter::active_for_patient(p2)).unwrap());
    }

    #[test]
    fn second_active_row_for_pair_rejected_by_index() {
        let conn = test_db();
        let d = Uuid::new_v4();
        let p = Uuid::new_v4();
        insert_assignment(&conn, &Assignment::open(d, p, Utc::now())).unwrap();
        let err = insert_assignment(&conn, &Assignment::open(d, p, Utc::now())).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }

    #[test]
    fn close_assignment_applies_once() {
        let conn = test_db();
        let a = Assignment::open(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
        insert_assignment(&conn, &a).unwrap();
        let until = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        assert!(close_assignment(&conn, &a.id, &until).unwrap());
        assert!(!close_assignment(&conn, &a.id, &until).unwrap());

        let stored = get_assignment(&conn, &a.id).unwrap().unwrap();
        assert_eq!(stored.state.unassigned_at(), Some(until));
    }
}
