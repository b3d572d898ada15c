pub mod repository;
pub mod sqlite;

pub use repository::*;
pub use sqlite::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid stored value for {field}: {value}")]
    InvalidRow { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),
}

impl DatabaseError {
    /// Map a UNIQUE/CHECK failure to `ConstraintViolation`, pass anything else through.
    pub(crate) fn from_write(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref code, ref msg)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DatabaseError::ConstraintViolation(
                    msg.clone().unwrap_or_else(|| code.to_string()),
                )
            }
            other => DatabaseError::Sqlite(other),
        }
    }
}
