//! Shared application state handed to every HTTP handler.
//!
//! One SQLite connection behind a `Mutex`. Handlers take the lock, run a
//! synchronous registry/engine operation, and drop the guard before the
//! next `.await`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::Connection;

use crate::db;

pub struct CoreState {
    db: Mutex<Connection>,
}

impl CoreState {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Open (and migrate) the database file at `path`.
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self, CoreError> {
        Ok(Self::new(db::open_database(path, busy_timeout)?))
    }

    pub fn in_memory() -> Result<Self, CoreError> {
        Ok(Self::new(db::open_memory_database()?))
    }

    /// Exclusive access to the connection for the duration of one operation.
    pub fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.db.lock().map_err(|_| CoreError::LockPoisoned)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}
