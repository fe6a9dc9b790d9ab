use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use slackvault_common::{Error, Result};
use tracing::info;

/// The single database handle for a run. Opened once, handed to every
/// component that needs it, closed when the run ends (on drop, on every
/// exit path).
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn open(db_path: &Path) -> Result<Self> {
        info!("opening snapshot store at {}", db_path.display());
        let conn = Connection::open(db_path)
            .map_err(|e| Error::Connection(format!("failed to open database: {e}")))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| Error::Connection(format!("failed to set pragmas: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Connection(format!("failed to open in-memory database: {e}")))?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| Error::Connection(format!("failed to set pragmas: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Database("database lock poisoned".into()))
    }

    /// Translate a driver error into the typed taxonomy. Unique and
    /// primary-key violations become `Error::AlreadyExists` so callers
    /// never inspect engine-specific error codes. Other constraint
    /// failures (foreign key, check) stay hard errors.
    pub fn classify(err: rusqlite::Error, context: &str) -> Error {
        if let rusqlite::Error::SqliteFailure(failure, _) = &err {
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            {
                return Error::AlreadyExists;
            }
        }
        Error::Database(format!("{context}: {err}"))
    }
}
