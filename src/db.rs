//! Local SQLite store for the till.
//!
//! Uses rusqlite with WAL mode. The schema is a single `app_state` table
//! holding one JSON document per collection key, so a logical operation
//! that touches several collections (payment, category rename) commits
//! them in one transaction.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};

use crate::errors::{Error, Result};

/// Database file name inside the data directory.
pub const DB_FILE: &str = "till.db";

/// Current schema version. Bump when adding new migrations.
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Holds the store connection. There is exactly one logical writer; the
/// mutex makes the handle shareable with read-only observers.
pub struct DbState {
    pub conn: Mutex<Connection>,
    pub db_path: PathBuf,
}

impl DbState {
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }
}

/// Initialize the store at `{data_dir}/till.db`.
///
/// Creates the directory if needed, opens the connection, sets pragmas,
/// and runs any pending migrations. On corruption or open failure,
/// deletes the file and retries once.
pub fn init(data_dir: &Path) -> Result<DbState> {
    fs::create_dir_all(data_dir)?;

    let db_path = data_dir.join(DB_FILE);
    info!("opening store at {}", db_path.display());

    let conn = match open_and_configure(&db_path) {
        Ok(c) => c,
        Err(first_err) => {
            warn!("store open failed ({first_err}), deleting and retrying once");
            if db_path.exists() {
                let _ = fs::remove_file(&db_path);
                let _ = fs::remove_file(db_path.with_extension("db-wal"));
                let _ = fs::remove_file(db_path.with_extension("db-shm"));
            }
            open_and_configure(&db_path)?
        }
    };

    run_migrations(&conn)?;

    info!("store initialized (schema v{CURRENT_SCHEMA_VERSION})");

    Ok(DbState {
        conn: Mutex::new(conn),
        db_path,
    })
}

/// Open the database file and apply pragmas.
fn open_and_configure(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;

    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;",
    )?;

    Ok(conn)
}

/// Run all pending migrations up to `CURRENT_SCHEMA_VERSION`.
fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT DEFAULT (datetime('now'))
        );",
    )?;

    let current: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current >= CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    info!("migrating store from v{current} to v{CURRENT_SCHEMA_VERSION}");

    if current < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

/// Migration v1: the state document table.
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;
    conn.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
    Ok(())
}

// ---------------------------------------------------------------------------
// State documents
// ---------------------------------------------------------------------------

/// Read a state document by key. `None` when the key has never been written.
pub fn get_document(db: &DbState, key: &str) -> Result<Option<String>> {
    let conn = db.lock()?;
    let data = conn
        .query_row(
            "SELECT data FROM app_state WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(data)
}

/// Upsert a single state document.
pub fn put_document(db: &DbState, key: &str, data: &str) -> Result<()> {
    put_documents(db, &[(key, data.to_string())])
}

/// Upsert several state documents in one transaction.
///
/// Collections touched by the same logical operation must go through here
/// so a crash cannot leave one written and the other not.
pub fn put_documents(db: &DbState, docs: &[(&str, String)]) -> Result<()> {
    let conn = db.lock()?;

    conn.execute_batch("BEGIN IMMEDIATE")?;

    let result = (|| -> Result<()> {
        for (key, data) in docs {
            conn.execute(
                "INSERT INTO app_state (key, data, updated_at)
                 VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE SET
                    data = excluded.data,
                    updated_at = excluded.updated_at",
                params![key, data],
            )?;
        }
        Ok(())
    })();

    match result {
        Ok(()) => {
            conn.execute_batch("COMMIT")?;
            Ok(())
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}

#[cfg(test)]
pub(crate) fn open_in_memory() -> DbState {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch(
        "PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;",
    )
    .expect("set pragmas");
    run_migrations(&conn).expect("run migrations");
    DbState {
        conn: Mutex::new(conn),
        db_path: PathBuf::from(":memory:"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_document_reads_as_none() {
        let db = open_in_memory();
        assert_eq!(get_document(&db, "orders").expect("read"), None);
    }

    #[test]
    fn documents_round_trip_and_overwrite() {
        let db = open_in_memory();

        put_document(&db, "orders", "[]").expect("write");
        assert_eq!(
            get_document(&db, "orders").expect("read").as_deref(),
            Some("[]")
        );

        put_document(&db, "orders", "[{\"id\":1}]").expect("overwrite");
        assert_eq!(
            get_document(&db, "orders").expect("read").as_deref(),
            Some("[{\"id\":1}]")
        );
    }

    #[test]
    fn multi_document_write_lands_together() {
        let db = open_in_memory();

        put_documents(
            &db,
            &[
                ("orders", "[]".to_string()),
                ("history", "[{\"id\":9}]".to_string()),
            ],
        )
        .expect("write both");

        assert_eq!(
            get_document(&db, "orders").expect("read").as_deref(),
            Some("[]")
        );
        assert_eq!(
            get_document(&db, "history").expect("read").as_deref(),
            Some("[{\"id\":9}]")
        );
    }

    #[test]
    fn migrations_are_idempotent_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");

        let first = init(dir.path()).expect("first open");
        put_document(&first, "nextItemId", "6").expect("write");
        drop(first);

        let second = init(dir.path()).expect("reopen");
        assert_eq!(
            get_document(&second, "nextItemId").expect("read").as_deref(),
            Some("6")
        );
    }
}
