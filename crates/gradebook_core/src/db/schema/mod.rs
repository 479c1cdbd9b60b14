//! Gradebook schema registry and executor.
//!
//! # Responsibility
//! - Create the `Student` and `Grade` tables on first open.
//! - Refuse files whose `user_version` this binary does not understand.
//!
//! # Invariants
//! - Schema creation runs in one transaction; a failed open leaves no tables.
//! - Applied version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Tables every usable gradebook connection must carry, with their columns.
pub const REQUIRED_TABLES: &[(&str, &[&str])] = &[
    ("Student", &["id", "name"]),
    ("Grade", &["id", "subject", "value", "student_id"]),
];

const SCHEMA_VERSION: u32 = 1;
const SCHEMA_SQL: &str = include_str!("0001_init.sql");

/// Returns the schema version written by this binary.
pub fn latest_version() -> u32 {
    SCHEMA_VERSION
}

/// Creates the schema on a fresh connection; no-op when already current.
pub fn apply_schema(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;

    if current_version > SCHEMA_VERSION {
        return Err(DbError::NewerFileVersion {
            found: current_version,
            supported: SCHEMA_VERSION,
        });
    }

    if current_version == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
