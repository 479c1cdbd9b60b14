//! Opening the gradebook file.
//!
//! A gradebook is one SQLite file holding the `Student` and `Grade` tables.
//! This module hands out connections that are ready for the record store:
//! pragmas set, schema present, version checked.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - Connections leave here with foreign keys enforced.
//! - A file stamped by a newer release is refused and left untouched.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Why a gradebook file could not be opened or used.
///
/// Upper layers report every variant as "storage unavailable"; the engine
/// detail is kept in the error chain for the log.
#[derive(Debug)]
pub enum DbError {
    /// SQLite rejected an open, pragma or statement.
    Engine(rusqlite::Error),
    /// The file's `user_version` is ahead of what this build understands.
    NewerFileVersion { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            // Engine text is reachable through `source()`.
            Self::Engine(_) => f.write_str("sqlite engine error"),
            Self::NewerFileVersion { found, supported } => write!(
                f,
                "gradebook file uses schema {found}; this build reads up to schema {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Engine(err) => Some(err),
            Self::NewerFileVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use std::error::Error;

    #[test]
    fn engine_error_keeps_detail_in_source_only() {
        let err = DbError::from(rusqlite::Error::InvalidQuery);
        let detail = err.source().unwrap().to_string();

        assert_eq!(err.to_string(), "sqlite engine error");
        assert!(!err.to_string().contains(&detail));
    }
}
