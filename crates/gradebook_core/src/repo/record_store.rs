//! Record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist students and their grades in one SQLite file.
//! - Translate engine constraint failures into semantic errors.
//! - Own the connection for the store's whole lifetime.
//!
//! # Invariants
//! - Write paths validate the domain value before any SQL runs.
//! - `(subject, student_id)` is unique; duplicates fail as `DuplicateGrade`.
//! - Deleting a student removes its grades first, in the same transaction.
//! - Deletes are idempotent: zero affected rows is success.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::schema::{latest_version, REQUIRED_TABLES};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::grade::{Grade, GradeId, NewGrade};
use crate::model::student::{Student, StudentId};
use crate::model::validation::{check_grade_range, ValidationError};
use log::{debug, error, info};
use rusqlite::{ffi, params, Connection, ErrorCode, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type RepoResult<T> = Result<T, RepoError>;

/// Record store failure.
///
/// Callers usually only need two classes: `is_duplicate_key()` for
/// operator-correctable conflicts and `is_storage_unavailable()` for
/// everything wrong with the file or engine, including corrupt rows and a
/// schema that does not match.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    /// A student with this id is already registered.
    DuplicateStudent(StudentId),
    /// The student already has a grade for this subject.
    DuplicateGrade {
        subject: String,
        student_id: StudentId,
    },
    /// Grade insert referenced a student that does not exist.
    UnknownStudent(StudentId),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// True for uniqueness violations on student id or `(subject, student)`.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateStudent(_) | Self::DuplicateGrade { .. })
    }

    /// True when the gradebook file cannot be used as-is: engine or I/O
    /// failure, corrupt persisted rows, or a schema that does not match.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Db(_)
                | Self::InvalidData(_)
                | Self::UninitializedConnection { .. }
                | Self::MissingRequiredTable(_)
                | Self::MissingRequiredColumn { .. }
        )
    }

    /// Stable code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::DuplicateStudent(_) | Self::DuplicateGrade { .. } => "duplicate_key",
            Self::UnknownStudent(_) => "unknown_student",
            Self::Db(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => "storage_unavailable",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => Display::fmt(err, f),
            Self::DuplicateStudent(id) => write!(f, "a student with id `{id}` already exists"),
            Self::DuplicateGrade {
                subject,
                student_id,
            } => write!(
                f,
                "student `{student_id}` already has a grade for subject `{subject}`"
            ),
            Self::UnknownStudent(id) => write!(f, "student not found: {id}"),
            Self::Db(_) => f.write_str("storage unavailable"),
            Self::InvalidData(message) => write!(f, "invalid persisted gradebook data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            // Transparent: displays as the inner error.
            Self::Validation(err) => err.source(),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Engine(value))
    }
}

/// Persistence contract consumed by the service and presentation layers.
pub trait RecordStore {
    /// Inserts a student. Fails with `DuplicateStudent` if the id exists.
    fn register_student(&self, student: &Student) -> RepoResult<()>;
    /// Inserts a grade and returns its storage-assigned id.
    fn register_grade(&self, grade: &NewGrade) -> RepoResult<GradeId>;
    /// Removes the student's grades, then the student.
    fn delete_student(&mut self, id: &str) -> RepoResult<()>;
    fn delete_grade(&self, subject: &str, student_id: &str) -> RepoResult<()>;
    fn find_student(&self, id: &str) -> RepoResult<Option<Student>>;
    /// All students sorted by name ascending.
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    /// The student's grades sorted by subject ascending.
    fn list_grades_for(&self, student_id: &str) -> RepoResult<Vec<Grade>>;
}

/// SQLite-backed record store owning its connection.
///
/// The connection is released when the store is dropped; `close()` does the
/// same explicitly and reports a failed close.
pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    /// Opens (creating if needed) the gradebook file at `path`.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let conn = open_db(path)?;
        Self::try_new(conn)
    }

    /// Opens a throwaway in-memory gradebook.
    pub fn open_in_memory() -> RepoResult<Self> {
        let conn = open_db_in_memory()?;
        Self::try_new(conn)
    }

    /// Wraps an already bootstrapped connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version does not match.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema is
    ///   incomplete.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_connection_ready(&conn)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Read-only access to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Releases the storage handle.
    pub fn close(self) -> RepoResult<()> {
        match self.conn.close() {
            Ok(()) => {
                info!("event=store_close module=repo status=ok");
                Ok(())
            }
            // The returned connection is dropped here, which retries the close.
            Err((_conn, err)) => {
                error!("event=store_close module=repo status=error error={err}");
                Err(err.into())
            }
        }
    }
}

impl RecordStore for SqliteRecordStore {
    fn register_student(&self, student: &Student) -> RepoResult<()> {
        student.validate()?;

        self.conn
            .execute(
                "INSERT INTO Student (id, name) VALUES (?1, ?2);",
                params![student.id.as_str(), student.name.as_str()],
            )
            .map_err(|err| match constraint_code(&err) {
                Some(code) if is_uniqueness_code(code) => {
                    RepoError::DuplicateStudent(student.id.clone())
                }
                _ => err.into(),
            })?;

        Ok(())
    }

    fn register_grade(&self, grade: &NewGrade) -> RepoResult<GradeId> {
        grade.validate()?;

        self.conn
            .execute(
                "INSERT INTO Grade (subject, value, student_id) VALUES (?1, ?2, ?3);",
                params![
                    grade.subject.as_str(),
                    grade.value,
                    grade.student_id.as_str()
                ],
            )
            .map_err(|err| match constraint_code(&err) {
                Some(code) if is_uniqueness_code(code) => RepoError::DuplicateGrade {
                    subject: grade.subject.clone(),
                    student_id: grade.student_id.clone(),
                },
                Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
                    RepoError::UnknownStudent(grade.student_id.clone())
                }
                _ => err.into(),
            })?;

        Ok(self.conn.last_insert_rowid())
    }

    fn delete_student(&mut self, id: &str) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let grades_removed = tx.execute("DELETE FROM Grade WHERE student_id = ?1;", [id])?;
        let students_removed = tx.execute("DELETE FROM Student WHERE id = ?1;", [id])?;
        tx.commit()?;

        debug!(
            "event=student_delete module=repo status=ok students_removed={students_removed} grades_removed={grades_removed}"
        );
        Ok(())
    }

    fn delete_grade(&self, subject: &str, student_id: &str) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM Grade WHERE subject = ?1 AND student_id = ?2;",
            params![subject, student_id],
        )?;
        Ok(())
    }

    fn find_student(&self, id: &str) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM Student WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM Student ORDER BY name ASC, id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }

    fn list_grades_for(&self, student_id: &str) -> RepoResult<Vec<Grade>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject, value, student_id
             FROM Grade
             WHERE student_id = ?1
             ORDER BY subject ASC;",
        )?;
        let mut rows = stmt.query([student_id])?;
        let mut grades = Vec::new();
        while let Some(row) = rows.next()? {
            grades.push(parse_grade_row(row)?);
        }

        Ok(grades)
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let student = Student {
        id: row.get("id")?,
        name: row.get("name")?,
    };
    student.validate().map_err(|err| {
        RepoError::InvalidData(format!("Student row `{}`: {err}", student.id))
    })?;
    Ok(student)
}

fn parse_grade_row(row: &Row<'_>) -> RepoResult<Grade> {
    let grade = Grade {
        id: row.get("id")?,
        subject: row.get("subject")?,
        value: row.get("value")?,
        student_id: row.get("student_id")?,
    };
    check_grade_range(grade.value)
        .map_err(|err| RepoError::InvalidData(format!("Grade row {}: {err}", grade.id)))?;
    Ok(grade)
}

fn constraint_code(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            Some(failure.extended_code)
        }
        _ => None,
    }
}

fn is_uniqueness_code(code: i32) -> bool {
    code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY || code == ffi::SQLITE_CONSTRAINT_UNIQUE
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
