//! Gradebook use-case service.
//!
//! # Responsibility
//! - Accept raw field input from a presentation layer and validate it.
//! - Delegate persistence to a `RecordStore`.
//! - Log every failed use-case to the diagnostic stream before returning it.
//!
//! # Invariants
//! - Nothing reaches the store without passing field validation.
//! - Errors are returned to the caller unchanged in meaning, never swallowed.
//! - Log lines carry identifiers only, never names or grade values.

use crate::logging::error_chain;
use crate::model::grade::{Grade, NewGrade};
use crate::model::student::{Student, StudentId};
use crate::model::validation::{parse_grade_value, ValidationError};
use crate::repo::record_store::{RecordStore, RepoError};
use log::{debug, error, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Use-case failure surfaced to presentation callers.
#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    StudentNotFound(StudentId),
    Repo(RepoError),
}

impl ServiceError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::Repo(err) if err.is_duplicate_key())
    }

    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::Repo(err) if err.is_storage_unavailable())
    }

    /// Stable code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::StudentNotFound(_) => "student_not_found",
            Self::Repo(err) => err.code(),
        }
    }

    /// Text suitable for an operator-facing message box or terminal line.
    ///
    /// Storage failures are summarized; their detail stays in the log.
    pub fn user_message(&self) -> String {
        if self.is_storage_unavailable() {
            "the gradebook file could not be accessed; see the log for details".to_string()
        } else {
            self.to_string()
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => Display::fmt(err, f),
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::Repo(err) => Display::fmt(err, f),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        // Both wrappers are transparent, so the chain starts below them.
        match self {
            Self::Validation(err) => err.source(),
            Self::StudentNotFound(_) => None,
            Self::Repo(err) => err.source(),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::UnknownStudent(id) => Self::StudentNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// A student together with all of their grades, sorted by subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentReport {
    pub student: Student,
    pub grades: Vec<Grade>,
}

/// Use-case wrapper around a record store.
pub struct GradebookService<R: RecordStore> {
    store: R,
}

impl<R: RecordStore> GradebookService<R> {
    pub fn new(store: R) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    /// Hands the store back, e.g. to close it explicitly.
    pub fn into_store(self) -> R {
        self.store
    }

    /// Registers a student from raw id/name input.
    pub fn register_student(&self, id: &str, name: &str) -> ServiceResult<Student> {
        let result = Student::new(id, name)
            .map_err(ServiceError::from)
            .and_then(|student| {
                self.store.register_student(&student)?;
                Ok(student)
            });
        record_outcome("student_register", id.trim(), result)
    }

    /// Registers a grade from raw subject/value input for an existing student.
    ///
    /// `value_text` goes through `parse_grade_value`, so `"7,5"` is accepted.
    pub fn register_grade(
        &self,
        student_id: &str,
        subject: &str,
        value_text: &str,
    ) -> ServiceResult<Grade> {
        let result = parse_grade_value(value_text)
            .and_then(|value| NewGrade::new(subject, value, student_id))
            .map_err(ServiceError::from)
            .and_then(|grade| {
                let id = self.store.register_grade(&grade)?;
                Ok(Grade {
                    id,
                    subject: grade.subject,
                    value: grade.value,
                    student_id: grade.student_id,
                })
            });
        record_outcome("grade_register", student_id.trim(), result)
    }

    /// Deletes a student and every grade they own. Unknown ids are a no-op.
    pub fn delete_student(&mut self, id: &str) -> ServiceResult<()> {
        let result = self.store.delete_student(id.trim()).map_err(ServiceError::from);
        record_outcome("student_delete", id.trim(), result)
    }

    /// Deletes one grade. A missing grade is a no-op.
    pub fn delete_grade(&self, student_id: &str, subject: &str) -> ServiceResult<()> {
        let result = self
            .store
            .delete_grade(subject.trim(), student_id.trim())
            .map_err(ServiceError::from);
        record_outcome("grade_delete", student_id.trim(), result)
    }

    pub fn list_students(&self) -> ServiceResult<Vec<Student>> {
        let result = self.store.list_students().map_err(ServiceError::from);
        record_outcome("student_list", "*", result)
    }

    pub fn student_grades(&self, student_id: &str) -> ServiceResult<Vec<Grade>> {
        let result = self
            .store
            .list_grades_for(student_id.trim())
            .map_err(ServiceError::from);
        record_outcome("grade_list", student_id.trim(), result)
    }

    /// Loads a student and their grades.
    ///
    /// # Errors
    /// - `StudentNotFound` when no student has this id.
    pub fn student_report(&self, student_id: &str) -> ServiceResult<StudentReport> {
        let id = student_id.trim();
        let result = self
            .store
            .find_student(id)
            .map_err(ServiceError::from)
            .and_then(|found| found.ok_or_else(|| ServiceError::StudentNotFound(id.to_string())))
            .and_then(|student| {
                let grades = self.store.list_grades_for(id)?;
                Ok(StudentReport { student, grades })
            });
        record_outcome("student_report", id, result)
    }
}

fn record_outcome<T>(event: &str, student_id: &str, result: ServiceResult<T>) -> ServiceResult<T> {
    match &result {
        Ok(_) => debug!("event={event} module=service status=ok student_id={student_id}"),
        Err(err) if err.is_storage_unavailable() => error!(
            "event={event} module=service status=error student_id={student_id} error_code={} error={}",
            err.code(),
            error_chain(err)
        ),
        Err(err) => warn!(
            "event={event} module=service status=error student_id={student_id} error_code={}",
            err.code()
        ),
    }
    result
}
