//! Grade domain model.
//!
//! # Invariants
//! - At most one grade per `(subject, student_id)` pair.
//! - `value` is finite and within `[GRADE_MIN, GRADE_MAX]`.
//! - `id` is assigned by storage, increases monotonically and is never reused.

use super::student::StudentId;
use super::validation::{check_grade_range, ValidationError};
use serde::{Deserialize, Serialize};

/// Storage-assigned grade row id.
pub type GradeId = i64;

/// Write model for a grade that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGrade {
    pub subject: String,
    pub value: f64,
    pub student_id: StudentId,
}

impl NewGrade {
    /// Builds a grade from raw field input, trimming text fields.
    pub fn new(
        subject: impl AsRef<str>,
        value: f64,
        student_id: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        let grade = Self {
            subject: subject.as_ref().trim().to_string(),
            value,
            student_id: student_id.as_ref().trim().to_string(),
        };
        grade.validate()?;
        Ok(grade)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.subject.trim().is_empty() {
            return Err(ValidationError::EmptySubject);
        }
        if self.student_id.trim().is_empty() {
            return Err(ValidationError::EmptyStudentId);
        }
        check_grade_range(self.value)
    }
}

/// Stored grade as read back from the gradebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: GradeId,
    pub subject: String,
    pub value: f64,
    pub student_id: StudentId,
}
