//! Student domain model.
//!
//! # Invariants
//! - `id` is assigned by the operator, never generated, and never blank.
//! - `name` is never blank.
//! - Both fields are stored trimmed.

use super::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Operator-assigned student identifier (enrollment number).
pub type StudentId = String;

/// Root entity of the gradebook. Owns zero or more grades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
}

impl Student {
    /// Builds a student from raw field input, trimming both values.
    pub fn new(id: impl AsRef<str>, name: impl AsRef<str>) -> Result<Self, ValidationError> {
        let student = Self {
            id: id.as_ref().trim().to_string(),
            name: name.as_ref().trim().to_string(),
        };
        student.validate()?;
        Ok(student)
    }

    /// Checks field invariants without touching storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyStudentId);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyStudentName);
        }
        Ok(())
    }

    /// Single-line label in `id - name` form, as shown in pickers.
    pub fn label(&self) -> String {
        format!("{} - {}", self.id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::Student;
    use crate::model::validation::ValidationError;

    #[test]
    fn new_trims_fields() {
        let student = Student::new("  2024001 ", " Alice Smith\t").unwrap();
        assert_eq!(student.id, "2024001");
        assert_eq!(student.name, "Alice Smith");
        assert_eq!(student.label(), "2024001 - Alice Smith");
    }

    #[test]
    fn new_rejects_blank_fields() {
        assert_eq!(
            Student::new("   ", "Alice").unwrap_err(),
            ValidationError::EmptyStudentId
        );
        assert_eq!(
            Student::new("1", "").unwrap_err(),
            ValidationError::EmptyStudentName
        );
    }

    #[test]
    fn serializes_with_plain_field_names() {
        let student = Student::new("1", "Alice").unwrap();
        let json = serde_json::to_value(&student).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "1", "name": "Alice" }));
    }
}
