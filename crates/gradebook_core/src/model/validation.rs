//! Field-level validation shared by every write path.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lowest grade value accepted at the boundary.
pub const GRADE_MIN: f64 = 0.0;
/// Highest grade value accepted at the boundary.
pub const GRADE_MAX: f64 = 10.0;

/// Rejected field input, raised before anything reaches SQLite.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyStudentId,
    EmptyStudentName,
    EmptySubject,
    /// Grade text that does not parse as a number.
    InvalidGradeValue(String),
    /// Parsed grade outside `[GRADE_MIN, GRADE_MAX]` or not finite.
    GradeOutOfRange(f64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyStudentId => write!(f, "student id cannot be empty"),
            Self::EmptyStudentName => write!(f, "student name cannot be empty"),
            Self::EmptySubject => write!(f, "subject cannot be empty"),
            Self::InvalidGradeValue(text) => write!(f, "`{text}` is not a valid grade value"),
            Self::GradeOutOfRange(value) => write!(
                f,
                "grade {value} must be between {GRADE_MIN} and {GRADE_MAX}"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Parses a grade typed by an operator.
///
/// Accepts surrounding whitespace and a comma decimal separator (`"7,5"`).
///
/// # Errors
/// - `InvalidGradeValue` when the text is not a number.
/// - `GradeOutOfRange` when the number is outside `[0, 10]` or not finite.
pub fn parse_grade_value(text: &str) -> Result<f64, ValidationError> {
    let trimmed = text.trim();
    let value = trimmed
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidGradeValue(trimmed.to_string()))?;
    check_grade_range(value)?;
    Ok(value)
}

pub(crate) fn check_grade_range(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (GRADE_MIN..=GRADE_MAX).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::GradeOutOfRange(value))
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_grade_value, ValidationError};

    #[test]
    fn accepts_dot_and_comma_separators() {
        assert_eq!(parse_grade_value("8.5").unwrap(), 8.5);
        assert_eq!(parse_grade_value(" 7,25 ").unwrap(), 7.25);
    }

    #[test]
    fn accepts_range_bounds() {
        assert_eq!(parse_grade_value("0").unwrap(), 0.0);
        assert_eq!(parse_grade_value("10").unwrap(), 10.0);
    }

    #[test]
    fn rejects_values_outside_range() {
        assert_eq!(
            parse_grade_value("10.01").unwrap_err(),
            ValidationError::GradeOutOfRange(10.01)
        );
        assert!(matches!(
            parse_grade_value("-1"),
            Err(ValidationError::GradeOutOfRange(_))
        ));
    }

    #[test]
    fn rejects_non_numeric_and_non_finite_text() {
        assert_eq!(
            parse_grade_value("  abc ").unwrap_err(),
            ValidationError::InvalidGradeValue("abc".to_string())
        );
        assert!(matches!(
            parse_grade_value(""),
            Err(ValidationError::InvalidGradeValue(_))
        ));
        assert!(matches!(
            parse_grade_value("NaN"),
            Err(ValidationError::GradeOutOfRange(_))
        ));
    }
}
