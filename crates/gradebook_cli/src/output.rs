//! Plain-text tables for terminal output.

use gradebook_core::{Grade, Student, StudentReport};
use std::fmt::Write;

pub fn students_table(students: &[Student]) -> String {
    if students.is_empty() {
        return "no students registered\n".to_string();
    }
    let id_width = column_width("ID", students.iter().map(|s| s.id.as_str()));
    let mut out = format!("{:<id_width$}  NAME\n", "ID");
    for student in students {
        let _ = writeln!(out, "{:<id_width$}  {}", student.id, student.name);
    }
    out
}

pub fn grades_table(grades: &[Grade]) -> String {
    if grades.is_empty() {
        return "no grades recorded\n".to_string();
    }
    let subject_width = column_width("SUBJECT", grades.iter().map(|g| g.subject.as_str()));
    let mut out = format!("{:<subject_width$}  VALUE\n", "SUBJECT");
    for grade in grades {
        let _ = writeln!(out, "{:<subject_width$}  {}", grade.subject, grade.value);
    }
    out
}

pub fn report(report: &StudentReport) -> String {
    format!("{}\n{}", report.student.label(), grades_table(&report.grades))
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|value| value.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}
