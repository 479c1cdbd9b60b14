//! Gradebook domain model.
//!
//! # Responsibility
//! - Define the `Student` and `Grade` records the store persists.
//! - Own field validation applied at every write boundary.
//!
//! # Invariants
//! - A `Grade` always belongs to exactly one `Student`.
//! - Constructors return validated values; struct literals must call
//!   `validate()` before persistence.

pub mod grade;
pub mod student;
pub mod validation;
