//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the record store contract used by services.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - Repository writes validate domain values before persistence.
//! - Constraint violations surface as semantic errors (`DuplicateStudent`,
//!   `DuplicateGrade`, `UnknownStudent`), everything else as `Db`.

pub mod record_store;
