//! Core domain logic for the student gradebook.
//! This crate is the single source of truth for record invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{StoreConfig, DEFAULT_DB_FILE_NAME};
pub use logging::{
    default_log_level, error_chain, init_logging, logging_status, LogSettings, LoggingError,
};
pub use model::grade::{Grade, GradeId, NewGrade};
pub use model::student::{Student, StudentId};
pub use model::validation::{parse_grade_value, ValidationError, GRADE_MAX, GRADE_MIN};
pub use repo::record_store::{RecordStore, RepoError, RepoResult, SqliteRecordStore};
pub use service::gradebook_service::{
    GradebookService, ServiceError, ServiceResult, StudentReport,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
