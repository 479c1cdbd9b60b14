//! Process configuration.
//!
//! The storage file path is the only functional setting; logging settings ride
//! along. Relative paths resolve against the working directory.

use crate::logging::{default_log_level, LogSettings};
use std::path::{Path, PathBuf};

/// Gradebook file created in the working directory when no path is given.
pub const DEFAULT_DB_FILE_NAME: &str = "student_grades.db";
/// Log directory used when none is given.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Settings for one gradebook process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl StoreConfig {
    /// Logger settings with `log_dir` made absolute against `base_dir`.
    pub fn log_settings(&self, base_dir: &Path) -> LogSettings {
        LogSettings::new(self.log_level.clone(), absolutize(&self.log_dir, base_dir))
    }
}

fn absolutize(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
