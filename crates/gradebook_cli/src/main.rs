//! Command-line front end for the gradebook.
//!
//! # Responsibility
//! - Parse operator commands and forward them to `GradebookService`.
//! - Open the store once per invocation and always close it.
//! - Map conflicts/validation failures and storage failures to distinct exit codes.

mod output;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use gradebook_core::{
    default_log_level, error_chain, init_logging, GradebookService, ServiceError,
    SqliteRecordStore, StoreConfig, DEFAULT_DB_FILE_NAME,
};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_REJECTED: u8 = 1;
const EXIT_STORAGE: u8 = 2;

#[derive(Parser)]
#[command(name = "gradebook", version, about = "Record students and per-subject grades")]
struct Cli {
    /// Path to the gradebook file
    #[arg(long, global = true, default_value = DEFAULT_DB_FILE_NAME)]
    db: PathBuf,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Directory for rolling log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register, list or delete students
    #[command(subcommand)]
    Student(StudentCommand),
    /// Register, list or delete grades
    #[command(subcommand)]
    Grade(GradeCommand),
    /// Show one student with all of their grades
    Report {
        student_id: String,
        #[command(flatten)]
        format: FormatArgs,
    },
}

#[derive(Subcommand)]
enum StudentCommand {
    /// Register a new student
    Add { id: String, name: String },
    /// List students sorted by name
    List {
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Delete a student and all of their grades
    Delete { id: String },
}

#[derive(Subcommand)]
enum GradeCommand {
    /// Register a grade (0 to 10, comma or dot decimals)
    Add {
        student_id: String,
        subject: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// List a student's grades sorted by subject
    List {
        student_id: String,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Delete one grade
    Delete { student_id: String, subject: String },
}

#[derive(Args)]
struct FormatArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (message, code) = failure_report(&err);
            eprintln!("error: {message}");
            ExitCode::from(code)
        }
    }
}

/// The single stderr line and exit code for a failed command.
fn failure_report(err: &anyhow::Error) -> (String, u8) {
    match err.downcast_ref::<ServiceError>() {
        Some(service_err) if !service_err.is_storage_unavailable() => {
            (service_err.user_message(), EXIT_REJECTED)
        }
        _ => (format!("{err:#}"), EXIT_STORAGE),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = StoreConfig {
        db_path: cli.db,
        log_level: cli
            .log_level
            .unwrap_or_else(|| default_log_level().to_string()),
        log_dir: cli.log_dir,
    };

    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    if let Err(err) = init_logging(&config.log_settings(&cwd)) {
        eprintln!("warning: file logging disabled: {}", error_chain(&err));
    }

    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );
    let store = SqliteRecordStore::open(&config.db_path)
        .with_context(|| format!("failed to open gradebook `{}`", config.db_path.display()))?;
    let mut service = GradebookService::new(store);

    let outcome = execute(&mut service, cli.command);
    let closed = service
        .into_store()
        .close()
        .context("failed to close gradebook");
    outcome?;
    closed
}

fn execute(
    service: &mut GradebookService<SqliteRecordStore>,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Student(StudentCommand::Add { id, name }) => {
            let student = service.register_student(&id, &name)?;
            println!("registered {}", student.label());
        }
        Command::Student(StudentCommand::List { format }) => {
            let students = service.list_students()?;
            if format.json {
                println!("{}", serde_json::to_string_pretty(&students)?);
            } else {
                print!("{}", output::students_table(&students));
            }
        }
        Command::Student(StudentCommand::Delete { id }) => {
            service.delete_student(&id)?;
            println!("deleted student {} and their grades", id.trim());
        }
        Command::Grade(GradeCommand::Add {
            student_id,
            subject,
            value,
        }) => {
            let grade = service.register_grade(&student_id, &subject, &value)?;
            println!(
                "registered {} = {} for {}",
                grade.subject, grade.value, grade.student_id
            );
        }
        Command::Grade(GradeCommand::List { student_id, format }) => {
            let grades = service.student_grades(&student_id)?;
            if format.json {
                println!("{}", serde_json::to_string_pretty(&grades)?);
            } else {
                print!("{}", output::grades_table(&grades));
            }
        }
        Command::Grade(GradeCommand::Delete {
            student_id,
            subject,
        }) => {
            service.delete_grade(&student_id, &subject)?;
            println!("deleted {} for {}", subject.trim(), student_id.trim());
        }
        Command::Report { student_id, format } => {
            let report = service.student_report(&student_id)?;
            if format.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", output::report(&report));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        failure_report, Cli, Command, GradeCommand, StudentCommand, EXIT_REJECTED, EXIT_STORAGE,
    };
    use anyhow::Context;
    use clap::{CommandFactory, Parser};
    use gradebook_core::SqliteRecordStore;
    use std::path::PathBuf;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn db_defaults_to_working_directory_file() {
        let cli = Cli::parse_from(["gradebook", "student", "list"]);
        assert_eq!(cli.db, PathBuf::from(gradebook_core::DEFAULT_DB_FILE_NAME));
        assert!(matches!(
            cli.command,
            Command::Student(StudentCommand::List { .. })
        ));
    }

    #[test]
    fn grade_add_keeps_raw_value_text() {
        let cli = Cli::parse_from([
            "gradebook", "--db", "/tmp/x.db", "grade", "add", "S1", "Math", "7,5",
        ]);
        assert_eq!(cli.db, PathBuf::from("/tmp/x.db"));
        match cli.command {
            Command::Grade(GradeCommand::Add {
                student_id,
                subject,
                value,
            }) => {
                assert_eq!(student_id, "S1");
                assert_eq!(subject, "Math");
                assert_eq!(value, "7,5");
            }
            _ => panic!("expected grade add"),
        }
    }

    #[test]
    fn open_failure_is_reported_once_with_storage_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("grades.db");

        let err = SqliteRecordStore::open(&path)
            .context("failed to open gradebook")
            .err()
            .unwrap();
        let (message, code) = failure_report(&err);

        assert_eq!(code, EXIT_STORAGE);
        assert!(message
            .starts_with("failed to open gradebook: storage unavailable: sqlite engine error: "));
        assert_eq!(message.matches("storage unavailable").count(), 1);
        assert_eq!(message.matches("sqlite engine error").count(), 1);
    }

    #[test]
    fn conflict_prints_named_message_with_rejected_exit_code() {
        let service =
            gradebook_core::GradebookService::new(SqliteRecordStore::open_in_memory().unwrap());
        service.register_student("S1", "Alice").unwrap();
        let err = anyhow::Error::from(service.register_student("S1", "Bob").unwrap_err());

        let (message, code) = failure_report(&err);
        assert_eq!(code, EXIT_REJECTED);
        assert_eq!(message, "a student with id `S1` already exists");
    }
}
