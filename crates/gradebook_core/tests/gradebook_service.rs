use gradebook_core::{
    error_chain, GradebookService, RecordStore, ServiceError, SqliteRecordStore, ValidationError,
};

fn service() -> GradebookService<SqliteRecordStore> {
    GradebookService::new(SqliteRecordStore::open_in_memory().unwrap())
}

#[test]
fn register_student_trims_input() {
    let service = service();
    let created = service.register_student("  2024001 ", " Alice ").unwrap();
    assert_eq!(created.id, "2024001");
    assert_eq!(created.name, "Alice");

    let listed = service.list_students().unwrap();
    assert_eq!(listed, vec![created]);
}

#[test]
fn register_student_rejects_blank_fields() {
    let service = service();

    let err = service.register_student("", "Alice").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::EmptyStudentId)
    ));
    let err = service.register_student("1", "  ").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::EmptyStudentName)
    ));
    assert!(service.list_students().unwrap().is_empty());
}

#[test]
fn duplicate_student_surfaces_named_conflict() {
    let service = service();
    service.register_student("S1", "Alice").unwrap();

    let err = service.register_student("S1", "Bob").unwrap_err();
    assert!(err.is_duplicate_key());
    assert!(!err.is_storage_unavailable());
    assert_eq!(err.code(), "duplicate_key");
    assert!(err.user_message().contains("S1"));
}

#[test]
fn register_grade_parses_comma_decimal() {
    let service = service();
    service.register_student("S1", "Alice").unwrap();

    let grade = service.register_grade("S1", " Math ", "7,5").unwrap();
    assert_eq!(grade.subject, "Math");
    assert_eq!(grade.value, 7.5);

    let grades = service.student_grades("S1").unwrap();
    assert_eq!(grades, vec![grade]);
}

#[test]
fn register_grade_rejects_bad_values() {
    let service = service();
    service.register_student("S1", "Alice").unwrap();

    let err = service.register_grade("S1", "Math", "ten").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::InvalidGradeValue(_))
    ));
    let err = service.register_grade("S1", "Math", "10.5").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::GradeOutOfRange(_))
    ));
    let err = service.register_grade("S1", "", "5").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::EmptySubject)
    ));
    assert!(service.student_grades("S1").unwrap().is_empty());
}

#[test]
fn duplicate_grade_names_the_subject() {
    let service = service();
    service.register_student("S1", "Alice").unwrap();
    service.register_grade("S1", "Math", "8.5").unwrap();

    let err = service.register_grade("S1", "Math", "9").unwrap_err();
    assert!(err.is_duplicate_key());
    assert!(err.user_message().contains("Math"));
}

#[test]
fn grade_for_unknown_student_maps_to_not_found() {
    let service = service();

    let err = service.register_grade("ghost", "Math", "5").unwrap_err();
    assert!(matches!(err, ServiceError::StudentNotFound(ref id) if id == "ghost"));
}

#[test]
fn student_report_collects_sorted_grades() {
    let service = service();
    service.register_student("S1", "Alice").unwrap();
    service.register_grade("S1", "Science", "6").unwrap();
    service.register_grade("S1", "Math", "9").unwrap();

    let report = service.student_report("S1").unwrap();
    assert_eq!(report.student.name, "Alice");
    let subjects: Vec<_> = report.grades.iter().map(|g| g.subject.as_str()).collect();
    assert_eq!(subjects, vec!["Math", "Science"]);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["student"]["id"], "S1");
    assert_eq!(json["grades"][0]["subject"], "Math");
}

#[test]
fn student_report_for_unknown_student_is_not_found() {
    let service = service();
    let err = service.student_report("ghost").unwrap_err();
    assert!(matches!(err, ServiceError::StudentNotFound(_)));
    assert_eq!(err.code(), "student_not_found");
}

#[test]
fn delete_student_cascades_and_is_idempotent() {
    let mut service = service();
    service.register_student("S1", "Alice").unwrap();
    service.register_grade("S1", "Math", "8").unwrap();

    service.delete_student("S1").unwrap();
    service.delete_student("S1").unwrap();

    assert!(service.store().find_student("S1").unwrap().is_none());
    assert!(service.student_grades("S1").unwrap().is_empty());
}

#[test]
fn delete_grade_keeps_other_subjects() {
    let service = service();
    service.register_student("S1", "Alice").unwrap();
    service.register_grade("S1", "Math", "8").unwrap();
    service.register_grade("S1", "Art", "9").unwrap();

    service.delete_grade("S1", " Math ").unwrap();

    let grades = service.student_grades("S1").unwrap();
    assert_eq!(grades.len(), 1);
    assert_eq!(grades[0].subject, "Art");
}

#[test]
fn into_store_allows_explicit_close() {
    let service = service();
    service.register_student("S1", "Alice").unwrap();
    service.into_store().close().unwrap();
}

const STORAGE_SUMMARY: &str = "the gradebook file could not be accessed; see the log for details";

#[test]
fn corrupt_grade_row_surfaces_as_storage_failure() {
    let service = service();
    service.register_student("S1", "Alice").unwrap();
    service
        .store()
        .connection()
        .execute(
            "INSERT INTO Grade (subject, value, student_id) VALUES ('Math', 42.0, 'S1');",
            [],
        )
        .unwrap();

    let err = service.student_grades("S1").unwrap_err();
    assert!(err.is_storage_unavailable());
    assert!(!err.is_duplicate_key());
    assert_eq!(err.code(), "storage_unavailable");
    assert_eq!(err.user_message(), STORAGE_SUMMARY);

    let err = service.student_report("S1").unwrap_err();
    assert!(err.is_storage_unavailable());
}

#[test]
fn engine_failure_mid_session_is_storage_unavailable() {
    let service = service();
    service.register_student("S1", "Alice").unwrap();
    service
        .store()
        .connection()
        .execute_batch("DROP TABLE Grade;")
        .unwrap();

    let err = service.register_grade("S1", "Math", "8").unwrap_err();
    assert!(matches!(err, ServiceError::Repo(_)));
    assert!(err.is_storage_unavailable());
    assert!(!err.is_duplicate_key());
    assert_eq!(err.code(), "storage_unavailable");
    assert_eq!(err.user_message(), STORAGE_SUMMARY);

    let err = service.student_grades("S1").unwrap_err();
    assert!(err.is_storage_unavailable());
    assert_eq!(err.user_message(), STORAGE_SUMMARY);
}

#[test]
fn storage_error_chain_names_each_layer_once() {
    let service = service();
    service
        .store()
        .connection()
        .execute_batch("DROP TABLE Grade;")
        .unwrap();

    let err = service.student_grades("S1").unwrap_err();
    assert_eq!(err.to_string(), "storage unavailable");

    let chain = error_chain(&err);
    assert!(chain.starts_with("storage unavailable: sqlite engine error: "));
    assert!(chain.contains("no such table: Grade"));
    assert_eq!(chain.matches("no such table").count(), 1);
}
