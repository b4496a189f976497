//! The upload command end to end against the in-memory store

mod common;

use common::{decimal, employee, HEADER};
use roster_ingest::{BatchRejection, ParseError};
use roster_server::features::employees::commands::upload::{handle, UPLOAD_SUCCESS_MESSAGE};
use roster_server::features::employees::{UploadEmployeesCommand, UploadEmployeesError};
use roster_server::features::FeatureState;
use roster_server::store::{EmployeeStore, InMemoryEmployeeStore};
use std::sync::Arc;
use std::time::Duration;

fn state(store: &InMemoryEmployeeStore) -> FeatureState {
    FeatureState::new(Arc::new(store.clone()))
}

fn csv_upload(name: &str, body: &str) -> UploadEmployeesCommand {
    UploadEmployeesCommand::new(name, Some("text/csv".to_string()), body.as_bytes().to_vec())
}

/// Wait until `count` uploads hold their name in the guard
async fn wait_for_in_flight(state: &FeatureState, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while state.uploads.in_flight_count() < count {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("uploads never registered");
}

#[tokio::test]
async fn test_valid_batch_persists_every_row() {
    let store = InMemoryEmployeeStore::new();
    let body = format!("{HEADER}1,john,John Doe,5000.00\n2,jane,Jane Smith,6000.00");

    let response = handle(state(&store), csv_upload("employees.csv", &body)).await.unwrap();

    assert_eq!(response.message, UPLOAD_SUCCESS_MESSAGE);
    assert_eq!(response.inserted, 2);
    assert_eq!(response.updated, 0);
    assert_eq!(response.file_name, "employees.csv");
    assert_eq!(response.checksum.len(), 64);

    assert_eq!(
        store.all().await,
        vec![
            employee("1", "john", "John Doe", "5000.00"),
            employee("2", "jane", "Jane Smith", "6000.00"),
        ]
    );
}

#[tokio::test]
async fn test_negative_salary_persists_nothing() {
    let store = InMemoryEmployeeStore::new();
    let body = format!("{HEADER}2,jane,Jane Smith,6000.00\n1,john,John Doe,-5.00");

    let err = handle(state(&store), csv_upload("employees.csv", &body)).await.unwrap_err();

    assert!(matches!(err, UploadEmployeesError::Parse(ParseError::InvalidSalary { .. })));
    assert_eq!(
        err.to_string(),
        "Invalid salary format. Salary must be a decimal value >= 0.0."
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_non_numeric_salary_persists_nothing() {
    let store = InMemoryEmployeeStore::new();
    let body = format!("{HEADER}1,john,John Doe,lots");

    let err = handle(state(&store), csv_upload("employees.csv", &body)).await.unwrap_err();

    assert!(matches!(err, UploadEmployeesError::Parse(ParseError::InvalidSalary { .. })));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_blank_row_persists_nothing() {
    let store = InMemoryEmployeeStore::new();
    let state = state(&store);
    let body = format!("{HEADER}1,john,John,1\n\n2,jane,Jane,2\n");

    let err = handle(state.clone(), csv_upload("employees.csv", &body)).await.unwrap_err();

    assert!(matches!(
        err,
        UploadEmployeesError::Parse(ParseError::MalformedRow { line: 3, fields: 1 })
    ));
    assert_eq!(err.to_string(), "Invalid CSV format. Each line should have 4 columns.");
    assert!(store.is_empty().await);
    assert_eq!(state.uploads.in_flight_count(), 0);
}

#[tokio::test]
async fn test_out_of_range_salary_exponent_is_a_parse_error() {
    let store = InMemoryEmployeeStore::new();
    let body = format!("{HEADER}1,john,John,1e9223372036854775807");

    let err = handle(state(&store), csv_upload("employees.csv", &body)).await.unwrap_err();

    assert!(matches!(err, UploadEmployeesError::Parse(ParseError::InvalidSalary { .. })));
    assert!(!err.is_server_error());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_wrong_field_count_persists_nothing() {
    let store = InMemoryEmployeeStore::new();
    for body in [
        format!("{HEADER}1,john,John Doe,5000\n2,jane,6000"),
        format!("{HEADER}1,john,John Doe,5000,extra"),
    ] {
        let err = handle(state(&store), csv_upload("employees.csv", &body)).await.unwrap_err();
        assert!(matches!(err, UploadEmployeesError::Parse(ParseError::MalformedRow { .. })));
        assert_eq!(err.to_string(), "Invalid CSV format. Each line should have 4 columns.");
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_duplicate_id_or_login_rejects_whole_batch() {
    let store = InMemoryEmployeeStore::new();

    let err = handle(
        state(&store),
        csv_upload("a.csv", &format!("{HEADER}1,john,John,1\n1,jane,Jane,2")),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        UploadEmployeesError::BatchValidation(BatchRejection::DuplicateId { .. })
    ));

    let err = handle(
        state(&store),
        csv_upload("b.csv", &format!("{HEADER}1,john,John,1\n2,john,Jane,2")),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        UploadEmployeesError::BatchValidation(BatchRejection::DuplicateLogin { .. })
    ));
    assert_eq!(
        err.to_string(),
        "One or more rows fail validation. The entire file is rejected."
    );

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_comment_rows_are_skipped() {
    let store = InMemoryEmployeeStore::new();
    let body = format!("{HEADER}#1,john,John Doe,5000.00\n1,john,John Doe,5000.00\n#9,,,0");

    let response = handle(state(&store), csv_upload("employees.csv", &body)).await.unwrap();

    assert_eq!(response.inserted, 1);
    assert_eq!(response.comments_skipped, 2);
    assert_eq!(store.all().await, vec![employee("1", "john", "John Doe", "5000.00")]);
}

#[tokio::test]
async fn test_reupload_overwrites_existing_record() {
    let store = InMemoryEmployeeStore::with_records([employee("1", "jdoe", "J. Doe", "5000.00")]);
    let body = format!("{HEADER}1,john,John Doe,7000.00");

    let response = handle(state(&store), csv_upload("employees.csv", &body)).await.unwrap();

    assert_eq!((response.inserted, response.updated), (0, 1));
    assert_eq!(store.len().await, 1);
    let record = store.find_by_id("1").await.unwrap().unwrap();
    assert_eq!(record, employee("1", "john", "John Doe", "7000.00"));
    assert_eq!(record.salary, decimal("7000.00"));
}

#[tokio::test]
async fn test_empty_payload_is_checked_first() {
    let store = InMemoryEmployeeStore::new();
    let state = state(&store);
    let _held = state.uploads.begin("employees.csv").unwrap();

    let command = UploadEmployeesCommand::new("employees.csv", Some("application/json".to_string()), vec![]);
    let err = handle(state.clone(), command).await.unwrap_err();

    assert!(matches!(err, UploadEmployeesError::EmptyPayload));
}

#[tokio::test]
async fn test_guard_is_checked_before_content_type() {
    let store = InMemoryEmployeeStore::new();
    let state = state(&store);
    let held = state.uploads.begin("employees.csv").unwrap();

    let command = UploadEmployeesCommand::new(
        "employees.csv",
        Some("application/json".to_string()),
        b"x".to_vec(),
    );
    let err = handle(state.clone(), command.clone()).await.unwrap_err();
    assert!(matches!(err, UploadEmployeesError::ConcurrentUpload(_)));

    drop(held);
    let err = handle(state.clone(), command).await.unwrap_err();
    assert!(matches!(err, UploadEmployeesError::UnsupportedContentType));
    assert_eq!(state.uploads.in_flight_count(), 0);
}

#[tokio::test]
async fn test_guard_released_after_every_outcome() {
    let store = InMemoryEmployeeStore::new();
    let state = state(&store);

    let bodies = [
        format!("{HEADER}1,john,John,1"),
        format!("{HEADER}1,john,John"),
        format!("{HEADER}1,john,John,-1"),
        format!("{HEADER}2,a,A,1\n3,a,B,1"),
    ];
    for body in bodies {
        let _ = handle(state.clone(), csv_upload("same.csv", &body)).await;
        assert!(!state.uploads.is_in_flight("same.csv"));
    }

    let command = UploadEmployeesCommand::new("same.csv", None, b"id\n".to_vec());
    let _ = handle(state.clone(), command).await;
    assert_eq!(state.uploads.in_flight_count(), 0);
}

#[tokio::test]
async fn test_store_failure_rolls_back_and_releases_guard() {
    let store = InMemoryEmployeeStore::with_records([
        employee("1", "a", "A", "1"),
        employee("2", "b", "B", "2"),
    ]);
    let state = state(&store);

    // Row 3 is new, row 1 takes a login that still belongs to row 2.
    let body = format!("{HEADER}3,c,C,3\n1,b,A,1");
    let err = handle(state.clone(), csv_upload("employees.csv", &body)).await.unwrap_err();

    assert!(matches!(err, UploadEmployeesError::Unexpected(_)));
    assert!(err.is_server_error());
    assert_eq!(
        store.all().await,
        vec![employee("1", "a", "A", "1"), employee("2", "b", "B", "2")]
    );
    assert_eq!(state.uploads.in_flight_count(), 0);
}

#[tokio::test]
async fn test_same_name_concurrent_uploads_one_wins() {
    let store = InMemoryEmployeeStore::new();
    let state = state(&store);

    // Holding the store keeps the first upload parked after the guard check.
    let blocker = store.begin().await.unwrap();

    let first = tokio::spawn(handle(
        state.clone(),
        csv_upload("employees.csv", &format!("{HEADER}1,john,John Doe,5000.00")),
    ));
    wait_for_in_flight(&state, 1).await;

    let second = handle(
        state.clone(),
        csv_upload("employees.csv", &format!("{HEADER}2,jane,Jane Smith,6000.00")),
    )
    .await
    .unwrap_err();
    assert!(matches!(second, UploadEmployeesError::ConcurrentUpload(_)));
    assert_eq!(
        second.to_string(),
        "Another upload is already in progress. Please try again later."
    );

    drop(blocker);
    let first = first.await.unwrap().unwrap();
    assert_eq!(first.inserted, 1);

    assert_eq!(state.uploads.in_flight_count(), 0);
    assert_eq!(store.all().await, vec![employee("1", "john", "John Doe", "5000.00")]);
}

#[tokio::test]
async fn test_different_names_proceed_independently() {
    let store = InMemoryEmployeeStore::new();
    let state = state(&store);

    let blocker = store.begin().await.unwrap();

    let a = tokio::spawn(handle(
        state.clone(),
        csv_upload("a.csv", &format!("{HEADER}1,john,John Doe,5000.00")),
    ));
    let b = tokio::spawn(handle(
        state.clone(),
        csv_upload("b.csv", &format!("{HEADER}2,jane,Jane Smith,6000.00")),
    ));
    wait_for_in_flight(&state, 2).await;

    drop(blocker);
    assert_eq!(a.await.unwrap().unwrap().inserted, 1);
    assert_eq!(b.await.unwrap().unwrap().inserted, 1);

    assert_eq!(state.uploads.in_flight_count(), 0);
    assert_eq!(store.len().await, 2);
}
