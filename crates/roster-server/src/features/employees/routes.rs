//! Employee API routes
//!
//! # Route Structure
//!
//! - `POST /api/v1/employees/upload` - Upload a CSV file of employees (multipart, field `file`)
//! - `GET /api/v1/employees` - List employees in a salary range
//! - `GET /api/v1/employees/:id` - Get a single employee
//! - `PUT /api/v1/employees/:id` - Update an employee
//! - `POST /api/v1/employees/duplicates` - Report ids and logins that already exist

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::FeatureState;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use roster_ingest::ParseError;
use serde_json::json;

use super::{
    commands::{
        upload::PROCESSING_ERROR_MESSAGE, UpdateEmployeeCommand, UpdateEmployeeError,
        UploadEmployeesCommand, UploadEmployeesError,
    },
    queries::{
        FindDuplicatesError, FindDuplicatesQuery, GetEmployeeError, GetEmployeeQuery,
        ListEmployeesError, ListEmployeesQuery,
    },
};

/// Multipart field carrying the uploaded file
pub const UPLOAD_FIELD: &str = "file";

pub fn employees_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_employees))
        .route("/upload", post(upload_employees))
        .route("/duplicates", post(find_duplicates))
        .route("/:id", get(get_employee).put(update_employee))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Upload a CSV file of employees
///
/// # Response
///
/// - `200 OK` - File accepted and persisted
/// - `400 Bad Request` - Empty file, wrong content type, malformed rows, rejected batch
/// - `409 Conflict` - An upload with the same file name is in progress
/// - `413 Payload Too Large` - Body exceeds the configured upload limit
/// - `500 Internal Server Error` - Payload could not be read or stored
#[tracing::instrument(skip(state, multipart))]
async fn upload_employees(
    State(state): State<FeatureState>,
    mut multipart: Multipart,
) -> Result<Response, EmployeeApiError> {
    let mut command = UploadEmployeesCommand::new(String::new(), None, Vec::new());

    while let Some(field) = multipart.next_field().await.map_err(EmployeeApiError::multipart)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        command.declared_name = field.file_name().unwrap_or_default().to_string();
        command.content_type = field.content_type().map(str::to_string);
        command.content = field
            .bytes()
            .await
            .map_err(EmployeeApiError::multipart)?
            .to_vec();
    }

    let response = super::commands::upload::handle(state, command).await?;

    tracing::info!(
        upload_id = %response.upload_id,
        file_name = %response.file_name,
        checksum = %response.checksum,
        "Employee file uploaded via API"
    );

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// Overwrite login, name and salary of an employee
#[tracing::instrument(skip(state, command), fields(id = %id))]
async fn update_employee(
    State(state): State<FeatureState>,
    Path(id): Path<String>,
    Json(mut command): Json<UpdateEmployeeCommand>,
) -> Result<Response, EmployeeApiError> {
    command.id = id;

    let response = super::commands::update::handle(state, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

#[tracing::instrument(skip(state))]
async fn list_employees(
    State(state): State<FeatureState>,
    Query(query): Query<ListEmployeesQuery>,
) -> Result<Response, EmployeeApiError> {
    let response = super::queries::list::handle(state, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(state))]
async fn get_employee(
    State(state): State<FeatureState>,
    Path(id): Path<String>,
) -> Result<Response, EmployeeApiError> {
    let response = super::queries::get::handle(state, GetEmployeeQuery { id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(state, query))]
async fn find_duplicates(
    State(state): State<FeatureState>,
    Json(query): Json<FindDuplicatesQuery>,
) -> Result<Response, EmployeeApiError> {
    let response = super::queries::duplicates::handle(state, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum EmployeeApiError {
    PayloadTooLarge(MultipartError),
    Upload(UploadEmployeesError),
    Update(UpdateEmployeeError),
    Get(GetEmployeeError),
    List(ListEmployeesError),
    Duplicates(FindDuplicatesError),
}

impl EmployeeApiError {
    /// Body-limit violations keep their 413; any other failure to read the
    /// multipart stream is a payload read failure.
    fn multipart(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(err)
        } else {
            Self::Upload(UploadEmployeesError::Io(std::io::Error::other(err)))
        }
    }
}

impl From<UploadEmployeesError> for EmployeeApiError {
    fn from(err: UploadEmployeesError) -> Self {
        Self::Upload(err)
    }
}

impl From<UpdateEmployeeError> for EmployeeApiError {
    fn from(err: UpdateEmployeeError) -> Self {
        Self::Update(err)
    }
}

impl From<GetEmployeeError> for EmployeeApiError {
    fn from(err: GetEmployeeError) -> Self {
        Self::Get(err)
    }
}

impl From<ListEmployeesError> for EmployeeApiError {
    fn from(err: ListEmployeesError) -> Self {
        Self::List(err)
    }
}

impl From<FindDuplicatesError> for EmployeeApiError {
    fn from(err: FindDuplicatesError) -> Self {
        Self::Duplicates(err)
    }
}

fn error_response(status: StatusCode, error: ErrorResponse) -> Response {
    (status, Json(error)).into_response()
}

fn upload_error_response(err: UploadEmployeesError) -> Response {
    let message = err.to_string();
    match err {
        UploadEmployeesError::EmptyPayload => {
            error_response(StatusCode::BAD_REQUEST, ErrorResponse::new("EMPTY_FILE", message))
        },
        UploadEmployeesError::ConcurrentUpload(_) => {
            error_response(StatusCode::CONFLICT, ErrorResponse::new("UPLOAD_IN_PROGRESS", message))
        },
        UploadEmployeesError::UnsupportedContentType => error_response(
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("INVALID_FILE_FORMAT", message),
        ),
        UploadEmployeesError::Parse(
            ref parse @ (ParseError::MalformedRow { .. } | ParseError::InvalidSalary { .. }),
        ) => error_response(
            StatusCode::BAD_REQUEST,
            ErrorResponse::with_details("INVALID_CSV", message, json!({ "line": parse.line() })),
        ),
        UploadEmployeesError::BatchValidation(ref rejection) => error_response(
            StatusCode::BAD_REQUEST,
            ErrorResponse::with_details(
                "VALIDATION_ERROR",
                message,
                json!({ "reason": rejection.to_string() }),
            ),
        ),
        UploadEmployeesError::Parse(ParseError::Read(ref e)) => {
            tracing::error!(error = %e, "Failed to read uploaded CSV");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("FILE_PROCESSING_ERROR", PROCESSING_ERROR_MESSAGE),
            )
        },
        UploadEmployeesError::Io(ref e) => {
            tracing::error!(error = %e, "Failed to read upload payload");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("FILE_PROCESSING_ERROR", message),
            )
        },
        UploadEmployeesError::Unexpected(ref e) => {
            tracing::error!(error = %e, "Store error during employee upload");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("INTERNAL_ERROR", "An unexpected error occurred"),
            )
        },
    }
}

fn database_error_response(err: &crate::db::DbError) -> Response {
    tracing::error!(error = %err, "Database error");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::new("DATABASE_ERROR", "A database error occurred"),
    )
}

impl IntoResponse for EmployeeApiError {
    fn into_response(self) -> Response {
        match self {
            EmployeeApiError::PayloadTooLarge(e) => error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponse::new("PAYLOAD_TOO_LARGE", e.body_text()),
            ),
            EmployeeApiError::Upload(e) => upload_error_response(e),

            EmployeeApiError::Update(
                e @ (UpdateEmployeeError::IdRequired | UpdateEmployeeError::Validation(_)),
            ) => error_response(
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", e.to_string()),
            ),
            EmployeeApiError::Update(e @ UpdateEmployeeError::NotFound(_)) => {
                error_response(StatusCode::NOT_FOUND, ErrorResponse::new("NOT_FOUND", e.to_string()))
            },
            EmployeeApiError::Update(e @ UpdateEmployeeError::LoginTaken(_)) => error_response(
                StatusCode::CONFLICT,
                ErrorResponse::new("DUPLICATE_LOGIN", e.to_string()),
            ),
            EmployeeApiError::Update(UpdateEmployeeError::Database(e)) => {
                database_error_response(&e)
            },

            EmployeeApiError::Get(e @ GetEmployeeError::IdRequired) => error_response(
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", e.to_string()),
            ),
            EmployeeApiError::Get(e @ GetEmployeeError::NotFound(_)) => {
                error_response(StatusCode::NOT_FOUND, ErrorResponse::new("NOT_FOUND", e.to_string()))
            },
            EmployeeApiError::Get(GetEmployeeError::Database(e)) => database_error_response(&e),

            EmployeeApiError::List(ListEmployeesError::Database(e)) => database_error_response(&e),
            EmployeeApiError::List(e) => error_response(
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", e.to_string()),
            ),

            EmployeeApiError::Duplicates(FindDuplicatesError::Database(e)) => {
                database_error_response(&e)
            },
        }
    }
}

impl std::fmt::Display for EmployeeApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PayloadTooLarge(e) => write!(f, "{}", e),
            Self::Upload(e) => write!(f, "{}", e),
            Self::Update(e) => write!(f, "{}", e),
            Self::Get(e) => write!(f, "{}", e),
            Self::List(e) => write!(f, "{}", e),
            Self::Duplicates(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EmployeeApiError::Upload(UploadEmployeesError::EmptyPayload);
        assert_eq!(err.to_string(), "File empty");
    }

    #[test]
    fn test_upload_error_statuses() {
        let cases = [
            (UploadEmployeesError::EmptyPayload, StatusCode::BAD_REQUEST),
            (UploadEmployeesError::UnsupportedContentType, StatusCode::BAD_REQUEST),
            (
                UploadEmployeesError::Parse(ParseError::MalformedRow { line: 2, fields: 3 }),
                StatusCode::BAD_REQUEST,
            ),
            (
                UploadEmployeesError::Io(std::io::Error::other("disk")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                UploadEmployeesError::Unexpected(crate::db::DbError::config("x")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(EmployeeApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_update_error_statuses() {
        let not_found = EmployeeApiError::from(UpdateEmployeeError::NotFound("1".to_string()));
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let taken = EmployeeApiError::from(UpdateEmployeeError::LoginTaken("a".to_string()));
        assert_eq!(taken.into_response().status(), StatusCode::CONFLICT);
    }
}
