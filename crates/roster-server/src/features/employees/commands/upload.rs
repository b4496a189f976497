use chrono::{DateTime, Utc};
use mediator::Request;
use roster_common::checksum::sha256_hex;
use roster_ingest::{
    BatchRejection, BatchValidator, ConcurrentUploadError, ParseError, RecordParser,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DbError;
use crate::features::FeatureState;
use crate::ingest::UpsertEngine;

/// Success message returned to uploaders
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully.";

/// Message for failures on the server side of an upload
pub const PROCESSING_ERROR_MESSAGE: &str = "An error occurred while processing the file.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadEmployeesCommand {
    /// Name the upload is registered under while it runs
    pub declared_name: String,
    pub content_type: Option<String>,
    #[serde(skip)]
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadEmployeesResponse {
    pub message: String,
    pub upload_id: Uuid,
    pub file_name: String,
    pub inserted: usize,
    pub updated: usize,
    pub comments_skipped: usize,
    pub checksum: String,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadEmployeesError {
    #[error("File empty")]
    EmptyPayload,

    #[error(transparent)]
    ConcurrentUpload(#[from] ConcurrentUploadError),

    #[error("Invalid file format. Please upload a CSV file.")]
    UnsupportedContentType,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("One or more rows fail validation. The entire file is rejected.")]
    BatchValidation(#[from] BatchRejection),

    #[error("An error occurred while processing the file.")]
    Io(#[source] std::io::Error),

    #[error("Unexpected error while saving employees: {0}")]
    Unexpected(#[from] DbError),
}

impl UploadEmployeesError {
    /// Failures caused by the server rather than by the uploaded file
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            UploadEmployeesError::Io(_)
                | UploadEmployeesError::Parse(ParseError::Read(_))
                | UploadEmployeesError::Unexpected(_)
        )
    }
}

impl Request<Result<UploadEmployeesResponse, UploadEmployeesError>> for UploadEmployeesCommand {}

impl crate::cqrs::middleware::Command for UploadEmployeesCommand {}

impl UploadEmployeesCommand {
    pub fn new(
        declared_name: impl Into<String>,
        content_type: Option<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            declared_name: declared_name.into(),
            content_type,
            content,
        }
    }

    pub fn validate(&self) -> Result<(), UploadEmployeesError> {
        if self.content.is_empty() {
            return Err(UploadEmployeesError::EmptyPayload);
        }
        Ok(())
    }

    /// Declared content type is `text/csv`, parameters such as charset ignored
    pub fn is_csv(&self) -> bool {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.parse::<mime::Mime>().ok())
            .is_some_and(|m| m.essence_str() == mime::TEXT_CSV.essence_str())
    }
}

/// Run one upload end to end: empty check, name registration, content type,
/// parse, batch validation, transactional upsert.
///
/// The declared name stays registered from the guard check until this
/// function returns, whatever the outcome.
#[tracing::instrument(
    skip(state, command),
    fields(upload = %command.declared_name, bytes = command.content.len())
)]
pub async fn handle(
    state: FeatureState,
    command: UploadEmployeesCommand,
) -> Result<UploadEmployeesResponse, UploadEmployeesError> {
    command.validate()?;

    let _permit = state.uploads.begin(&command.declared_name)?;

    if !command.is_csv() {
        tracing::warn!(content_type = ?command.content_type, "Rejected non-CSV upload");
        return Err(UploadEmployeesError::UnsupportedContentType);
    }

    let rows = RecordParser::new().parse(command.content.as_slice())?;
    let batch = BatchValidator::new().validate(rows)?;

    let stats = UpsertEngine::new(state.store.clone()).upsert(&batch).await?;

    let response = UploadEmployeesResponse {
        message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        upload_id: Uuid::new_v4(),
        file_name: command.declared_name.clone(),
        inserted: stats.inserted,
        updated: stats.updated,
        comments_skipped: batch.comments_skipped(),
        checksum: sha256_hex(&command.content),
        processed_at: Utc::now(),
    };

    tracing::info!(
        upload_id = %response.upload_id,
        inserted = response.inserted,
        updated = response.updated,
        "Employee upload processed"
    );

    Ok(response)
}
