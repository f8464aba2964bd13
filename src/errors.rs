//! API error taxonomy and its mapping onto the wire protocol.
//!
//! Every failure a handler can return is one of these variants, and every
//! variant renders as `{"success": false, "message": ...}` with its status
//! code. Internal faults are logged with their detail and sent to the client
//! as a generic message — no paths or source chains leak out.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::{
    storage_service::StorageError, task_store::TaskStoreError, upload_pipeline::UploadError,
};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Input was well-formed but violates a policy rule.
    #[error("{0}")]
    Validation(String),

    /// A size or count limit was exceeded.
    #[error("{0}")]
    CapacityExceeded(String),

    /// The named resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request body could not be parsed.
    #[error("{0}")]
    MalformedRequest(String),

    /// Filesystem or other unexpected fault. The message stays internal.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::CapacityExceeded(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed with internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (self.status(), body).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            // Traversal attempts get the same answer as absent files so the
            // guard cannot be probed apart from a miss.
            StorageError::FileNotFound(_) | StorageError::InvalidName(_) => {
                ApiError::NotFound("File not found".to_string())
            }
            StorageError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::NoFiles
            | UploadError::NotAnImage { .. }
            | UploadError::PolicyRejected { .. } => ApiError::Validation(err.to_string()),
            UploadError::TooLarge | UploadError::TooManyFiles => {
                ApiError::CapacityExceeded(err.to_string())
            }
            UploadError::UnexpectedField { .. } | UploadError::Multipart(_) => {
                ApiError::MalformedRequest(err.to_string())
            }
            UploadError::Storage(e) => e.into(),
        }
    }
}

impl From<TaskStoreError> for ApiError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::Invalid { .. } => ApiError::Validation(err.to_string()),
            TaskStoreError::Io(e) => ApiError::Internal(e.to_string()),
            TaskStoreError::Json(e) => ApiError::Internal(e.to_string()),
        }
    }
}
