//! Error types for the docshift server

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pageset_core::PageSetError;
use serde::Serialize;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Wrong MIME type, oversize file, too many files or a malformed
    /// multipart body. Raised before anything is written to disk.
    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    #[error("{0}")]
    MissingInput(String),

    #[error("{0}")]
    Validation(String),

    #[error("{context}: {details}")]
    Transform {
        context: &'static str,
        details: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    code: &'static str,
}

impl ServerError {
    /// Attach the operation name to a core failure
    pub fn from_core(context: &'static str, err: PageSetError) -> Self {
        match err {
            PageSetError::Validation(msg) => ServerError::Validation(msg),
            other => ServerError::Transform {
                context,
                details: other.to_string(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UploadRejected(_) | ServerError::MissingInput(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Validation(_)
            | ServerError::Transform { .. }
            | ServerError::Io(_)
            | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ServerError::UploadRejected(_) => "UPLOAD_REJECTED",
            ServerError::MissingInput(_) => "INVALID_REQUEST",
            ServerError::Validation(_) => "VALIDATION_FAILED",
            ServerError::Transform { .. } => "TRANSFORM_FAILED",
            ServerError::Io(_) | ServerError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        ServerError::UploadRejected(err.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (error, details) = match &self {
            ServerError::UploadRejected(msg)
            | ServerError::MissingInput(msg)
            | ServerError::Validation(msg) => (msg.clone(), None),
            ServerError::Transform { context, details } => {
                (context.to_string(), Some(details.clone()))
            }
            ServerError::Io(e) => ("Internal error".to_string(), Some(e.to_string())),
            ServerError::Internal(msg) => ("Internal error".to_string(), Some(msg.clone())),
        };

        if status.is_server_error() {
            tracing::error!(code, "{}", self);
        } else {
            tracing::warn!(code, "{}", self);
        }

        let body = ErrorResponse {
            success: false,
            error,
            details,
            code,
        };

        (status, Json(body)).into_response()
    }
}
