//! HTTP error mapping for the task board API.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use crate::task::{ports::TaskStoreError, services::TaskBoardError};

/// Errors surfaced by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or out-of-range input.
    #[error("{0}")]
    BadRequest(String),
    /// The referenced task does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The store failed; the transaction was rolled back.
    #[error("{message}")]
    Internal {
        /// Operation-level summary.
        message: String,
        /// Underlying failure.
        error: String,
    },
}

/// Body of every error response.
#[derive(Debug, Serialize)]
struct ErrorPayload {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiError {
    /// Maps a service failure, labelling store failures with `operation`.
    #[must_use]
    pub fn from_board(err: TaskBoardError, operation: &str) -> Self {
        match err {
            TaskBoardError::Domain(domain) => Self::BadRequest(domain.to_string()),
            TaskBoardError::Store(TaskStoreError::NotFound(_)) => {
                Self::NotFound("Task not found".to_owned())
            }
            TaskBoardError::Store(store) => Self::Internal {
                message: format!("Failed to {operation}"),
                error: store.to_string(),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, payload) = match self {
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorPayload {
                    message,
                    error: None,
                },
            ),
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorPayload {
                    message,
                    error: None,
                },
            ),
            Self::Internal { message, error } => {
                error!(%message, %error, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorPayload {
                        message,
                        error: Some(error),
                    },
                )
            }
        };
        (status, Json(payload)).into_response()
    }
}
