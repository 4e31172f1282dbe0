use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::StoreError;
use serde::Serialize;
use worker::RenderError;

/// Seconds a client is asked to wait before retrying a busy node.
const BUSY_RETRY_AFTER: u64 = 5;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `CHECKSUM_MISMATCH`,
    /// `NOT_FOUND`, `SERVICE_BUSY`, `INTERNAL_ERROR`.
    #[schema(example = "SERVICE_BUSY")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "A render is already in progress")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// The uploaded bytes do not hash to the declared checksum.
    ChecksumMismatch(String),
    NotFound(String),
    /// An upload or render already holds the node.
    Busy(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::ChecksumMismatch(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "CHECKSUM_MISMATCH",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Busy(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody {
                    code: "SERVICE_BUSY",
                    message: msg,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let busy = matches!(self, AppError::Busy(_));
        let (status, body) = self.status_and_body();

        if busy {
            (
                status,
                [("Retry-After", BUSY_RETRY_AFTER.to_string())],
                Json(body),
            )
                .into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidChecksum(msg) => AppError::Validation(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Busy => AppError::Busy(err.to_string()),
            RenderError::Request(e) => AppError::Validation(e.to_string()),
            RenderError::SceneNotFound(_) => AppError::NotFound(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}
