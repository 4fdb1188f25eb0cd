//! Error types for the Waypoint server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable machine-readable codes carried in the error envelope.
///
/// The client gateway decides retry behavior from these codes, so the set
/// and its transient/terminal split are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    LocationNotFound,
    OutOfRange,
    ActivityNotFound,
    NotStarted,
    AlreadyEnded,
    ActivityFull,
    Busy,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    BadRequest,
    UnknownAction,
    Store,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::LocationNotFound => "LOCATION_NOT_FOUND",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::ActivityNotFound => "ACTIVITY_NOT_FOUND",
            ErrorCode::NotStarted => "NOT_STARTED",
            ErrorCode::AlreadyEnded => "ALREADY_ENDED",
            ErrorCode::ActivityFull => "ACTIVITY_FULL",
            ErrorCode::Busy => "BUSY",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::UnknownAction => "UNKNOWN_ACTION",
            ErrorCode::Store => "STORE",
            ErrorCode::Internal => "INTERNAL",
        }
    }

    /// Codes a client may retry. Everything else is a definitive rejection
    /// that no amount of retrying will change.
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorCode::Busy | ErrorCode::Store | ErrorCode::Internal)
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// An admission rejection: an expected, user-facing outcome, not a fault.
    #[error("{message}")]
    Rejected { code: ErrorCode, message: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// The request lock could not be acquired within the timeout.
    #[error("Server busy, please try again.")]
    Busy,

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for admission rejections.
    pub fn reject(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Rejected {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Rejected { code, .. } => *code,
            AppError::Authentication(_) => ErrorCode::Unauthorized,
            AppError::Authorization(_) => ErrorCode::Forbidden,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Validation(_) => ErrorCode::BadRequest,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::BadRequest(_) => ErrorCode::BadRequest,
            AppError::UnknownAction(_) => ErrorCode::UnknownAction,
            AppError::Busy => ErrorCode::Busy,
            AppError::Store(_) => ErrorCode::Store,
            AppError::Internal(_) => ErrorCode::Internal,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Business-level failures ride HTTP 200; the envelope is the
        // contract and the client never branches on the transport status.
        let code = self.code();
        let message = match &self {
            AppError::Store(msg) => {
                tracing::error!("Store error: {}", msg);
                "Could not complete request".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Could not complete request".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            status: "error",
            code: code.as_str(),
            message,
        });

        (StatusCode::OK, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
