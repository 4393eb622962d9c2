//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Validation Errors**: rejected before any mutation, caller corrects and retries
/// - **Upstream Errors**: the photo store failed, check-in is aborted with nothing written
/// - **Storage Errors**: any sqlx::Error, surfaced as retryable
/// - **Authentication Errors**: invalid token or a caller outside the allowed tier
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// Returns HTTP 500. Retrying the whole check-in/check-out is safe because
    /// the precondition checks detect whether a previous attempt landed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Bearer token is missing, invalid, or revoked.
    #[error("Invalid or missing access token")]
    InvalidToken,

    /// Caller is authenticated but not allowed to perform the operation.
    #[error("{0}")]
    Forbidden(String),

    /// One or more of the four check-in photos was not supplied.
    ///
    /// Carries the form field names that were missing.
    #[error("All four check-in photos are required")]
    MissingPhotos(Vec<String>),

    /// A record already exists for this staff member and civil date.
    #[error("Already checked in today")]
    DuplicateCheckin,

    /// Check-out attempted without a record for today.
    #[error("No check-in found for today")]
    NoCheckinFound,

    /// Check-out attempted on a record that is already closed.
    #[error("Already checked out today")]
    AlreadyCheckedOut,

    /// A shift boundary is not a valid `HH:MM` string.
    #[error("Invalid time format '{0}', expected HH:MM")]
    InvalidFormat(String),

    /// The configured shift ends at or before it starts.
    #[error("Shift end time must be after shift start time")]
    InvalidShiftConfiguration,

    /// The staff entity referenced by the caller does not exist.
    #[error("Staff member not found")]
    StaffNotFound,

    /// The photo store rejected or failed an upload.
    #[error("Photo upload failed")]
    PhotoUpload(String),

    /// Request body or parameters are invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message",
///     "details": "optional diagnostics"
///   }
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                self.to_string(),
                None,
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone(), None),
            AppError::MissingPhotos(fields) => (
                StatusCode::BAD_REQUEST,
                "missing_photos",
                self.to_string(),
                Some(json!({ "missing": fields })),
            ),
            AppError::DuplicateCheckin => (
                StatusCode::CONFLICT,
                "duplicate_checkin",
                self.to_string(),
                None,
            ),
            AppError::NoCheckinFound => (
                StatusCode::NOT_FOUND,
                "no_checkin_found",
                self.to_string(),
                None,
            ),
            AppError::AlreadyCheckedOut => (
                StatusCode::CONFLICT,
                "already_checked_out",
                self.to_string(),
                None,
            ),
            AppError::InvalidFormat(_) => (
                StatusCode::BAD_REQUEST,
                "invalid_format",
                self.to_string(),
                None,
            ),
            AppError::InvalidShiftConfiguration => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_shift_configuration",
                self.to_string(),
                None,
            ),
            AppError::StaffNotFound => (
                StatusCode::NOT_FOUND,
                "staff_not_found",
                self.to_string(),
                None,
            ),
            AppError::PhotoUpload(detail) => (
                StatusCode::BAD_GATEWAY,
                "photo_upload_failed",
                self.to_string(),
                Some(json!(detail)),
            ),
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone(), None)
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred, please retry".to_string(),
                    Some(json!({ "retryable": true })),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
