//! Attendance HTTP handlers.
//!
//! This module implements the attendance endpoints:
//! - POST /api/v1/attendance/check-in - Open today's record (multipart, four photos)
//! - POST /api/v1/attendance/check-out - Close today's record
//! - GET /api/v1/attendance/today - Caller's record for today
//! - GET /api/v1/attendance - Records in a date range
//!
//! Every record returned here has been through the stale-record sweeper.

use axum::{
    Extension, Json,
    extract::{Multipart, Query, State},
};
use chrono::Utc;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::attendance::{
        AttendanceQuery, AttendanceRecord, CheckinResponse, CheckoutResponse, PhotoSet, PhotoSlot,
        PhotoUpload,
    },
    services::attendance_service,
    state::AppState,
};

/// Check in for today.
///
/// # Request Body
///
/// `multipart/form-data` with four file fields: `selfie`, `uniform`,
/// `workstation`, `grooming`. Other fields are ignored; empty files count
/// as missing.
///
/// # Response
///
/// - **200**: the created record, the tolerance verdict, and the score
///   update if the check-in was late
/// - **400**: missing photos
/// - **409**: already checked in today
/// - **502**: photo store failure, nothing was recorded
pub async fn check_in(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    multipart: Multipart,
) -> Result<Json<CheckinResponse>, AppError> {
    let photos = read_photos(multipart).await?;

    let response = attendance_service::check_in(&state.stores, &auth, photos, Utc::now()).await?;

    Ok(Json(response))
}

async fn read_photos(mut multipart: Multipart) -> Result<PhotoSet, AppError> {
    let mut photos = PhotoSet::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
    {
        let Some(slot) = field.name().and_then(PhotoSlot::from_field_name) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(format!("Unreadable photo upload: {}", e)))?;

        if !bytes.is_empty() {
            photos.set(
                slot,
                PhotoUpload {
                    bytes,
                    content_type,
                },
            );
        }
    }

    Ok(photos)
}

/// Check out for today.
///
/// # Response (200)
///
/// ```json
/// {
///   "record": { "status": "EARLY_CHECKOUT", "...": "..." },
///   "shift_duration": 472,
///   "is_early": true,
///   "verdict": {
///     "is_within_tolerance": false,
///     "is_early": true,
///     "tolerance": 27,
///     "allowed_window": [1053, 1107]
///   },
///   "score_update": {
///     "previous_score": 95,
///     "new_score": 90,
///     "deduction": 5,
///     "reason": "Early checkout"
///   }
/// }
/// ```
pub async fn check_out(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let response = attendance_service::check_out(&state.stores, &auth, Utc::now()).await?;

    Ok(Json(response))
}

/// The caller's record for today, or `null` before check-in.
pub async fn today(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Option<AttendanceRecord>>, AppError> {
    let record = attendance_service::today_record(&state.stores, &auth, Utc::now()).await?;

    Ok(Json(record))
}

/// Records in `[from, to]` (both default to today).
///
/// Staff see their own records; managers see their franchise and may pass
/// `staff_id` to narrow the list.
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<AttendanceQuery>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let records = attendance_service::list_records(&state.stores, &auth, query, Utc::now()).await?;

    Ok(Json(records))
}
