//! Staff HTTP handlers.
//!
//! - GET /api/v1/staff/me/score - Caller's live score
//! - PUT /api/v1/staff/{id}/shift - Set a staff member's shift (managers)

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::staff::{ScoreResponse, ShiftResponse, UpdateShiftRequest},
    services::staff_service,
    state::AppState,
};

/// Caller's score for the current month.
///
/// A score last written in an earlier month reads as 100.
pub async fn my_score(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ScoreResponse>, AppError> {
    let score = staff_service::current_score(&state.stores, &auth, Utc::now()).await?;

    Ok(Json(score))
}

/// Update a staff member's shift.
///
/// # Request Body
///
/// ```json
/// {
///   "shift_start_time": "09:00",
///   "shift_end_time": "18:00"
/// }
/// ```
///
/// Records already opened keep the shift they captured at check-in.
pub async fn update_shift(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(staff_id): Path<Uuid>,
    Json(request): Json<UpdateShiftRequest>,
) -> Result<Json<ShiftResponse>, AppError> {
    let shift = staff_service::update_shift(&state.stores, &auth, staff_id, request).await?;

    Ok(Json(shift))
}
