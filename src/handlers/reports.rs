//! Attendance report handler.
//!
//! - GET /api/v1/attendance/report?range=day|week&date=YYYY-MM-DD

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::Utc;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::report::{ReportQuery, ReportResponse},
    services::report_service,
    state::AppState,
};

/// Per-staff counts for the caller's franchise.
///
/// # Query Parameters
///
/// - `range`: `day` (default) or `week` (Monday to Sunday)
/// - `date`: anchor date, defaults to today in the local zone
///
/// # Response
///
/// - **200**: see `ReportResponse`
/// - **403**: caller is not a manager
pub async fn report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, AppError> {
    let report = report_service::franchise_report(&state.stores, &auth, query, Utc::now()).await?;

    Ok(Json(report))
}
