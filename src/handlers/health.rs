//! Health check endpoint for service monitoring.

use crate::{error::AppError, services::clock::local_date, state::AppState};
use axum::{Json, extract::State};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,

    /// Database connection status
    pub database: String,

    pub timestamp: DateTime<Utc>,

    /// Civil date attendance is currently being recorded against
    pub local_date: NaiveDate,
}

/// Health check handler.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "database": "connected",
///   "timestamp": "2024-06-03T03:30:00Z",
///   "local_date": "2024-06-03"
/// }
/// ```
///
/// If the database is unreachable, returns the standard error response.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    sqlx::query("SELECT 1").execute(&state.pool).await?;

    let now = Utc::now();
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        database: "connected".to_string(),
        timestamp: now,
        local_date: local_date(now),
    }))
}
