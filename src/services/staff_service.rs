//! Staff score reads and shift configuration.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::staff::{Role, ScoreResponse, ShiftResponse, UpdateShiftRequest},
    services::{clock::{ShiftWindow, month_label}, score_ledger::effective_score},
    store::Stores,
};

/// The caller's live score, with the monthly reset applied.
pub async fn current_score(
    stores: &Stores,
    caller: &AuthContext,
    now: DateTime<Utc>,
) -> Result<ScoreResponse, AppError> {
    let staff = stores
        .staff
        .get(caller.staff_id)
        .await?
        .ok_or(AppError::StaffNotFound)?;

    Ok(ScoreResponse {
        staff_id: staff.id,
        score: effective_score(&staff, now),
        month: month_label(now),
    })
}

/// Set a staff member's shift. Only affects check-ins made afterwards.
///
/// # Errors
///
/// - `Forbidden`: caller is not a manager
/// - `StaffNotFound`: no such staff member in the caller's franchise
/// - `InvalidFormat` / `InvalidShiftConfiguration`: bad boundaries
pub async fn update_shift(
    stores: &Stores,
    caller: &AuthContext,
    staff_id: Uuid,
    request: UpdateShiftRequest,
) -> Result<ShiftResponse, AppError> {
    if caller.role != Role::Manager {
        return Err(AppError::Forbidden(
            "Only managers can change shifts".to_string(),
        ));
    }

    ShiftWindow::parse(&request.shift_start_time, &request.shift_end_time)?;

    // Staff of other franchises are reported as missing
    let staff = stores
        .staff
        .get(staff_id)
        .await?
        .filter(|s| s.franchise_id == caller.franchise_id)
        .ok_or(AppError::StaffNotFound)?;

    if !stores
        .staff
        .update_shift(staff.id, &request.shift_start_time, &request.shift_end_time)
        .await?
    {
        return Err(AppError::StaffNotFound);
    }

    tracing::info!(
        %staff_id,
        shift_start = %request.shift_start_time,
        shift_end = %request.shift_end_time,
        updated_by = %caller.staff_id,
        "Shift updated"
    );

    Ok(ShiftResponse {
        staff_id,
        shift_start_time: request.shift_start_time,
        shift_end_time: request.shift_end_time,
    })
}
