//! Stale-record sweeper.
//!
//! There is no background job that closes forgotten shifts. Instead every
//! attendance record on its way out of a read path passes through here; a
//! record left open for 12 hours or more is force-closed at the ceiling
//! instant, persisted, and penalized with `NO_CHECKOUT`.
//!
//! A record that is never read again stays open indefinitely.

use chrono::{DateTime, Duration, Utc};

use crate::{
    error::AppError,
    models::attendance::{AttendanceRecord, AttendanceStatus},
    services::score_ledger::{self, NO_CHECKOUT},
    store::Stores,
};

pub const AUTO_CHECKOUT_AFTER_HOURS: i64 = 12;

pub const AUTO_CHECKOUT_REASON: &str = "Auto-checkout after 12 hours";

fn ceiling() -> Duration {
    Duration::hours(AUTO_CHECKOUT_AFTER_HOURS)
}

/// True for an open record whose check-in is at least 12 hours old.
pub fn is_stale(record: &AttendanceRecord, now: DateTime<Utc>) -> bool {
    record.is_open() && now - record.checkin_time >= ceiling()
}

/// The closed form of a stale record.
///
/// Closes at `checkin_time + 12h`, never at `now`, so every reader that
/// sweeps the same record computes the same values.
pub fn force_close(record: &AttendanceRecord, now: DateTime<Utc>) -> AttendanceRecord {
    let mut closed = record.clone();
    closed.checkout_time = Some(record.checkin_time + ceiling());
    closed.shift_duration = Some(ceiling().num_minutes() as i32);
    closed.status = AttendanceStatus::AutoCheckout;
    closed.add_deduction(NO_CHECKOUT, AUTO_CHECKOUT_REASON);
    closed.updated_at = now;
    closed
}

/// Sweep one record, persisting and penalizing it if it is stale.
///
/// Only the reader whose conditional close lands applies the deduction; a
/// reader that loses the race returns the stored record.
///
/// # Errors
///
/// `Database` if persisting the closure fails.
pub async fn sweep_record(
    stores: &Stores,
    record: AttendanceRecord,
    now: DateTime<Utc>,
) -> Result<AttendanceRecord, AppError> {
    if !is_stale(&record, now) {
        return Ok(record);
    }

    let closed = force_close(&record, now);

    if !stores.attendance.close(&closed).await? {
        tracing::debug!(record_id = %record.id, "Record already closed by another reader");
        let stored = stores.attendance.get(record.staff_id, record.date).await?;
        return Ok(stored.unwrap_or(closed));
    }

    tracing::info!(
        record_id = %closed.id,
        staff_id = %closed.staff_id,
        date = %closed.date,
        "Stale attendance record auto-closed"
    );

    score_ledger::apply_deduction(
        stores.staff.as_ref(),
        closed.staff_id,
        NO_CHECKOUT,
        AUTO_CHECKOUT_REASON,
        now,
    )
    .await;

    Ok(closed)
}

/// Sweep every record in a read result, preserving order.
pub async fn sweep_all(
    stores: &Stores,
    records: Vec<AttendanceRecord>,
    now: DateTime<Utc>,
) -> Result<Vec<AttendanceRecord>, AppError> {
    let mut swept = Vec::with_capacity(records.len());
    for record in records {
        swept.push(sweep_record(stores, record, now).await?);
    }
    Ok(swept)
}
