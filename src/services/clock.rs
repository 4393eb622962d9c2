//! Clock normalization.
//!
//! All shift arithmetic happens in "minutes since local midnight" in one
//! fixed civil zone, UTC+05:30. The offset is a constant: there is no
//! daylight saving and no time-zone database lookup.

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};

use crate::error::AppError;

/// Offset of the local civil zone from UTC, in seconds (+05:30).
const LOCAL_UTC_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// The local civil zone. Checked at compile time.
pub const LOCAL_ZONE: FixedOffset = match FixedOffset::east_opt(LOCAL_UTC_OFFSET_SECS) {
    Some(offset) => offset,
    None => panic!("local offset must be within one day"),
};

/// Minutes since local midnight, in `[0, 1440)`.
pub fn to_local_minutes(instant: DateTime<Utc>) -> i32 {
    let local = instant.with_timezone(&LOCAL_ZONE);
    (local.hour() * 60 + local.minute()) as i32
}

/// Civil date of an instant in the local zone.
pub fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&LOCAL_ZONE).date_naive()
}

/// `YYYY-MM` label of the local month containing the instant.
pub fn month_label(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&LOCAL_ZONE).format("%Y-%m").to_string()
}

/// Parse an `HH:MM` shift boundary into minutes since midnight.
///
/// # Errors
///
/// `InvalidFormat` unless the text is exactly two colon-separated integers
/// with hours in `[0, 23]` and minutes in `[0, 59]`.
pub fn parse_shift_boundary(text: &str) -> Result<i32, AppError> {
    let invalid = || AppError::InvalidFormat(text.to_string());

    let (hours, minutes) = text.split_once(':').ok_or_else(invalid)?;
    let hours = parse_component(hours).ok_or_else(invalid)?;
    let minutes = parse_component(minutes).ok_or_else(invalid)?;

    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    Ok((hours * 60 + minutes) as i32)
}

// Digits only: rejects signs, whitespace and a second colon.
fn parse_component(part: &str) -> Option<u32> {
    if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// A validated scheduled shift, in minutes since local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    pub start: i32,
    pub end: i32,
}

impl ShiftWindow {
    /// Parse both boundaries and require a positive shift length.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if either boundary is malformed
    /// - `InvalidShiftConfiguration` if `end <= start`
    pub fn parse(start: &str, end: &str) -> Result<Self, AppError> {
        let start = parse_shift_boundary(start)?;
        let end = parse_shift_boundary(end)?;

        if end <= start {
            return Err(AppError::InvalidShiftConfiguration);
        }

        Ok(Self { start, end })
    }

    pub fn length(&self) -> i32 {
        self.end - self.start
    }
}
