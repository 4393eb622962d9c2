//! Attendance report models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Width of a report window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeKind {
    #[default]
    Day,
    Week,
}

/// Inclusive civil-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Query string for `GET /api/v1/attendance/report`.
///
/// `date` defaults to today in the local zone.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub range: RangeKind,
    pub date: Option<NaiveDate>,
}

/// Per-staff counts over the report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffSummary {
    pub staff_id: Uuid,
    pub staff_name: String,
    pub employee_id: String,
    pub present_days: u32,
    pub late_days: u32,
    pub early_checkout_days: u32,

    /// Live, reset-aware score
    pub score: i32,
}

/// Response for the report endpoint.
///
/// # JSON Example
///
/// ```json
/// {
///   "range": "week",
///   "start": "2024-06-03",
///   "end": "2024-06-09",
///   "staff": [
///     {
///       "staff_id": "550e8400-e29b-41d4-a716-446655440000",
///       "staff_name": "Asha",
///       "employee_id": "EMP-014",
///       "present_days": 5,
///       "late_days": 1,
///       "early_checkout_days": 0,
///       "score": 95
///     }
///   ]
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub range: RangeKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub staff: Vec<StaffSummary>,
}
