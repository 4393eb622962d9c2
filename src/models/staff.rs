//! Staff directory models.
//!
//! This module defines:
//! - `Staff`: the staff entity as the attendance engine sees it
//! - `Role`: the caller tier used for authorization
//! - `ScoreUpdate`: before/after snapshot of a score deduction
//! - Request/response bodies for the staff endpoints

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shift start used when a staff member has none configured.
pub const DEFAULT_SHIFT_START: &str = "10:00";

/// Shift end used when a staff member has none configured.
pub const DEFAULT_SHIFT_END: &str = "19:00";

/// Caller tier.
///
/// Only `Staff` may check in and out. `Manager` reads franchise-wide data
/// and configures shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Staff,
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Manager => "manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staff" => Ok(Role::Staff),
            "manager" => Ok(Role::Manager),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A staff member from the directory.
///
/// # Score fields
///
/// `score` is only meaningful for the month named by `score_last_reset`.
/// When that label is stale the effective score is 100; the ledger
/// synthesizes the reset on read and persists it on the next deduction.
///
/// `score_version` increments on every score write and guards the
/// conditional update used by the ledger.
#[derive(Debug, Clone)]
pub struct Staff {
    pub id: Uuid,
    pub name: String,
    pub employee_id: String,
    pub franchise_id: Uuid,
    pub franchise_name: String,
    pub role: Role,
    pub shift_start_time: Option<String>,
    pub shift_end_time: Option<String>,
    pub score: i32,
    pub score_last_reset: Option<String>,
    pub score_version: i64,
}

impl Staff {
    /// Configured shift start, or `10:00` when unset.
    pub fn shift_start(&self) -> &str {
        self.shift_start_time.as_deref().unwrap_or(DEFAULT_SHIFT_START)
    }

    /// Configured shift end, or `19:00` when unset.
    pub fn shift_end(&self) -> &str {
        self.shift_end_time.as_deref().unwrap_or(DEFAULT_SHIFT_END)
    }
}

/// Values written back to the directory by a score deduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreWrite {
    pub score: i32,
    pub score_last_reset: String,
}

/// Snapshot returned to callers after a deduction lands.
///
/// # JSON Example
///
/// ```json
/// {
///   "previous_score": 100,
///   "new_score": 95,
///   "deduction": 5,
///   "reason": "Late check-in"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreUpdate {
    pub previous_score: i32,
    pub new_score: i32,
    pub deduction: i32,
    pub reason: String,
}

/// Request body for `PUT /api/v1/staff/{id}/shift`.
#[derive(Debug, Deserialize)]
pub struct UpdateShiftRequest {
    pub shift_start_time: String,
    pub shift_end_time: String,
}

/// Live score as returned by `GET /api/v1/staff/me/score`.
#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub staff_id: Uuid,
    pub score: i32,
    pub month: String,
}

/// Shift configuration as returned after an update.
#[derive(Debug, Serialize)]
pub struct ShiftResponse {
    pub staff_id: Uuid,
    pub shift_start_time: String,
    pub shift_end_time: String,
}
