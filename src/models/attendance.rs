//! Attendance data models and API request/response types.
//!
//! This module defines:
//! - `AttendanceRecord`: one staff member's one day of attendance
//! - `AttendanceStatus`: the lifecycle position of a record
//! - `PhotoSlot` / `PhotoSet`: the four photos required at check-in
//! - Response bodies for the attendance endpoints

use std::{fmt, str::FromStr};

use axum::body::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::staff::ScoreUpdate;
use crate::services::tolerance::{CheckinVerdict, CheckoutVerdict};

/// Where a record sits in its lifecycle.
///
/// `OnTime`, `Late` and `Early` are set at check-in while the record is open.
/// `CheckedOut`, `EarlyCheckout` and `AutoCheckout` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    OnTime,
    Late,
    Early,
    CheckedOut,
    EarlyCheckout,
    AutoCheckout,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::OnTime => "ON_TIME",
            AttendanceStatus::Late => "LATE",
            AttendanceStatus::Early => "EARLY",
            AttendanceStatus::CheckedOut => "CHECKED_OUT",
            AttendanceStatus::EarlyCheckout => "EARLY_CHECKOUT",
            AttendanceStatus::AutoCheckout => "AUTO_CHECKOUT",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON_TIME" => Ok(AttendanceStatus::OnTime),
            "LATE" => Ok(AttendanceStatus::Late),
            "EARLY" => Ok(AttendanceStatus::Early),
            "CHECKED_OUT" => Ok(AttendanceStatus::CheckedOut),
            "EARLY_CHECKOUT" => Ok(AttendanceStatus::EarlyCheckout),
            "AUTO_CHECKOUT" => Ok(AttendanceStatus::AutoCheckout),
            other => Err(format!("unknown attendance status '{}'", other)),
        }
    }
}

/// URLs of the four photos captured at check-in. Immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendancePhotos {
    pub selfie_url: String,
    pub uniform_url: String,
    pub workstation_url: String,
    pub grooming_url: String,
}

/// One staff member's attendance for one civil date.
///
/// # Database Table
///
/// Maps to `attendance_records`. `(staff_id, date)` is unique, which is what
/// enforces one shift per staff member per day.
///
/// # Denormalized identity
///
/// `staff_name`, `employee_id`, `franchise_id` and `franchise_name` are copied
/// from the caller at check-in and never re-fetched.
///
/// # Shift boundaries
///
/// `scheduled_start_time` / `scheduled_end_time` are captured from the staff
/// configuration at check-in; check-out is evaluated against these, not the
/// live configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub staff_name: String,
    pub employee_id: String,
    pub franchise_id: Uuid,
    pub franchise_name: String,

    /// Civil date of the shift in the fixed local zone
    pub date: NaiveDate,

    pub checkin_time: DateTime<Utc>,

    /// NULL while the record is open
    pub checkout_time: Option<DateTime<Utc>>,

    pub scheduled_start_time: String,
    pub scheduled_end_time: String,
    pub is_late: bool,
    pub is_early_checkin: bool,
    pub is_early_checkout: bool,
    pub status: AttendanceStatus,

    /// Minutes between check-in and check-out, NULL while open
    pub shift_duration: Option<i32>,

    /// Cumulative penalty attributable to this record
    pub score_deduction: i32,
    pub deduction_reason: Option<String>,

    #[serde(flatten)]
    pub photos: AttendancePhotos,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.checkout_time.is_none()
    }

    /// Add a penalty to the running total, appending its reason.
    pub fn add_deduction(&mut self, amount: i32, reason: &str) {
        self.score_deduction += amount;
        self.deduction_reason = Some(match self.deduction_reason.take() {
            Some(existing) => format!("{}; {}", existing, reason),
            None => reason.to_string(),
        });
    }
}

/// The four photo fields a check-in must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSlot {
    Selfie,
    Uniform,
    Workstation,
    Grooming,
}

impl PhotoSlot {
    pub const ALL: [PhotoSlot; 4] = [
        PhotoSlot::Selfie,
        PhotoSlot::Uniform,
        PhotoSlot::Workstation,
        PhotoSlot::Grooming,
    ];

    /// Multipart form field name.
    pub fn field_name(&self) -> &'static str {
        match self {
            PhotoSlot::Selfie => "selfie",
            PhotoSlot::Uniform => "uniform",
            PhotoSlot::Workstation => "workstation",
            PhotoSlot::Grooming => "grooming",
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.field_name() == name)
    }
}

/// One uploaded photo as received from the client.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub bytes: Bytes,
    pub content_type: String,
}

/// Photos collected from a check-in request. Any slot may still be empty.
#[derive(Debug, Clone, Default)]
pub struct PhotoSet {
    pub selfie: Option<PhotoUpload>,
    pub uniform: Option<PhotoUpload>,
    pub workstation: Option<PhotoUpload>,
    pub grooming: Option<PhotoUpload>,
}

/// A photo set with every slot filled.
#[derive(Debug, Clone)]
pub struct CheckinPhotos {
    pub selfie: PhotoUpload,
    pub uniform: PhotoUpload,
    pub workstation: PhotoUpload,
    pub grooming: PhotoUpload,
}

impl PhotoSet {
    pub fn set(&mut self, slot: PhotoSlot, photo: PhotoUpload) {
        let target = match slot {
            PhotoSlot::Selfie => &mut self.selfie,
            PhotoSlot::Uniform => &mut self.uniform,
            PhotoSlot::Workstation => &mut self.workstation,
            PhotoSlot::Grooming => &mut self.grooming,
        };
        *target = Some(photo);
    }

    fn is_set(&self, slot: PhotoSlot) -> bool {
        match slot {
            PhotoSlot::Selfie => self.selfie.is_some(),
            PhotoSlot::Uniform => self.uniform.is_some(),
            PhotoSlot::Workstation => self.workstation.is_some(),
            PhotoSlot::Grooming => self.grooming.is_some(),
        }
    }

    /// Require all four photos.
    ///
    /// # Errors
    ///
    /// `MissingPhotos` naming every empty slot.
    pub fn require_all(self) -> Result<CheckinPhotos, AppError> {
        let missing: Vec<String> = PhotoSlot::ALL
            .into_iter()
            .filter(|slot| !self.is_set(*slot))
            .map(|slot| slot.field_name().to_string())
            .collect();

        match self {
            PhotoSet {
                selfie: Some(selfie),
                uniform: Some(uniform),
                workstation: Some(workstation),
                grooming: Some(grooming),
            } => Ok(CheckinPhotos {
                selfie,
                uniform,
                workstation,
                grooming,
            }),
            _ => Err(AppError::MissingPhotos(missing)),
        }
    }
}

/// Query string for `GET /api/v1/attendance`.
///
/// Both bounds default to today. Managers may narrow to one staff member.
#[derive(Debug, Default, Deserialize)]
pub struct AttendanceQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub staff_id: Option<Uuid>,
}

/// Response for a successful check-in.
#[derive(Debug, Serialize)]
pub struct CheckinResponse {
    pub record: AttendanceRecord,
    pub verdict: CheckinVerdict,
    pub score_update: Option<ScoreUpdate>,
}

/// Response for a successful check-out.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub record: AttendanceRecord,
    pub shift_duration: i32,
    pub is_early: bool,
    pub verdict: CheckoutVerdict,
    pub score_update: Option<ScoreUpdate>,
}
