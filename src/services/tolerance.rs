//! Tolerance evaluation for check-in and check-out events.
//!
//! The grace period is 5% of the scheduled shift length, rounded to the
//! nearest whole minute. Arriving early is never penalized; only arriving
//! after `start + tolerance` is late. At the other end only leaving before
//! `end - tolerance` is early; staying late is never penalized.

use serde::Serialize;

use crate::services::clock::ShiftWindow;

/// Grace period as a percentage of shift length.
const TOLERANCE_PERCENT: i32 = 5;

/// Outcome of evaluating a check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckinVerdict {
    pub is_late: bool,
    pub is_early: bool,
    pub tolerance: i32,
    pub allowed_late_boundary: i32,
}

/// Outcome of evaluating a check-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutVerdict {
    pub is_within_tolerance: bool,
    pub is_early: bool,
    pub tolerance: i32,

    /// `[end - tolerance, end + tolerance]`
    pub allowed_window: [i32; 2],
}

/// `round(0.05 * shift length)`, half rounding up.
pub fn tolerance_minutes(window: ShiftWindow) -> i32 {
    (window.length() * TOLERANCE_PERCENT + 50).div_euclid(100)
}

pub fn evaluate_checkin(actual_minutes: i32, window: ShiftWindow) -> CheckinVerdict {
    let tolerance = tolerance_minutes(window);
    let allowed_late_boundary = window.start + tolerance;

    CheckinVerdict {
        is_late: actual_minutes > allowed_late_boundary,
        is_early: actual_minutes < window.start,
        tolerance,
        allowed_late_boundary,
    }
}

pub fn evaluate_checkout(actual_minutes: i32, window: ShiftWindow) -> CheckoutVerdict {
    let tolerance = tolerance_minutes(window);
    let allowed_window = [window.end - tolerance, window.end + tolerance];

    CheckoutVerdict {
        is_within_tolerance: allowed_window[0] <= actual_minutes
            && actual_minutes <= allowed_window[1],
        is_early: actual_minutes < allowed_window[0],
        tolerance,
        allowed_window,
    }
}
