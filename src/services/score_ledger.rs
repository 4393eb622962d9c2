//! Score ledger - per-staff disciplinary score.
//!
//! Scores live in `[0, 100]` and reset to 100 at the start of each local
//! calendar month. There is no reset job: a read that sees a stale
//! `score_last_reset` label treats the score as 100, and the next
//! deduction persists the reset together with the new value.
//!
//! # Failure semantics
//!
//! A deduction never fails the operation that triggered it. If the staff
//! entity is missing or the directory is unavailable the deduction is
//! skipped, logged, and reported as `DeductionOutcome::Skipped`.
//!
//! # Concurrency
//!
//! Each write is conditional on the `score_version` that was read. On a
//! conflict the ledger re-reads and retries, so concurrent deductions for
//! the same staff member do not lose updates.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    models::staff::{ScoreUpdate, ScoreWrite, Staff},
    services::clock::month_label,
    store::StaffDirectory,
};

pub const MAX_SCORE: i32 = 100;

pub const LATE_CHECKIN: i32 = 5;

/// Penalty for a day with no check-in at all.
///
/// Nothing applies this: there is no job that notices a fully absent day.
/// Kept so that whoever adds absence detection uses the agreed amount.
#[allow(dead_code)]
pub const MISSED_CHECKIN: i32 = 10;

pub const NO_CHECKOUT: i32 = 10;

pub const EARLY_CHECKOUT: i32 = 5;

/// Conditional writes attempted before giving up on a contended score.
const MAX_WRITE_ATTEMPTS: usize = 3;

/// Why a deduction was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The staff entity does not exist
    StaffMissing,
    /// The directory read or write failed
    DirectoryUnavailable(String),
    /// Every conditional write lost to a concurrent deduction
    Contended,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::StaffMissing => f.write_str("staff member not found"),
            SkipReason::DirectoryUnavailable(e) => write!(f, "staff directory unavailable: {}", e),
            SkipReason::Contended => f.write_str("score write contended"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeductionOutcome {
    Deducted(ScoreUpdate),
    Skipped(SkipReason),
}

impl DeductionOutcome {
    pub fn into_score_update(self) -> Option<ScoreUpdate> {
        match self {
            DeductionOutcome::Deducted(update) => Some(update),
            DeductionOutcome::Skipped(_) => None,
        }
    }
}

/// Score as of `now`, applying the lazy monthly reset.
pub fn effective_score(staff: &Staff, now: DateTime<Utc>) -> i32 {
    let current_month = month_label(now);
    if staff.score_last_reset.as_deref() == Some(current_month.as_str()) {
        staff.score
    } else {
        MAX_SCORE
    }
}

/// Deduct `amount` from a staff member's score, flooring at 0.
///
/// # Process
///
/// 1. Fetch the staff entity (skip if absent or unreachable)
/// 2. Compute the effective score, resetting to 100 on a new month
/// 3. `new = max(0, current - amount)`
/// 4. Conditionally persist `{score, score_last_reset: current month}`
/// 5. Retry from 1 if another writer changed the score in between
pub async fn apply_deduction(
    directory: &dyn StaffDirectory,
    staff_id: Uuid,
    amount: i32,
    reason: &str,
    now: DateTime<Utc>,
) -> DeductionOutcome {
    let current_month = month_label(now);

    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let staff = match directory.get(staff_id).await {
            Ok(Some(staff)) => staff,
            Ok(None) => return skipped(staff_id, reason, SkipReason::StaffMissing),
            Err(e) => {
                return skipped(staff_id, reason, SkipReason::DirectoryUnavailable(e.to_string()));
            }
        };

        let previous_score = effective_score(&staff, now);
        let new_score = (previous_score - amount).max(0);
        let write = ScoreWrite {
            score: new_score,
            score_last_reset: current_month.clone(),
        };

        match directory
            .update_score(staff_id, staff.score_version, &write)
            .await
        {
            Ok(true) => {
                tracing::info!(
                    %staff_id,
                    previous_score,
                    new_score,
                    deduction = amount,
                    reason,
                    "Score deducted"
                );
                return DeductionOutcome::Deducted(ScoreUpdate {
                    previous_score,
                    new_score,
                    deduction: amount,
                    reason: reason.to_string(),
                });
            }
            Ok(false) => {
                tracing::debug!(%staff_id, attempt, "Score write conflicted, retrying");
            }
            Err(e) => {
                return skipped(staff_id, reason, SkipReason::DirectoryUnavailable(e.to_string()));
            }
        }
    }

    skipped(staff_id, reason, SkipReason::Contended)
}

fn skipped(staff_id: Uuid, reason: &str, skip: SkipReason) -> DeductionOutcome {
    tracing::warn!(%staff_id, reason, skip = %skip, "Score deduction skipped");
    DeductionOutcome::Skipped(skip)
}
