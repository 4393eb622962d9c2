//! Attendance service - the lifecycle of one staff member's day.
//!
//! ```text
//! NONE --check-in--> OPEN --check-out--> CHECKED_OUT | EARLY_CHECKOUT
//!                      \
//!                       `--sweep (12h)--> AUTO_CHECKOUT
//! ```
//!
//! # Ordering
//!
//! Records are persisted before the score ledger is called. A failed write
//! therefore never leaves a deduction behind, and a retried request hits the
//! duplicate / already-closed guards instead of deducting twice.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        attendance::{
            AttendancePhotos, AttendanceQuery, AttendanceRecord, AttendanceStatus, CheckinPhotos,
            CheckinResponse, CheckoutResponse, PhotoSet, PhotoSlot,
        },
        staff::Role,
    },
    services::{
        clock::{ShiftWindow, local_date, to_local_minutes},
        score_ledger::{self, EARLY_CHECKOUT, LATE_CHECKIN},
        sweeper,
        tolerance::{evaluate_checkin, evaluate_checkout},
    },
    store::{BlobStore, Stores},
};

pub const LATE_CHECKIN_REASON: &str = "Late check-in";

pub const EARLY_CHECKOUT_REASON: &str = "Early checkout";

fn require_staff_tier(caller: &AuthContext) -> Result<(), AppError> {
    if caller.role != Role::Staff {
        return Err(AppError::Forbidden(
            "Only staff members can record attendance".to_string(),
        ));
    }
    Ok(())
}

/// Open today's attendance record for the caller.
///
/// # Process
///
/// 1. Require a staff-tier caller and all four photos
/// 2. Reject if a record already exists for today
/// 3. Validate the staff member's shift (default `10:00`-`19:00`)
/// 4. Upload the four photos concurrently; any failure aborts with nothing written
/// 5. Evaluate the check-in against the shift tolerance
/// 6. Persist the record
/// 7. Deduct `LATE_CHECKIN` if late
///
/// # Errors
///
/// - `Forbidden`: caller is not staff-tier
/// - `MissingPhotos`: one or more photos absent
/// - `DuplicateCheckin`: a record exists for `(staff_id, today)`
/// - `StaffNotFound`, `InvalidFormat`, `InvalidShiftConfiguration`: bad shift setup
/// - `PhotoUpload`: the photo store failed
/// - `Database`: retryable storage failure
pub async fn check_in(
    stores: &Stores,
    caller: &AuthContext,
    photos: PhotoSet,
    now: DateTime<Utc>,
) -> Result<CheckinResponse, AppError> {
    require_staff_tier(caller)?;
    let photos = photos.require_all()?;

    let today = local_date(now);
    if stores.attendance.get(caller.staff_id, today).await?.is_some() {
        return Err(AppError::DuplicateCheckin);
    }

    let staff = stores
        .staff
        .get(caller.staff_id)
        .await?
        .ok_or(AppError::StaffNotFound)?;
    let scheduled_start = staff.shift_start().to_string();
    let scheduled_end = staff.shift_end().to_string();
    let window = ShiftWindow::parse(&scheduled_start, &scheduled_end)?;

    let photo_urls = upload_photos(stores.blobs.as_ref(), caller.staff_id, today, &photos).await?;

    let verdict = evaluate_checkin(to_local_minutes(now), window);
    let status = if verdict.is_late {
        AttendanceStatus::Late
    } else if verdict.is_early {
        AttendanceStatus::Early
    } else {
        AttendanceStatus::OnTime
    };

    let mut record = AttendanceRecord {
        id: Uuid::new_v4(),
        staff_id: caller.staff_id,
        staff_name: caller.name.clone(),
        employee_id: caller.employee_id.clone(),
        franchise_id: caller.franchise_id,
        franchise_name: caller.franchise_name.clone(),
        date: today,
        checkin_time: now,
        checkout_time: None,
        scheduled_start_time: scheduled_start,
        scheduled_end_time: scheduled_end,
        is_late: verdict.is_late,
        is_early_checkin: verdict.is_early,
        is_early_checkout: false,
        status,
        shift_duration: None,
        score_deduction: 0,
        deduction_reason: None,
        photos: photo_urls,
        created_at: now,
        updated_at: now,
    };
    if verdict.is_late {
        record.add_deduction(LATE_CHECKIN, LATE_CHECKIN_REASON);
    }

    stores.attendance.insert(&record).await?;

    tracing::info!(
        record_id = %record.id,
        staff_id = %record.staff_id,
        date = %record.date,
        status = %record.status,
        "Checked in"
    );

    let score_update = if verdict.is_late {
        score_ledger::apply_deduction(
            stores.staff.as_ref(),
            caller.staff_id,
            LATE_CHECKIN,
            LATE_CHECKIN_REASON,
            now,
        )
        .await
        .into_score_update()
    } else {
        None
    };

    Ok(CheckinResponse {
        record,
        verdict,
        score_update,
    })
}

/// Upload all four photos at once. The first failure drops the others.
async fn upload_photos(
    blobs: &dyn BlobStore,
    staff_id: Uuid,
    date: chrono::NaiveDate,
    photos: &CheckinPhotos,
) -> Result<AttendancePhotos, AppError> {
    let key = |slot: PhotoSlot| {
        format!(
            "attendance/{}/{}/{}-{}",
            staff_id,
            date,
            slot.field_name(),
            Uuid::new_v4()
        )
    };
    let selfie_key = key(PhotoSlot::Selfie);
    let uniform_key = key(PhotoSlot::Uniform);
    let workstation_key = key(PhotoSlot::Workstation);
    let grooming_key = key(PhotoSlot::Grooming);

    let (selfie_url, uniform_url, workstation_url, grooming_url) = tokio::try_join!(
        blobs.upload(&selfie_key, &photos.selfie),
        blobs.upload(&uniform_key, &photos.uniform),
        blobs.upload(&workstation_key, &photos.workstation),
        blobs.upload(&grooming_key, &photos.grooming),
    )
    .inspect_err(|e| tracing::error!(%staff_id, error = ?e, "Check-in photo upload failed"))?;

    Ok(AttendancePhotos {
        selfie_url,
        uniform_url,
        workstation_url,
        grooming_url,
    })
}

/// Close today's attendance record for the caller.
///
/// The record is swept first, so a shift left open past the ceiling is
/// reported as already checked out rather than closed a second time.
///
/// # Errors
///
/// - `Forbidden`: caller is not staff-tier
/// - `NoCheckinFound`: no record for today
/// - `AlreadyCheckedOut`: the record is closed (including by a racing request)
/// - `Database`: retryable storage failure
pub async fn check_out(
    stores: &Stores,
    caller: &AuthContext,
    now: DateTime<Utc>,
) -> Result<CheckoutResponse, AppError> {
    require_staff_tier(caller)?;

    let today = local_date(now);
    let record = stores
        .attendance
        .get(caller.staff_id, today)
        .await?
        .ok_or(AppError::NoCheckinFound)?;
    let mut record = sweeper::sweep_record(stores, record, now).await?;

    if !record.is_open() {
        return Err(AppError::AlreadyCheckedOut);
    }

    // Boundaries captured at check-in, not the live configuration
    let window = ShiftWindow::parse(&record.scheduled_start_time, &record.scheduled_end_time)?;
    let verdict = evaluate_checkout(to_local_minutes(now), window);

    let checkout_time = now.max(record.checkin_time);
    let shift_duration = (checkout_time - record.checkin_time).num_minutes() as i32;

    record.checkout_time = Some(checkout_time);
    record.shift_duration = Some(shift_duration);
    record.is_early_checkout = verdict.is_early;
    record.updated_at = now;
    if verdict.is_early {
        record.status = AttendanceStatus::EarlyCheckout;
        record.add_deduction(EARLY_CHECKOUT, EARLY_CHECKOUT_REASON);
    } else {
        record.status = AttendanceStatus::CheckedOut;
    }

    if !stores.attendance.close(&record).await? {
        return Err(AppError::AlreadyCheckedOut);
    }

    tracing::info!(
        record_id = %record.id,
        staff_id = %record.staff_id,
        shift_duration,
        status = %record.status,
        "Checked out"
    );

    let score_update = if verdict.is_early {
        score_ledger::apply_deduction(
            stores.staff.as_ref(),
            caller.staff_id,
            EARLY_CHECKOUT,
            EARLY_CHECKOUT_REASON,
            now,
        )
        .await
        .into_score_update()
    } else {
        None
    };

    Ok(CheckoutResponse {
        record,
        shift_duration,
        is_early: verdict.is_early,
        verdict,
        score_update,
    })
}

/// The caller's record for today, if any, after sweeping.
pub async fn today_record(
    stores: &Stores,
    caller: &AuthContext,
    now: DateTime<Utc>,
) -> Result<Option<AttendanceRecord>, AppError> {
    match stores.attendance.get(caller.staff_id, local_date(now)).await? {
        Some(record) => Ok(Some(sweeper::sweep_record(stores, record, now).await?)),
        None => Ok(None),
    }
}

/// Records visible to the caller in a date range, after sweeping.
///
/// Staff see only their own records. Managers see their franchise, optionally
/// narrowed to one staff member.
///
/// # Errors
///
/// - `InvalidRequest`: `from` is after `to`
/// - `Forbidden`: a staff member asked for someone else's records
pub async fn list_records(
    stores: &Stores,
    caller: &AuthContext,
    query: AttendanceQuery,
    now: DateTime<Utc>,
) -> Result<Vec<AttendanceRecord>, AppError> {
    let today = local_date(now);
    let from = query.from.unwrap_or(today);
    let to = query.to.unwrap_or(today);
    if from > to {
        return Err(AppError::InvalidRequest(
            "'from' must not be after 'to'".to_string(),
        ));
    }

    let records = match caller.role {
        Role::Staff => {
            if query.staff_id.is_some_and(|id| id != caller.staff_id) {
                return Err(AppError::Forbidden(
                    "Staff members can only view their own attendance".to_string(),
                ));
            }
            stores
                .attendance
                .query_by_staff(caller.staff_id, from, to)
                .await?
        }
        Role::Manager => {
            let mut records = stores
                .attendance
                .query_by_franchise(caller.franchise_id, from, to)
                .await?;
            if let Some(staff_id) = query.staff_id {
                records.retain(|r| r.staff_id == staff_id);
            }
            records
        }
    };

    sweeper::sweep_all(stores, records, now).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::PhotoUpload;
    use crate::services::sweeper::AUTO_CHECKOUT_REASON;
    use crate::store::memory::{TestStores, auth_for, full_photo_set, local_instant, staff_member};
    use chrono::{Duration, NaiveDate};

    fn setup(shift_start: &str, shift_end: &str) -> (TestStores, AuthContext) {
        let stores = TestStores::new();
        let staff = staff_member(shift_start, shift_end);
        stores.staff.insert(staff.clone());
        (stores, auth_for(&staff))
    }

    async fn check_in_at(
        stores: &TestStores,
        caller: &AuthContext,
        at: DateTime<Utc>,
    ) -> Result<CheckinResponse, AppError> {
        check_in(&stores.stores(), caller, full_photo_set(), at).await
    }

    #[tokio::test]
    async fn checkin_within_grace_period_is_on_time() {
        let (stores, caller) = setup("09:00", "18:00");

        let response = check_in_at(&stores, &caller, local_instant(2024, 6, 3, 9, 20))
            .await
            .unwrap();

        assert_eq!(response.record.status, AttendanceStatus::OnTime);
        assert!(!response.record.is_late);
        assert_eq!(response.verdict.tolerance, 27);
        assert_eq!(response.record.score_deduction, 0);
        assert!(response.score_update.is_none());
        assert_eq!(stores.staff.snapshot(caller.staff_id).unwrap().score, 100);
    }

    #[tokio::test]
    async fn checkin_past_grace_period_is_late_and_deducts() {
        let (stores, caller) = setup("09:00", "18:00");

        let response = check_in_at(&stores, &caller, local_instant(2024, 6, 3, 9, 28))
            .await
            .unwrap();

        assert_eq!(response.record.status, AttendanceStatus::Late);
        assert!(response.record.is_late);
        assert_eq!(response.record.score_deduction, LATE_CHECKIN);
        assert_eq!(response.record.deduction_reason.as_deref(), Some(LATE_CHECKIN_REASON));
        let update = response.score_update.unwrap();
        assert_eq!((update.previous_score, update.new_score), (100, 95));
        assert_eq!(stores.staff.snapshot(caller.staff_id).unwrap().score, 95);
    }

    #[tokio::test]
    async fn early_checkin_is_flagged_without_penalty() {
        let (stores, caller) = setup("09:00", "18:00");

        let response = check_in_at(&stores, &caller, local_instant(2024, 6, 3, 7, 45))
            .await
            .unwrap();

        assert_eq!(response.record.status, AttendanceStatus::Early);
        assert!(response.record.is_early_checkin);
        assert!(!response.record.is_late);
        assert!(response.score_update.is_none());
    }

    #[tokio::test]
    async fn checkin_captures_identity_shift_and_photos() {
        let (stores, caller) = setup("09:00", "18:00");
        let now = local_instant(2024, 6, 3, 9, 0);

        let record = check_in_at(&stores, &caller, now)
            .await
            .unwrap()
            .record;

        assert_eq!(record.staff_name, caller.name);
        assert_eq!(record.franchise_id, caller.franchise_id);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(record.scheduled_start_time, "09:00");
        assert_eq!(record.scheduled_end_time, "18:00");
        assert!(record.is_open());
        assert!(record.photos.selfie_url.contains("/selfie-"));
        assert!(record.photos.grooming_url.contains("/grooming-"));
        assert_eq!(stores.blobs.uploaded().len(), 4);
        assert_eq!(stores.attendance.all(), vec![record]);
    }

    #[tokio::test]
    async fn unset_shift_uses_default_hours() {
        let stores = TestStores::new();
        let mut staff = staff_member("09:00", "18:00");
        staff.shift_start_time = None;
        staff.shift_end_time = None;
        stores.staff.insert(staff.clone());

        // 10:27 is the last on-time minute of a 10:00-19:00 shift
        let record = check_in_at(&stores, &auth_for(&staff), local_instant(2024, 6, 3, 10, 27))
            .await
            .unwrap()
            .record;

        assert_eq!(record.scheduled_start_time, "10:00");
        assert_eq!(record.scheduled_end_time, "19:00");
        assert_eq!(record.status, AttendanceStatus::OnTime);
    }

    #[tokio::test]
    async fn second_checkin_same_day_is_rejected() {
        let (stores, caller) = setup("09:00", "18:00");
        check_in_at(&stores, &caller, local_instant(2024, 6, 3, 9, 0))
            .await
            .unwrap();

        for minute in [5, 30, 59] {
            let again = check_in_at(&stores, &caller, local_instant(2024, 6, 3, 13, minute)).await;
            assert!(matches!(again, Err(AppError::DuplicateCheckin)));
        }

        assert_eq!(stores.attendance.all().len(), 1);
    }

    #[tokio::test]
    async fn next_day_opens_a_new_record() {
        let (stores, caller) = setup("09:00", "18:00");
        check_in_at(&stores, &caller, local_instant(2024, 6, 3, 9, 0))
            .await
            .unwrap();

        check_in_at(&stores, &caller, local_instant(2024, 6, 4, 9, 0))
            .await
            .unwrap();

        assert_eq!(stores.attendance.all().len(), 2);
    }

    #[tokio::test]
    async fn missing_photos_are_rejected_before_anything_happens() {
        let (stores, caller) = setup("09:00", "18:00");
        let mut photos = PhotoSet::default();
        photos.set(
            PhotoSlot::Selfie,
            PhotoUpload {
                bytes: axum::body::Bytes::from_static(b"jpeg"),
                content_type: "image/jpeg".to_string(),
            },
        );

        let now = local_instant(2024, 6, 3, 9, 0);
        let result = check_in(&stores.stores(), &caller, photos, now).await;

        assert!(matches!(result, Err(AppError::MissingPhotos(ref m)) if m.len() == 3));
        assert!(stores.blobs.uploaded().is_empty());
        assert!(stores.attendance.all().is_empty());
    }

    #[tokio::test]
    async fn failed_upload_writes_no_record() {
        let (stores, caller) = setup("09:00", "18:00");
        stores.blobs.fail_uploads_matching("/workstation-");

        let result = check_in_at(&stores, &caller, local_instant(2024, 6, 3, 9, 40)).await;

        assert!(matches!(result, Err(AppError::PhotoUpload(_))));
        assert!(stores.attendance.all().is_empty());
        // Late, but nothing was written so nothing was deducted
        assert_eq!(stores.staff.snapshot(caller.staff_id).unwrap().score, 100);
    }

    #[tokio::test]
    async fn photos_upload_concurrently() {
        let (stores, caller) = setup("09:00", "18:00");
        // Each upload blocks until all four are in flight
        stores.blobs.require_batches_of(PhotoSlot::ALL.len());

        let record = check_in_at(&stores, &caller, local_instant(2024, 6, 3, 9, 0))
            .await
            .unwrap()
            .record;

        assert_eq!(stores.blobs.uploaded().len(), 4);
        assert!(record.photos.workstation_url.contains("/workstation-"));
    }

    #[tokio::test]
    async fn first_upload_failure_abandons_the_rest() {
        let (stores, caller) = setup("09:00", "18:00");
        stores.blobs.fail_uploads_matching("/selfie-");
        stores
            .blobs
            .slow_uploads_matching("/grooming-", std::time::Duration::from_millis(200));

        let result = check_in_at(&stores, &caller, local_instant(2024, 6, 3, 9, 0)).await;
        assert!(matches!(result, Err(AppError::PhotoUpload(_))));

        // Long enough for the slow upload to have finished had it kept running
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        assert!(
            !stores
                .blobs
                .uploaded()
                .iter()
                .any(|key| key.contains("/grooming-"))
        );
        assert!(stores.attendance.all().is_empty());
    }

    #[tokio::test]
    async fn failed_write_leaves_score_untouched() {
        let (stores, caller) = setup("09:00", "18:00");
        stores.attendance.fail_writes(true);

        let result = check_in_at(&stores, &caller, local_instant(2024, 6, 3, 9, 40)).await;

        assert!(matches!(result, Err(AppError::Database(_))));
        assert_eq!(stores.staff.snapshot(caller.staff_id).unwrap().score, 100);
    }

    #[tokio::test]
    async fn inverted_shift_configuration_is_rejected() {
        let (stores, caller) = setup("18:00", "09:00");

        let result = check_in_at(&stores, &caller, local_instant(2024, 6, 3, 9, 0)).await;

        assert!(matches!(result, Err(AppError::InvalidShiftConfiguration)));
        assert!(stores.blobs.uploaded().is_empty());
    }

    #[tokio::test]
    async fn managers_cannot_check_in() {
        let (stores, mut caller) = setup("09:00", "18:00");
        caller.role = Role::Manager;

        let result = check_in_at(&stores, &caller, local_instant(2024, 6, 3, 9, 0)).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn late_checkin_still_succeeds_when_directory_write_is_lost() {
        let (stores, caller) = setup("09:00", "18:00");
        stores.staff.conflict_next_writes(10, 100);

        let response = check_in_at(&stores, &caller, local_instant(2024, 6, 3, 9, 40))
            .await
            .unwrap();

        assert!(response.record.is_late);
        assert!(response.score_update.is_none());
    }

    #[tokio::test]
    async fn early_checkout_adds_to_late_deduction() {
        let (stores, caller) = setup("09:00", "18:00");
        check_in_at(&stores, &caller, local_instant(2024, 6, 3, 9, 28))
            .await
            .unwrap();

        let response = check_out(&stores.stores(), &caller, local_instant(2024, 6, 3, 17, 20))
            .await
            .unwrap();

        assert!(response.is_early);
        assert_eq!(response.verdict.allowed_window, [17 * 60 + 33, 18 * 60 + 27]);
        assert_eq!(response.record.status, AttendanceStatus::EarlyCheckout);
        assert!(response.record.is_early_checkout);
        assert_eq!(response.shift_duration, 7 * 60 + 52);
        assert_eq!(response.record.score_deduction, LATE_CHECKIN + EARLY_CHECKOUT);
        assert_eq!(
            response.record.deduction_reason.as_deref(),
            Some("Late check-in; Early checkout")
        );
        let update = response.score_update.unwrap();
        assert_eq!((update.previous_score, update.new_score), (95, 90));
        assert_eq!(stores.staff.snapshot(caller.staff_id).unwrap().score, 90);
    }

    #[tokio::test]
    async fn checkout_inside_window_is_not_penalized() {
        let (stores, caller) = setup("09:00", "18:00");
        check_in_at(&stores, &caller, local_instant(2024, 6, 3, 9, 0))
            .await
            .unwrap();

        let response = check_out(&stores.stores(), &caller, local_instant(2024, 6, 3, 17, 33))
            .await
            .unwrap();

        assert!(!response.is_early);
        assert!(response.verdict.is_within_tolerance);
        assert_eq!(response.record.status, AttendanceStatus::CheckedOut);
        assert_eq!(response.shift_duration, 8 * 60 + 33);
        assert!(response.score_update.is_none());
        assert_eq!(stores.attendance.all()[0], response.record);
    }

    #[tokio::test]
    async fn late_checkout_is_not_penalized() {
        let (stores, caller) = setup("09:00", "18:00");
        check_in_at(&stores, &caller, local_instant(2024, 6, 3, 9, 0))
            .await
            .unwrap();

        let response = check_out(&stores.stores(), &caller, local_instant(2024, 6, 3, 20, 30))
            .await
            .unwrap();

        assert!(!response.is_early);
        assert!(!response.verdict.is_within_tolerance);
        assert_eq!(response.record.status, AttendanceStatus::CheckedOut);
    }

    #[tokio::test]
    async fn checkout_uses_shift_captured_at_checkin() {
        let (stores, caller) = setup("09:00", "18:00");
        check_in_at(&stores, &caller, local_instant(2024, 6, 3, 9, 0))
            .await
            .unwrap();
        // Shift moved later after check-in; 17:40 is fine against the original 18:00 end
        stores
            .staff
            .insert({
                let mut staff = stores.staff.snapshot(caller.staff_id).unwrap();
                staff.shift_end_time = Some("21:00".to_string());
                staff
            });

        let response = check_out(&stores.stores(), &caller, local_instant(2024, 6, 3, 17, 40))
            .await
            .unwrap();

        assert!(!response.is_early);
    }

    #[tokio::test]
    async fn checkout_without_checkin_is_rejected() {
        let (stores, caller) = setup("09:00", "18:00");

        let result = check_out(&stores.stores(), &caller, local_instant(2024, 6, 3, 18, 0)).await;

        assert!(matches!(result, Err(AppError::NoCheckinFound)));
    }

    #[tokio::test]
    async fn second_checkout_is_rejected() {
        let (stores, caller) = setup("09:00", "18:00");
        check_in_at(&stores, &caller, local_instant(2024, 6, 3, 9, 0))
            .await
            .unwrap();
        check_out(&stores.stores(), &caller, local_instant(2024, 6, 3, 17, 0))
            .await
            .unwrap();

        let again = check_out(&stores.stores(), &caller, local_instant(2024, 6, 3, 18, 0)).await;

        assert!(matches!(again, Err(AppError::AlreadyCheckedOut)));
        // The early checkout was deducted once
        assert_eq!(stores.staff.snapshot(caller.staff_id).unwrap().score, 95);
    }

    #[tokio::test]
    async fn checkout_after_ceiling_reports_auto_closure() {
        let (stores, caller) = setup("09:00", "18:00");
        let checkin = local_instant(2024, 6, 3, 9, 0);
        check_in_at(&stores, &caller, checkin)
            .await
            .unwrap();

        let result = check_out(&stores.stores(), &caller, local_instant(2024, 6, 3, 22, 0)).await;

        assert!(matches!(result, Err(AppError::AlreadyCheckedOut)));
        let stored = &stores.attendance.all()[0];
        assert_eq!(stored.status, AttendanceStatus::AutoCheckout);
        assert_eq!(stored.checkout_time, Some(checkin + Duration::hours(12)));
    }

    #[tokio::test]
    async fn read_after_thirteen_hours_sweeps_forgotten_shift() {
        let (stores, caller) = setup("09:00", "18:00");
        let checkin = local_instant(2024, 6, 3, 9, 0);
        check_in_at(&stores, &caller, checkin)
            .await
            .unwrap();

        let record = today_record(&stores.stores(), &caller, checkin + Duration::hours(13))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(record.checkout_time, Some(checkin + Duration::hours(12)));
        assert_eq!(record.status, AttendanceStatus::AutoCheckout);
        assert_eq!(record.shift_duration, Some(720));
        assert_eq!(record.deduction_reason.as_deref(), Some(AUTO_CHECKOUT_REASON));
        assert_eq!(stores.staff.snapshot(caller.staff_id).unwrap().score, 90);
    }

    #[tokio::test]
    async fn today_record_is_none_before_checkin() {
        let (stores, caller) = setup("09:00", "18:00");

        let record = today_record(&stores.stores(), &caller, local_instant(2024, 6, 3, 9, 0))
            .await
            .unwrap();

        assert!(record.is_none());
    }

    #[tokio::test]
    async fn list_sweeps_every_record_it_returns() {
        let (stores, caller) = setup("09:00", "18:00");
        for day in 3..=5 {
            check_in_at(&stores, &caller, local_instant(2024, 6, day, 9, 0))
                .await
                .unwrap();
        }
        let query = AttendanceQuery {
            from: NaiveDate::from_ymd_opt(2024, 6, 3),
            to: NaiveDate::from_ymd_opt(2024, 6, 5),
            staff_id: None,
        };

        let now = local_instant(2024, 6, 5, 12, 0);
        let records = list_records(&stores.stores(), &caller, query, now)
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        let auto_closed = records
            .iter()
            .filter(|r| r.status == AttendanceStatus::AutoCheckout)
            .count();
        // 3 and 4 June are past the ceiling; 5 June is still open
        assert_eq!(auto_closed, 2);
        assert_eq!(stores.staff.snapshot(caller.staff_id).unwrap().score, 80);
    }

    #[tokio::test]
    async fn staff_cannot_list_colleagues() {
        let (stores, caller) = setup("09:00", "18:00");
        let query = AttendanceQuery {
            staff_id: Some(Uuid::new_v4()),
            ..Default::default()
        };

        let now = local_instant(2024, 6, 3, 9, 0);
        let result = list_records(&stores.stores(), &caller, query, now).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn managers_list_their_franchise() {
        let (stores, caller) = setup("09:00", "18:00");
        let mut colleague = staff_member("09:00", "18:00");
        colleague.franchise_id = caller.franchise_id;
        stores.staff.insert(colleague.clone());
        let outsider = staff_member("09:00", "18:00");
        stores.staff.insert(outsider.clone());
        let now = local_instant(2024, 6, 3, 9, 0);
        for who in [caller.clone(), auth_for(&colleague), auth_for(&outsider)] {
            check_in(&stores.stores(), &who, full_photo_set(), now).await.unwrap();
        }
        let mut manager = caller.clone();
        manager.staff_id = Uuid::new_v4();
        manager.role = Role::Manager;

        let all = list_records(&stores.stores(), &manager, AttendanceQuery::default(), now)
            .await
            .unwrap();
        let one = list_records(
            &stores.stores(),
            &manager,
            AttendanceQuery {
                staff_id: Some(colleague.id),
                ..Default::default()
            },
            now,
        )
        .await
        .unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].staff_id, colleague.id);
    }

    #[tokio::test]
    async fn inverted_date_range_is_rejected() {
        let (stores, caller) = setup("09:00", "18:00");
        let query = AttendanceQuery {
            from: NaiveDate::from_ymd_opt(2024, 6, 5),
            to: NaiveDate::from_ymd_opt(2024, 6, 3),
            staff_id: None,
        };

        let now = local_instant(2024, 6, 5, 9, 0);
        let result = list_records(&stores.stores(), &caller, query, now).await;

        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }
}
