//! Attendance reports over a day or an ISO week.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        attendance::AttendanceRecord,
        report::{DateRange, RangeKind, ReportQuery, ReportResponse, StaffSummary},
        staff::{Role, Staff},
    },
    services::{clock::local_date, score_ledger::effective_score, sweeper},
    store::Stores,
};

/// Report window containing `anchor`.
///
/// `Week` runs Monday to Sunday; a Sunday anchor belongs to the week that
/// started the previous Monday.
pub fn date_range(kind: RangeKind, anchor: NaiveDate) -> DateRange {
    match kind {
        RangeKind::Day => DateRange {
            start: anchor,
            end: anchor,
        },
        RangeKind::Week => {
            let start = anchor - Duration::days(anchor.weekday().num_days_from_monday() as i64);
            DateRange {
                start,
                end: start + Duration::days(6),
            }
        }
    }
}

/// Count attendance per staff member within `range`.
///
/// `records` must already be swept. Staff without records still appear,
/// with zero counts and their live score.
pub fn build_report(
    staff: &[Staff],
    records: &[AttendanceRecord],
    range: DateRange,
    now: DateTime<Utc>,
) -> Vec<StaffSummary> {
    staff
        .iter()
        .map(|member| {
            let mut summary = StaffSummary {
                staff_id: member.id,
                staff_name: member.name.clone(),
                employee_id: member.employee_id.clone(),
                present_days: 0,
                late_days: 0,
                early_checkout_days: 0,
                score: effective_score(member, now),
            };

            for record in records
                .iter()
                .filter(|r| r.staff_id == member.id && range.contains(r.date))
            {
                // Every stored record carries a check-in
                summary.present_days += 1;
                if record.is_late {
                    summary.late_days += 1;
                }
                if record.is_early_checkout {
                    summary.early_checkout_days += 1;
                }
            }

            summary
        })
        .collect()
}

/// Franchise-wide report for a manager.
///
/// # Errors
///
/// - `Forbidden`: caller is not a manager
/// - `Database`: storage failure while reading or sweeping
pub async fn franchise_report(
    stores: &Stores,
    caller: &AuthContext,
    query: ReportQuery,
    now: DateTime<Utc>,
) -> Result<ReportResponse, AppError> {
    if caller.role != Role::Manager {
        return Err(AppError::Forbidden(
            "Only managers can view attendance reports".to_string(),
        ));
    }

    let anchor = query.date.unwrap_or_else(|| local_date(now));
    let range = date_range(query.range, anchor);

    let records = stores
        .attendance
        .query_by_franchise(caller.franchise_id, range.start, range.end)
        .await?;
    let records = sweeper::sweep_all(stores, records, now).await?;

    // Read after sweeping so auto-checkout deductions show in the scores
    let staff = stores.staff.list_by_franchise(caller.franchise_id).await?;

    Ok(ReportResponse {
        range: query.range,
        start: range.start,
        end: range.end,
        staff: build_report(&staff, &records, range, now),
    })
}
