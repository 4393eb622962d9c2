//! PostgreSQL-backed staff directory and attendance store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    db::{DbPool, is_unique_violation},
    error::AppError,
    models::{
        attendance::{AttendancePhotos, AttendanceRecord},
        staff::{ScoreWrite, Staff},
    },
    store::{AttendanceStore, StaffDirectory},
};

/// Row of the `staff` table.
#[derive(Debug, sqlx::FromRow)]
struct StaffRow {
    id: Uuid,
    name: String,
    employee_id: String,
    franchise_id: Uuid,
    franchise_name: String,
    role: String,
    shift_start_time: Option<String>,
    shift_end_time: Option<String>,
    score: i32,
    score_last_reset: Option<String>,
    score_version: i64,
}

impl TryFrom<StaffRow> for Staff {
    type Error = AppError;

    fn try_from(row: StaffRow) -> Result<Self, Self::Error> {
        Ok(Staff {
            id: row.id,
            name: row.name,
            employee_id: row.employee_id,
            franchise_id: row.franchise_id,
            franchise_name: row.franchise_name,
            role: row
                .role
                .parse()
                .map_err(|e: String| AppError::Database(sqlx::Error::Decode(e.into())))?,
            shift_start_time: row.shift_start_time,
            shift_end_time: row.shift_end_time,
            score: row.score,
            score_last_reset: row.score_last_reset,
            score_version: row.score_version,
        })
    }
}

const STAFF_COLUMNS: &str = "id, name, employee_id, franchise_id, franchise_name, role, \
     shift_start_time, shift_end_time, score, score_last_reset, score_version";

pub struct PgStaffDirectory {
    pool: DbPool,
}

impl PgStaffDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffDirectory for PgStaffDirectory {
    async fn get(&self, staff_id: Uuid) -> Result<Option<Staff>, AppError> {
        let row = sqlx::query_as::<_, StaffRow>(&format!(
            "SELECT {} FROM staff WHERE id = $1",
            STAFF_COLUMNS
        ))
        .bind(staff_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Staff::try_from).transpose()
    }

    async fn list_by_franchise(&self, franchise_id: Uuid) -> Result<Vec<Staff>, AppError> {
        let rows = sqlx::query_as::<_, StaffRow>(&format!(
            "SELECT {} FROM staff WHERE franchise_id = $1 AND role = 'staff' ORDER BY name",
            STAFF_COLUMNS
        ))
        .bind(franchise_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Staff::try_from).collect()
    }

    async fn update_score(
        &self,
        staff_id: Uuid,
        expected_version: i64,
        write: &ScoreWrite,
    ) -> Result<bool, AppError> {
        // Conditional on the version read by the caller; a concurrent
        // deduction bumps it and this write affects no rows.
        let result = sqlx::query(
            r#"
            UPDATE staff
            SET score = $1,
                score_last_reset = $2,
                score_version = score_version + 1,
                updated_at = NOW()
            WHERE id = $3 AND score_version = $4
            "#,
        )
        .bind(write.score)
        .bind(&write.score_last_reset)
        .bind(staff_id)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_shift(
        &self,
        staff_id: Uuid,
        start: &str,
        end: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE staff
            SET shift_start_time = $1,
                shift_end_time = $2,
                updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(staff_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

/// Row of the `attendance_records` table.
#[derive(Debug, sqlx::FromRow)]
struct AttendanceRow {
    id: Uuid,
    staff_id: Uuid,
    staff_name: String,
    employee_id: String,
    franchise_id: Uuid,
    franchise_name: String,
    date: NaiveDate,
    checkin_time: DateTime<Utc>,
    checkout_time: Option<DateTime<Utc>>,
    scheduled_start_time: String,
    scheduled_end_time: String,
    is_late: bool,
    is_early_checkin: bool,
    is_early_checkout: bool,
    status: String,
    shift_duration: Option<i32>,
    score_deduction: i32,
    deduction_reason: Option<String>,
    selfie_url: String,
    uniform_url: String,
    workstation_url: String,
    grooming_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = AppError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(AttendanceRecord {
            id: row.id,
            staff_id: row.staff_id,
            staff_name: row.staff_name,
            employee_id: row.employee_id,
            franchise_id: row.franchise_id,
            franchise_name: row.franchise_name,
            date: row.date,
            checkin_time: row.checkin_time,
            checkout_time: row.checkout_time,
            scheduled_start_time: row.scheduled_start_time,
            scheduled_end_time: row.scheduled_end_time,
            is_late: row.is_late,
            is_early_checkin: row.is_early_checkin,
            is_early_checkout: row.is_early_checkout,
            status: row
                .status
                .parse()
                .map_err(|e: String| AppError::Database(sqlx::Error::Decode(e.into())))?,
            shift_duration: row.shift_duration,
            score_deduction: row.score_deduction,
            deduction_reason: row.deduction_reason,
            photos: AttendancePhotos {
                selfie_url: row.selfie_url,
                uniform_url: row.uniform_url,
                workstation_url: row.workstation_url,
                grooming_url: row.grooming_url,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgAttendanceStore {
    pool: DbPool,
}

impl PgAttendanceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for PgAttendanceStore {
    async fn get(
        &self,
        staff_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AppError> {
        let row = sqlx::query_as::<_, AttendanceRow>(
            "SELECT * FROM attendance_records WHERE staff_id = $1 AND date = $2",
        )
        .bind(staff_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AttendanceRecord::try_from).transpose()
    }

    async fn insert(&self, record: &AttendanceRecord) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_records (
                id, staff_id, staff_name, employee_id, franchise_id, franchise_name,
                date, checkin_time, checkout_time,
                scheduled_start_time, scheduled_end_time,
                is_late, is_early_checkin, is_early_checkout, status,
                shift_duration, score_deduction, deduction_reason,
                selfie_url, uniform_url, workstation_url, grooming_url,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24)
            "#,
        )
        .bind(record.id)
        .bind(record.staff_id)
        .bind(&record.staff_name)
        .bind(&record.employee_id)
        .bind(record.franchise_id)
        .bind(&record.franchise_name)
        .bind(record.date)
        .bind(record.checkin_time)
        .bind(record.checkout_time)
        .bind(&record.scheduled_start_time)
        .bind(&record.scheduled_end_time)
        .bind(record.is_late)
        .bind(record.is_early_checkin)
        .bind(record.is_early_checkout)
        .bind(record.status.as_str())
        .bind(record.shift_duration)
        .bind(record.score_deduction)
        .bind(&record.deduction_reason)
        .bind(&record.photos.selfie_url)
        .bind(&record.photos.uniform_url)
        .bind(&record.photos.workstation_url)
        .bind(&record.photos.grooming_url)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // The (staff_id, date) key lost a race with a concurrent check-in
            Err(e) if is_unique_violation(&e) => Err(AppError::DuplicateCheckin),
            Err(e) => Err(e.into()),
        }
    }

    async fn close(&self, record: &AttendanceRecord) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE attendance_records
            SET checkout_time = $1,
                shift_duration = $2,
                status = $3,
                is_early_checkout = $4,
                score_deduction = $5,
                deduction_reason = $6,
                updated_at = $7
            WHERE id = $8 AND checkout_time IS NULL
            "#,
        )
        .bind(record.checkout_time)
        .bind(record.shift_duration)
        .bind(record.status.as_str())
        .bind(record.is_early_checkout)
        .bind(record.score_deduction)
        .bind(&record.deduction_reason)
        .bind(record.updated_at)
        .bind(record.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn query_by_staff(
        &self,
        staff_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT * FROM attendance_records
            WHERE staff_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date DESC
            "#,
        )
        .bind(staff_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }

    async fn query_by_franchise(
        &self,
        franchise_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT * FROM attendance_records
            WHERE franchise_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date DESC, staff_name
            "#,
        )
        .bind(franchise_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }
}
