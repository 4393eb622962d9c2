//! In-memory collaborators and fixtures for tests.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tokio::sync::Barrier;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        attendance::{AttendanceRecord, PhotoSet, PhotoSlot, PhotoUpload},
        staff::{Role, ScoreWrite, Staff},
    },
    services::clock::LOCAL_ZONE,
    store::{AttendanceStore, BlobStore, StaffDirectory, Stores},
};

/// Instant for a wall-clock time in the local zone.
pub fn local_instant(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    LOCAL_ZONE
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn staff_member(shift_start: &str, shift_end: &str) -> Staff {
    Staff {
        id: Uuid::new_v4(),
        name: "Asha Rao".to_string(),
        employee_id: "EMP-014".to_string(),
        franchise_id: Uuid::new_v4(),
        franchise_name: "Koramangala Kitchen".to_string(),
        role: Role::Staff,
        shift_start_time: Some(shift_start.to_string()),
        shift_end_time: Some(shift_end.to_string()),
        score: 100,
        score_last_reset: None,
        score_version: 0,
    }
}

pub fn auth_for(staff: &Staff) -> AuthContext {
    AuthContext {
        staff_id: staff.id,
        name: staff.name.clone(),
        employee_id: staff.employee_id.clone(),
        franchise_id: staff.franchise_id,
        franchise_name: staff.franchise_name.clone(),
        role: staff.role,
    }
}

pub fn full_photo_set() -> PhotoSet {
    let mut photos = PhotoSet::default();
    for slot in PhotoSlot::ALL {
        photos.set(
            slot,
            PhotoUpload {
                bytes: Bytes::from_static(b"\xff\xd8\xff\xe0jpeg"),
                content_type: "image/jpeg".to_string(),
            },
        );
    }
    photos
}

/// Collaborators backed by fresh in-memory doubles.
pub struct TestStores {
    pub staff: Arc<MemoryStaffDirectory>,
    pub attendance: Arc<MemoryAttendanceStore>,
    pub blobs: Arc<MemoryBlobStore>,
}

impl TestStores {
    pub fn new() -> Self {
        Self {
            staff: Arc::new(MemoryStaffDirectory::default()),
            attendance: Arc::new(MemoryAttendanceStore::default()),
            blobs: Arc::new(MemoryBlobStore::default()),
        }
    }

    pub fn stores(&self) -> Stores {
        Stores {
            staff: self.staff.clone(),
            attendance: self.attendance.clone(),
            blobs: self.blobs.clone(),
        }
    }
}

#[derive(Default)]
pub struct MemoryStaffDirectory {
    staff: Mutex<HashMap<Uuid, Staff>>,
    fail_reads: AtomicBool,
    // (remaining conflicting writes, score a competing writer leaves behind)
    conflicts: Mutex<(usize, i32)>,
}

impl MemoryStaffDirectory {
    pub fn insert(&self, staff: Staff) {
        self.staff.lock().unwrap().insert(staff.id, staff);
    }

    pub fn snapshot(&self, staff_id: Uuid) -> Option<Staff> {
        self.staff.lock().unwrap().get(&staff_id).cloned()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make the next `count` score writes lose to a competing writer that
    /// leaves `score` behind.
    pub fn conflict_next_writes(&self, count: usize, score: i32) {
        *self.conflicts.lock().unwrap() = (count, score);
    }
}

#[async_trait]
impl StaffDirectory for MemoryStaffDirectory {
    async fn get(&self, staff_id: Uuid) -> Result<Option<Staff>, AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.snapshot(staff_id))
    }

    async fn list_by_franchise(&self, franchise_id: Uuid) -> Result<Vec<Staff>, AppError> {
        let mut staff: Vec<Staff> = self
            .staff
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.franchise_id == franchise_id && s.role == Role::Staff)
            .cloned()
            .collect();
        staff.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(staff)
    }

    async fn update_score(
        &self,
        staff_id: Uuid,
        expected_version: i64,
        write: &ScoreWrite,
    ) -> Result<bool, AppError> {
        let mut staff = self.staff.lock().unwrap();
        let Some(entry) = staff.get_mut(&staff_id) else {
            return Ok(false);
        };

        let mut conflicts = self.conflicts.lock().unwrap();
        if conflicts.0 > 0 {
            conflicts.0 -= 1;
            entry.score = conflicts.1;
            entry.score_last_reset = Some(write.score_last_reset.clone());
            entry.score_version += 1;
            return Ok(false);
        }

        if entry.score_version != expected_version {
            return Ok(false);
        }
        entry.score = write.score;
        entry.score_last_reset = Some(write.score_last_reset.clone());
        entry.score_version += 1;
        Ok(true)
    }

    async fn update_shift(
        &self,
        staff_id: Uuid,
        start: &str,
        end: &str,
    ) -> Result<bool, AppError> {
        let mut staff = self.staff.lock().unwrap();
        match staff.get_mut(&staff_id) {
            Some(entry) => {
                entry.shift_start_time = Some(start.to_string());
                entry.shift_end_time = Some(end.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryAttendanceStore {
    records: Mutex<Vec<AttendanceRecord>>,
    fail_writes: AtomicBool,
    close_calls: AtomicUsize,
}

impl MemoryAttendanceStore {
    pub fn all(&self) -> Vec<AttendanceRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Store a record directly, bypassing check-in.
    pub fn seed(&self, record: AttendanceRecord) {
        self.records.lock().unwrap().push(record);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl AttendanceStore for MemoryAttendanceStore {
    async fn get(
        &self,
        staff_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AppError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.staff_id == staff_id && r.date == date)
            .cloned())
    }

    async fn insert(&self, record: &AttendanceRecord) -> Result<(), AppError> {
        self.check_writable()?;
        let mut records = self.records.lock().unwrap();
        if records
            .iter()
            .any(|r| r.staff_id == record.staff_id && r.date == record.date)
        {
            return Err(AppError::DuplicateCheckin);
        }
        records.push(record.clone());
        Ok(())
    }

    async fn close(&self, record: &AttendanceRecord) -> Result<bool, AppError> {
        self.check_writable()?;
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        match records
            .iter_mut()
            .find(|r| r.id == record.id && r.checkout_time.is_none())
        {
            Some(stored) => {
                *stored = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn query_by_staff(
        &self,
        staff_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.staff_id == staff_id && from <= r.date && r.date <= to)
            .cloned()
            .collect())
    }

    async fn query_by_franchise(
        &self,
        franchise_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.franchise_id == franchise_id && from <= r.date && r.date <= to)
            .cloned()
            .collect())
    }
}

/// How long a gated upload waits for the rest of its batch.
const BATCH_WAIT: Duration = Duration::from_secs(2);

#[derive(Default)]
pub struct MemoryBlobStore {
    uploaded: Mutex<Vec<String>>,
    failing_key_fragment: Mutex<Option<String>>,
    slow_key_fragment: Mutex<Option<(String, Duration)>>,
    batch_gate: Mutex<Option<Arc<Barrier>>>,
}

impl MemoryBlobStore {
    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    /// Fail any upload whose key contains `fragment`.
    pub fn fail_uploads_matching(&self, fragment: &str) {
        *self.failing_key_fragment.lock().unwrap() = Some(fragment.to_string());
    }

    /// Delay any upload whose key contains `fragment` before it succeeds.
    pub fn slow_uploads_matching(&self, fragment: &str, delay: Duration) {
        *self.slow_key_fragment.lock().unwrap() = Some((fragment.to_string(), delay));
    }

    /// Hold every upload until `size` uploads are in flight together.
    ///
    /// An upload that waits longer than `BATCH_WAIT` fails, so uploads
    /// issued one after another never complete.
    pub fn require_batches_of(&self, size: usize) {
        *self.batch_gate.lock().unwrap() = Some(Arc::new(Barrier::new(size)));
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, key: &str, _photo: &PhotoUpload) -> Result<String, AppError> {
        let gate = self.batch_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            if tokio::time::timeout(BATCH_WAIT, gate.wait()).await.is_err() {
                return Err(AppError::PhotoUpload(format!(
                    "upload of {} was never joined by its batch",
                    key
                )));
            }
        }

        let failing = self.failing_key_fragment.lock().unwrap().clone();
        if let Some(fragment) = failing {
            if key.contains(&fragment) {
                return Err(AppError::PhotoUpload(format!("upload of {} refused", key)));
            }
        }

        let slow = self.slow_key_fragment.lock().unwrap().clone();
        if let Some((fragment, delay)) = slow {
            if key.contains(&fragment) {
                tokio::time::sleep(delay).await;
            }
        }

        self.uploaded.lock().unwrap().push(key.to_string());
        Ok(format!("https://blobs.test/{}", key))
    }
}
