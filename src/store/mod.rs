//! Collaborators consumed by the attendance engine.
//!
//! The engine talks to three external systems through these traits:
//! - `StaffDirectory`: staff entities, shift configuration and scores
//! - `AttendanceStore`: persisted attendance records
//! - `BlobStore`: photo storage
//!
//! Production implementations live in `postgres` and `http_blob`. Tests use
//! the in-memory doubles in `memory`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        attendance::{AttendanceRecord, PhotoUpload},
        staff::{ScoreWrite, Staff},
    },
};

pub mod http_blob;
#[cfg(test)]
pub mod memory;
pub mod postgres;

#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn get(&self, staff_id: Uuid) -> Result<Option<Staff>, AppError>;

    async fn list_by_franchise(&self, franchise_id: Uuid) -> Result<Vec<Staff>, AppError>;

    /// Write a new score if the stored `score_version` still equals
    /// `expected_version`. Returns false when another writer got there first.
    async fn update_score(
        &self,
        staff_id: Uuid,
        expected_version: i64,
        write: &ScoreWrite,
    ) -> Result<bool, AppError>;

    /// Returns false if the staff member does not exist.
    async fn update_shift(&self, staff_id: Uuid, start: &str, end: &str)
    -> Result<bool, AppError>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn get(
        &self,
        staff_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AppError>;

    /// Insert a freshly opened record.
    ///
    /// # Errors
    ///
    /// `DuplicateCheckin` if a record already exists for `(staff_id, date)`.
    async fn insert(&self, record: &AttendanceRecord) -> Result<(), AppError>;

    /// Persist the closing fields of a record, only if it is still open.
    ///
    /// Returns false when the stored record was already closed, so concurrent
    /// closers can tell which of them won.
    async fn close(&self, record: &AttendanceRecord) -> Result<bool, AppError>;

    async fn query_by_staff(
        &self,
        staff_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError>;

    async fn query_by_franchise(
        &self,
        franchise_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload one photo under `key` and return its URL.
    ///
    /// # Errors
    ///
    /// `PhotoUpload` on any transport or upstream failure.
    async fn upload(&self, key: &str, photo: &PhotoUpload) -> Result<String, AppError>;
}

/// The engine's collaborators, shared across requests.
#[derive(Clone)]
pub struct Stores {
    pub staff: Arc<dyn StaffDirectory>,
    pub attendance: Arc<dyn AttendanceStore>,
    pub blobs: Arc<dyn BlobStore>,
}
