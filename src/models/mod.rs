//! Data models for the attendance engine.
//!
//! This module contains the entities the engine reads and writes and the
//! request/response bodies of the HTTP surface.

/// Attendance records and check-in/check-out bodies
pub mod attendance;
/// Report windows and per-staff summaries
pub mod report;
/// Staff directory entity and score snapshots
pub mod staff;
