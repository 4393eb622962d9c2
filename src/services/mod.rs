//! Business logic services.
//!
//! The attendance engine, leaves first:
//! - `clock`: wall-clock instants to local minutes, `HH:MM` parsing
//! - `tolerance`: late / early verdicts against a shift window
//! - `score_ledger`: disciplinary score with lazy monthly reset
//! - `sweeper`: read-time closure of shifts left open past 12 hours
//! - `attendance_service`: check-in / check-out lifecycle and reads
//! - `report_service`: per-staff day and week summaries
//! - `staff_service`: live score reads and shift configuration

pub mod attendance_service;
pub mod clock;
pub mod report_service;
pub mod score_ledger;
pub mod staff_service;
pub mod sweeper;
pub mod tolerance;
