//! HTTP request handlers (route handlers).
//!
//! Handlers stay thin: extract the caller and request data, stamp the
//! current time, and hand off to the services.

/// Check-in, check-out and attendance reads
pub mod attendance;
/// Health check endpoint
pub mod health;
/// Franchise attendance reports
pub mod reports;
/// Score reads and shift configuration
pub mod staff;
