//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to deserialize environment variables into a type-safe struct.
//!
//! The local time zone offset and the auto-checkout ceiling are deliberately
//! not configurable here; see `services::clock` and `services::sweeper`.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `BLOB_STORE_URL` (required): base URL photos are uploaded under
/// - `BLOB_STORE_TOKEN` (optional): bearer token sent to the photo store
/// - `BLOB_UPLOAD_TIMEOUT_SECS` (optional): per-upload deadline, defaults to 15
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    pub blob_store_url: String,

    #[serde(default)]
    pub blob_store_token: Option<String>,

    #[serde(default = "default_upload_timeout")]
    pub blob_upload_timeout_secs: u64,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_upload_timeout() -> u64 {
    15
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Loads an optional `.env` file first, then deserializes the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value cannot be
    /// parsed into its expected type.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        // Field names are automatically converted: blob_store_url -> BLOB_STORE_URL
        envy::from_env::<Config>()
    }
}
