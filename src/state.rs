//! Shared application state handed to every handler.

use crate::{db::DbPool, store::Stores};

#[derive(Clone)]
pub struct AppState {
    /// Used directly by the auth middleware and health check
    pub pool: DbPool,
    pub stores: Stores,
}
