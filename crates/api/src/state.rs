use std::sync::Arc;

use crate::config::ServerConfig;
use crate::sessions::ImportSessionStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: crm_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// In-flight import sessions keyed by session id.
    pub sessions: Arc<ImportSessionStore>,
}
