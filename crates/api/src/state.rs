use std::sync::Arc;

use campus_db::store::SchoolStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend chosen at startup (PostgreSQL or in-memory).
    pub store: Arc<dyn SchoolStore>,
    /// Server configuration (JWT settings are read by the auth extractors).
    pub config: Arc<ServerConfig>,
}
