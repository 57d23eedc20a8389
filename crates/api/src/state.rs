use std::sync::Arc;

use reelmeta_stream::StreamClient;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: reelmeta_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Streaming provider client. `None` when the provider credentials
    /// are not configured; upload and refresh endpoints answer 503.
    pub stream: Option<Arc<StreamClient>>,
}
