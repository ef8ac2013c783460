use std::sync::Arc;

use crate::config::ServerConfig;
use crate::notifications::Mailer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: fca_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Outbound transport for failure notifications.
    pub mailer: Arc<dyn Mailer>,
}
