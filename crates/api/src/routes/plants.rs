//! Mounted at `/plants` by `api_routes()`.

use axum::routing::get;
use axum::Router;

use crate::handlers::notifications;
use crate::state::AppState;

/// ```text
/// GET /{plant}/recipients -> list_recipients
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{plant}/recipients", get(notifications::list_recipients))
}
