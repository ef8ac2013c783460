//! Route definitions for stored defect photos.
//!
//! Merged at the API root by `api_routes()`; uploads live under `/audits`.

use axum::routing::get;
use axum::Router;

use crate::handlers::photos;
use crate::state::AppState;

/// ```text
/// GET    /defects/{id}/photos   -> list_defect_photos
/// GET    /photos/{id}           -> get_photo
/// DELETE /photos/{id}           -> delete_photo
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/defects/{id}/photos", get(photos::list_defect_photos))
        .route(
            "/photos/{id}",
            get(photos::get_photo).delete(photos::delete_photo),
        )
}
