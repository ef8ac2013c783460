//! Route definitions for audits and their photo uploads.
//!
//! Mounted at `/audits` by `api_routes()`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{audits, notifications, photos, reports};
use crate::state::AppState;

/// Room for multipart boundaries and part headers on top of the photo cap.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Audit routes.
///
/// ```text
/// POST   /                                  -> create_audit
/// GET    /                                  -> list_audits
/// GET    /{id}                              -> get_audit
/// PUT    /{id}                              -> update_audit
/// DELETE /{id}                              -> delete_audit
/// GET    /{id}/report                       -> get_failure_report
/// POST   /{id}/notifications                -> send_failure_notification
/// POST   /{id}/defects/{defect_id}/photos   -> upload_photo (multipart)
/// ```
pub fn router(photo_max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(audits::create_audit).get(audits::list_audits))
        .route(
            "/{id}",
            get(audits::get_audit)
                .put(audits::update_audit)
                .delete(audits::delete_audit),
        )
        .route("/{id}/report", get(reports::get_failure_report))
        .route(
            "/{id}/notifications",
            post(notifications::send_failure_notification),
        )
        .route(
            "/{id}/defects/{defect_id}/photos",
            post(photos::upload_photo).layer(DefaultBodyLimit::max(
                photo_max_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
            )),
        )
}
