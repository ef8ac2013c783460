pub mod audits;
pub mod catalog;
pub mod health;
pub mod photos;
pub mod plants;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /audits                                          submit, list
/// /audits/{id}                                     get, replace, delete
/// /audits/{id}/report                              failure report
/// /audits/{id}/notifications                       send failure notification (POST)
/// /audits/{id}/defects/{defect_id}/photos          upload photo (multipart)
///
/// /defects/{id}/photos                             photo metadata list
/// /photos/{id}                                     download, delete
///
/// /plants/{plant}/recipients                       notification recipients
///
/// /catalog/plants                                  plant lookup
/// /catalog/plants/{plant}/modules                  module lookup
/// /catalog/modules/{module}/purchase-orders        PO lookup
/// /catalog/purchase-orders/{po}/sizes              size lookup (404 when empty)
/// /catalog/purchase-orders/{po}/customers          customer lookup
/// /catalog/purchase-orders/{po}/styles             style lookup (404 when empty)
/// /catalog/purchase-orders/{po}/colors             colour lookup
/// /catalog/purchase-orders/{po}/customer-po-numbers
/// /catalog/defect-categories                       defect category lookup
/// /catalog/defect-categories/{category}/codes      defect code lookup
/// /catalog/location-categories                     location category lookup
/// /catalog/location-categories/{category}/locations
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .nest("/audits", audits::router(config.photo_max_bytes))
        .merge(photos::router())
        .nest("/plants", plants::router())
        .nest("/catalog", catalog::router())
}
