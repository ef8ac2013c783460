//! Route definitions for reference-data lookups.
//!
//! Mounted at `/catalog` by `api_routes()`.

use axum::routing::get;
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plants", get(catalog::list_plants))
        .route("/plants/{plant}/modules", get(catalog::list_modules))
        .route(
            "/modules/{module}/purchase-orders",
            get(catalog::list_purchase_orders),
        )
        .route("/purchase-orders/{po}/sizes", get(catalog::list_sizes))
        .route("/purchase-orders/{po}/customers", get(catalog::list_customers))
        .route("/purchase-orders/{po}/styles", get(catalog::list_styles))
        .route("/purchase-orders/{po}/colors", get(catalog::list_colors))
        .route(
            "/purchase-orders/{po}/customer-po-numbers",
            get(catalog::list_customer_po_numbers),
        )
        .route("/defect-categories", get(catalog::list_defect_categories))
        .route(
            "/defect-categories/{category}/codes",
            get(catalog::list_defect_codes),
        )
        .route(
            "/location-categories",
            get(catalog::list_location_categories),
        )
        .route(
            "/location-categories/{category}/locations",
            get(catalog::list_defect_locations),
        )
}
