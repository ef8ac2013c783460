//! Handlers for the cascading reference-data lookups behind the
//! inspection form.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use fca_core::error::CoreError;
use fca_db::repositories::CatalogRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Reject an empty lookup for lists the form cannot proceed without.
fn non_empty<T>(items: Vec<T>, entity: &'static str, key: &str) -> AppResult<Vec<T>> {
    if items.is_empty() {
        return Err(AppError::Core(CoreError::NotFoundByKey {
            entity,
            key: key.to_string(),
        }));
    }
    Ok(items)
}

// ---------------------------------------------------------------------------
// Purchase-order catalog
// ---------------------------------------------------------------------------

pub async fn list_plants(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let data = CatalogRepo::plants(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

pub async fn list_modules(
    State(state): State<AppState>,
    Path(plant): Path<String>,
) -> AppResult<impl IntoResponse> {
    let data = CatalogRepo::modules(&state.pool, &plant).await?;
    Ok(Json(DataResponse { data }))
}

pub async fn list_purchase_orders(
    State(state): State<AppState>,
    Path(module): Path<String>,
) -> AppResult<impl IntoResponse> {
    let data = CatalogRepo::purchase_orders(&state.pool, &module).await?;
    Ok(Json(DataResponse { data }))
}

/// Sizes cut for a purchase order. 404 when the PO has none.
pub async fn list_sizes(
    State(state): State<AppState>,
    Path(po): Path<String>,
) -> AppResult<impl IntoResponse> {
    let sizes = CatalogRepo::sizes(&state.pool, &po).await?;
    let data = non_empty(sizes, "Sizes for purchase order", &po)?;
    Ok(Json(DataResponse { data }))
}

pub async fn list_customers(
    State(state): State<AppState>,
    Path(po): Path<String>,
) -> AppResult<impl IntoResponse> {
    let data = CatalogRepo::customers(&state.pool, &po).await?;
    Ok(Json(DataResponse { data }))
}

/// Styles for a purchase order. 404 when the PO has none.
pub async fn list_styles(
    State(state): State<AppState>,
    Path(po): Path<String>,
) -> AppResult<impl IntoResponse> {
    let styles = CatalogRepo::styles(&state.pool, &po).await?;
    let data = non_empty(styles, "Styles for purchase order", &po)?;
    Ok(Json(DataResponse { data }))
}

pub async fn list_colors(
    State(state): State<AppState>,
    Path(po): Path<String>,
) -> AppResult<impl IntoResponse> {
    let data = CatalogRepo::colors(&state.pool, &po).await?;
    Ok(Json(DataResponse { data }))
}

pub async fn list_customer_po_numbers(
    State(state): State<AppState>,
    Path(po): Path<String>,
) -> AppResult<impl IntoResponse> {
    let data = CatalogRepo::customer_po_numbers(&state.pool, &po).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Defect codes and locations
// ---------------------------------------------------------------------------

pub async fn list_defect_categories(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let data = CatalogRepo::defect_categories(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

pub async fn list_defect_codes(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<impl IntoResponse> {
    let data = CatalogRepo::defect_codes(&state.pool, &category).await?;
    Ok(Json(DataResponse { data }))
}

pub async fn list_location_categories(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let data = CatalogRepo::location_categories(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

pub async fn list_defect_locations(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<impl IntoResponse> {
    let data = CatalogRepo::defect_locations(&state.pool, &category).await?;
    Ok(Json(DataResponse { data }))
}
