//! Failure report handler.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use fca_core::error::CoreError;
use fca_core::types::DbId;
use fca_db::models::report::FailureReport;
use fca_db::repositories::{AuditRepo, DefectRepo, PhotoRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /audits/{id}/report
///
/// The audit, each defect with its photo metadata, and summary totals.
pub async fn get_failure_report(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let audit = AuditRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Audit", id }))?;

    let defects = DefectRepo::list_by_audit(&state.pool, id).await?;
    let photos = PhotoRepo::list_by_audit(&state.pool, id).await?;

    Ok(Json(FailureReport::assemble(audit, defects, photos)))
}
