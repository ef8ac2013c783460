//! Handlers for audit submission, revision, deletion and listing.
//!
//! Payloads are validated in full before any storage call; a rejected
//! submission never opens a transaction.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use fca_core::audit::{apply_identity_fallback, validate_submission, AuditStatus, ValidatedAudit};
use fca_core::error::CoreError;
use fca_core::pagination::PageRequest;
use fca_core::types::DbId;
use fca_db::models::audit::{AuditFilter, AuditListParams};
use fca_db::repositories::AuditRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::identity::Identity;
use crate::response::MessageResponse;
use crate::state::AppState;

/// Parse the JSON body, fill `createdBy` from the caller if absent, and
/// validate.
fn validated_payload(
    payload: Result<Json<Value>, JsonRejection>,
    identity: Option<Identity>,
) -> AppResult<ValidatedAudit> {
    let Json(mut payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if let Some(identity) = identity {
        apply_identity_fallback(&mut payload, identity.as_str());
    }
    Ok(validate_submission(&payload)?)
}

// ---------------------------------------------------------------------------
// POST /audits
// ---------------------------------------------------------------------------

/// Submit an audit with its defect entries.
///
/// Responds `201 { auditId, defects }` so the caller can attach photos to
/// the returned defect ids.
pub async fn create_audit(
    identity: Option<Identity>,
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let input = validated_payload(payload, identity)?;

    let saved = AuditRepo::create(&state.pool, &input).await?;

    tracing::info!(
        audit_id = saved.audit_id,
        defect_count = saved.defects.len(),
        created_by = %input.created_by,
        "Audit submitted",
    );

    Ok((StatusCode::CREATED, Json(saved)))
}

// ---------------------------------------------------------------------------
// GET /audits
// ---------------------------------------------------------------------------

/// List audits, newest first, with optional filters and pagination.
pub async fn list_audits(
    State(state): State<AppState>,
    params: Result<Query<AuditListParams>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let page = PageRequest::from_params(params.page, params.limit)?;
    let mut filter = AuditFilter::from_params(&params);

    // Normalize so "pass" filters the same rows as "Pass".
    if let Some(raw) = filter.status.take() {
        let status = AuditStatus::parse(&raw).ok_or_else(|| {
            CoreError::invalid("status", format!("'{raw}' is not a known status"))
        })?;
        filter.status = Some(status.as_str().to_string());
    }

    let result = AuditRepo::list(&state.pool, &filter, page).await?;
    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// GET /audits/{id}
// ---------------------------------------------------------------------------

/// Fetch one audit with its defects nested.
pub async fn get_audit(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let doc = AuditRepo::find_document(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Audit", id }))?;
    Ok(Json(doc))
}

// ---------------------------------------------------------------------------
// PUT /audits/{id}
// ---------------------------------------------------------------------------

/// Replace an audit and its entire defect set.
pub async fn update_audit(
    identity: Option<Identity>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let input = validated_payload(payload, identity)?;

    let saved = AuditRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Audit", id }))?;

    tracing::info!(
        audit_id = id,
        defect_count = saved.defects.len(),
        "Audit updated",
    );

    Ok(Json(MessageResponse::new("Audit updated successfully")))
}

// ---------------------------------------------------------------------------
// DELETE /audits/{id}
// ---------------------------------------------------------------------------

/// Delete an audit with its defects and their photos.
pub async fn delete_audit(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = AuditRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Audit", id }))?;

    tracing::info!(
        audit_id = id,
        defects = deleted.defects,
        photos = deleted.photos,
        "Audit deleted",
    );

    Ok(Json(MessageResponse::new("Audit deleted successfully")))
}
