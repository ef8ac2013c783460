//! Handlers for failure notification recipients and sends.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use fca_core::error::CoreError;
use fca_core::notification::{self, DefectLine, DeliveryStatus, FailureNotice};
use fca_core::types::DbId;
use fca_db::models::notification::NewEmailLog;
use fca_db::repositories::{AuditRepo, DefectRepo, NotificationRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::identity::Identity;
use crate::notifications::{send_to_all, RecipientResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of a notification send that reached at least one recipient (or had
/// none to reach).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOutcome {
    pub status: &'static str,
    pub subject: String,
    pub results: Vec<RecipientResult>,
}

// ---------------------------------------------------------------------------
// GET /plants/{plant}/recipients
// ---------------------------------------------------------------------------

pub async fn list_recipients(
    State(state): State<AppState>,
    Path(plant): Path<String>,
) -> AppResult<impl IntoResponse> {
    let data = NotificationRepo::recipients(&state.pool, &plant).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// POST /audits/{id}/notifications
// ---------------------------------------------------------------------------

/// Send the failure notification for an audit to its plant's recipients.
///
/// `200` when every send succeeded (or there was nobody to send to), `207`
/// with per-recipient results when only some did, `502` when none did.
/// Every attempt is recorded in `email_log`.
pub async fn send_failure_notification(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let audit = AuditRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Audit", id }))?;

    let defects = DefectRepo::list_by_audit(&state.pool, id).await?;
    let recipients = NotificationRepo::recipients(&state.pool, &audit.plant).await?;

    let notice = FailureNotice {
        plant: &audit.plant,
        module: &audit.module,
        purchase_order: &audit.purchase_order,
        style: audit.style.as_deref(),
        defect_rate: audit.defect_rate,
        remarks: audit.remarks.as_deref(),
    };
    let lines: Vec<DefectLine<'_>> = defects
        .iter()
        .map(|d| DefectLine {
            category: &d.defect_category,
            code: &d.defect_code,
            location: d.defect_location.as_deref(),
            quantity: d.quantity,
        })
        .collect();
    let subject = notification::subject(&notice);
    let html = notification::html_body(&notice, &lines);

    let emails: Vec<String> = recipients.into_iter().map(|r| r.email).collect();
    let results = send_to_all(state.mailer.as_ref(), &emails, &subject, &html).await;
    let status = DeliveryStatus::from_results(results.iter().map(|r| r.sent));

    let failures: Vec<String> = results
        .iter()
        .filter_map(|r| r.error.as_ref().map(|e| format!("{}: {e}", r.email)))
        .collect();

    let log_entry = NewEmailLog {
        audit_id: Some(id),
        recipients: emails.join(", "),
        subject: subject.clone(),
        status: status.as_str().to_string(),
        error_message: (!failures.is_empty()).then(|| failures.join("; ")),
    };
    // Sends are already out; a failed log write does not fail the request.
    if let Err(e) = NotificationRepo::log(&state.pool, &log_entry).await {
        tracing::error!(audit_id = id, error = %e, "Failed to record email log");
    }

    tracing::info!(
        audit_id = id,
        requested_by = %identity.as_str(),
        recipients = emails.len(),
        status = status.as_str(),
        "Failure notification processed",
    );

    let http_status = match status {
        DeliveryStatus::Sent | DeliveryStatus::NoRecipients => StatusCode::OK,
        DeliveryStatus::Partial => StatusCode::MULTI_STATUS,
        DeliveryStatus::Failed => {
            return Err(AppError::Core(CoreError::Upstream(format!(
                "Notification could not be delivered to any recipient ({})",
                failures.join("; ")
            ))));
        }
    };

    Ok((
        http_status,
        Json(NotificationOutcome {
            status: status.as_str(),
            subject,
            results,
        }),
    ))
}
