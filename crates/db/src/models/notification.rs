//! Notification recipients and the send log.

use fca_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// An active recipient of a plant's failure notifications.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email_type: String,
    pub email: String,
}

/// One `email_log` row to record.
#[derive(Debug, Clone)]
pub struct NewEmailLog {
    pub audit_id: Option<DbId>,
    pub recipients: String,
    pub subject: String,
    pub status: String,
    pub error_message: Option<String>,
}
