//! Defect photo attachments.

use fca_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Photo metadata (no bytes), as listed per defect.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMeta {
    pub id: DbId,
    pub audit_id: DbId,
    pub defect_id: DbId,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub uploaded_at: Timestamp,
}

/// Photo bytes plus what is needed to serve them.
#[derive(Debug, Clone, FromRow)]
pub struct PhotoContent {
    pub file_name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

/// A validated upload ready to be stored.
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub file_name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}
