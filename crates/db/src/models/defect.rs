//! Defect line items.

use fca_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `defects` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Defect {
    pub id: DbId,
    pub audit_id: DbId,
    pub defect_category: String,
    pub defect_code: String,
    pub quantity: i32,
    pub location_category: Option<String>,
    pub defect_location: Option<String>,
}

/// A defect as nested inside an audit document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectSummary {
    pub defect_id: DbId,
    pub defect_category: String,
    pub defect_code: String,
    pub quantity: i32,
    pub location_category: Option<String>,
    pub defect_location: Option<String>,
}
