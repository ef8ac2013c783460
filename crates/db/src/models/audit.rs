//! Audit records, list filters and the nested audit document.

use chrono::NaiveDate;
use fca_core::regroup::{regroup, Group};
use fca_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::defect::{Defect, DefectSummary};

/// A row from the `audits` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub id: DbId,
    pub plant: String,
    pub module: String,
    pub shift: String,
    pub purchase_order: String,
    pub size: Option<String>,
    pub customer: Option<String>,
    pub style: Option<String>,
    pub color_code: Option<String>,
    pub color_description: Option<String>,
    pub customer_po_number: Option<String>,
    pub inspected_quantity: i32,
    pub defect_quantity: i32,
    pub status: String,
    pub defect_rate: f64,
    pub remarks: Option<String>,
    #[serde(rename = "type")]
    pub audit_type: Option<String>,
    pub created_by: String,
    pub submission_date: Timestamp,
}

/// One row of `audits LEFT JOIN defects`: the audit's columns plus the
/// (possibly null) columns of one defect.
#[derive(Debug, Clone, FromRow)]
pub struct AuditDefectRow {
    #[sqlx(flatten)]
    pub audit: Audit,
    pub defect_id: Option<DbId>,
    pub defect_category: Option<String>,
    pub defect_code: Option<String>,
    pub defect_quantity_value: Option<i32>,
    pub location_category: Option<String>,
    pub defect_location: Option<String>,
}

impl AuditDefectRow {
    fn into_parts(self) -> (DbId, Audit, Option<DefectSummary>) {
        let defect = match (self.defect_id, self.defect_category, self.defect_code) {
            (Some(defect_id), Some(defect_category), Some(defect_code)) => Some(DefectSummary {
                defect_id,
                defect_category,
                defect_code,
                quantity: self.defect_quantity_value.unwrap_or_default(),
                location_category: self.location_category,
                defect_location: self.defect_location,
            }),
            _ => None,
        };
        (self.audit.id, self.audit, defect)
    }
}

/// An audit with its defects nested, as returned by list and get.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditDocument {
    #[serde(flatten)]
    pub audit: Audit,
    pub defects: Vec<DefectSummary>,
}

impl From<Group<Audit, DefectSummary>> for AuditDocument {
    fn from(g: Group<Audit, DefectSummary>) -> Self {
        Self {
            audit: g.parent,
            defects: g.children,
        }
    }
}

/// Fold joined audit/defect rows into documents, emitted in `order`.
pub fn into_documents(rows: Vec<AuditDefectRow>, order: &[DbId]) -> Vec<AuditDocument> {
    regroup(rows, order, AuditDefectRow::into_parts)
        .into_iter()
        .map(AuditDocument::from)
        .collect()
}

/// Result of a create or full-replace update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAudit {
    pub audit_id: DbId,
    pub defects: Vec<Defect>,
}

/// Rows removed by a cascading audit delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletedAudit {
    pub photos: u64,
    pub defects: u64,
}

/// Query parameters for `GET /audits`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditListParams {
    pub plant: Option<String>,
    pub module: Option<String>,
    pub shift: Option<String>,
    pub po: Option<String>,
    pub size: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub audit_type: Option<String>,
    pub date: Option<NaiveDate>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Normalized list filters. `None` matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditFilter {
    pub plant: Option<String>,
    pub module: Option<String>,
    pub shift: Option<String>,
    /// Substring match on the purchase order.
    pub purchase_order: Option<String>,
    pub size: Option<String>,
    pub status: Option<String>,
    pub audit_type: Option<String>,
    /// Calendar date (UTC) of submission.
    pub date: Option<NaiveDate>,
}

impl AuditFilter {
    /// Build filters from query parameters; blank strings count as absent.
    pub fn from_params(params: &AuditListParams) -> Self {
        fn present(v: &Option<String>) -> Option<String> {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }
        Self {
            plant: present(&params.plant),
            module: present(&params.module),
            shift: present(&params.shift),
            purchase_order: present(&params.po),
            size: present(&params.size),
            status: present(&params.status),
            audit_type: present(&params.audit_type),
            date: params.date,
        }
    }
}

/// A page of audit documents plus the unpaginated match count.
#[derive(Debug, Clone, Serialize)]
pub struct AuditPage {
    pub total: i64,
    pub data: Vec<AuditDocument>,
}
