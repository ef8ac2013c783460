//! Purchase-order and defect-code reference data.

use serde::Serialize;
use sqlx::FromRow;

/// A colour offered for a purchase order.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorOption {
    pub color_code: String,
    pub color_description: Option<String>,
}

/// A style offered for a purchase order, with its customer.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleOption {
    pub style: String,
    pub customer: Option<String>,
}
