//! Failure report summary statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::Timestamp;

/// The per-defect figures a report summary is computed from.
#[derive(Debug, Clone, Copy)]
pub struct DefectTally<'a> {
    pub category: &'a str,
    pub quantity: i32,
    pub photo_count: usize,
}

/// Roll-up shown at the top of a failure report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    /// Sum of defect entry quantities (not the audit's `defectQuantity`).
    pub total_defects: i64,
    /// Category -> summed quantity.
    pub category_summary: BTreeMap<String, i64>,
    pub total_photos: usize,
    /// Submission time formatted as `YYYY-MM-DD HH:MM:SS`.
    pub inspection_date: String,
}

pub fn summarize<'a>(
    tallies: impl IntoIterator<Item = DefectTally<'a>>,
    submitted_at: Timestamp,
) -> ReportSummary {
    let mut total_defects = 0_i64;
    let mut total_photos = 0_usize;
    let mut category_summary = BTreeMap::new();

    for t in tallies {
        total_defects += i64::from(t.quantity);
        total_photos += t.photo_count;
        *category_summary.entry(t.category.to_string()).or_insert(0) += i64::from(t.quantity);
    }

    ReportSummary {
        total_defects,
        category_summary,
        total_photos,
        inspection_date: submitted_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}
