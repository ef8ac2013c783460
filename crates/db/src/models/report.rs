//! Failure report: an audit with its defects, their photos, and a summary.

use std::collections::HashMap;

use fca_core::report::{summarize, DefectTally, ReportSummary};
use fca_core::types::DbId;
use serde::Serialize;

use super::audit::Audit;
use super::defect::Defect;
use super::photo::PhotoMeta;

/// A defect with the metadata of every photo attached to it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDefect {
    #[serde(flatten)]
    pub defect: Defect,
    pub photos: Vec<PhotoMeta>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    #[serde(flatten)]
    pub audit: Audit,
    pub defect_entries: Vec<ReportDefect>,
    pub summary: ReportSummary,
}

impl FailureReport {
    /// Attach each photo to its defect and compute the summary.
    ///
    /// Defects keep the given order; photos keep the given order within
    /// their defect. Photos whose defect is not in `defects` are dropped.
    pub fn assemble(audit: Audit, defects: Vec<Defect>, photos: Vec<PhotoMeta>) -> Self {
        let mut by_defect: HashMap<DbId, Vec<PhotoMeta>> = HashMap::new();
        for photo in photos {
            by_defect.entry(photo.defect_id).or_default().push(photo);
        }

        let defect_entries: Vec<ReportDefect> = defects
            .into_iter()
            .map(|defect| {
                let photos = by_defect.remove(&defect.id).unwrap_or_default();
                ReportDefect { defect, photos }
            })
            .collect();

        let summary = summarize(
            defect_entries.iter().map(|e| DefectTally {
                category: &e.defect.defect_category,
                quantity: e.defect.quantity,
                photo_count: e.photos.len(),
            }),
            audit.submission_date,
        );

        Self {
            audit,
            defect_entries,
            summary,
        }
    }
}
