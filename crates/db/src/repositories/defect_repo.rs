//! Repository for the `defects` table.

use fca_core::types::DbId;
use sqlx::PgPool;

use crate::models::defect::Defect;
use crate::repositories::audit_repo::DEFECT_COLUMNS;

/// Read access to defect line items. Writes go through
/// [`AuditRepo`](crate::repositories::AuditRepo) with their audit.
pub struct DefectRepo;

impl DefectRepo {
    /// List an audit's defects in insertion order.
    pub async fn list_by_audit(pool: &PgPool, audit_id: DbId) -> Result<Vec<Defect>, sqlx::Error> {
        let query = format!("SELECT {DEFECT_COLUMNS} FROM defects WHERE audit_id = $1 ORDER BY id");
        sqlx::query_as::<_, Defect>(&query)
            .bind(audit_id)
            .fetch_all(pool)
            .await
    }

    /// Find a defect by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Defect>, sqlx::Error> {
        let query = format!("SELECT {DEFECT_COLUMNS} FROM defects WHERE id = $1");
        sqlx::query_as::<_, Defect>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
