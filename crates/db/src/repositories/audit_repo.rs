//! Repository for the `audits` table and its owned `defects` /
//! `defect_photos` rows.
//!
//! Every write runs in one transaction: an audit is never visible without
//! its defects, and a failed update leaves the previous state intact.

use fca_core::audit::{DefectInput, ValidatedAudit};
use fca_core::pagination::PageRequest;
use fca_core::types::DbId;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryScalar;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::models::audit::{
    into_documents, Audit, AuditDefectRow, AuditDocument, AuditFilter, AuditPage, DeletedAudit,
    SavedAudit,
};
use crate::models::defect::Defect;
use crate::repositories::UserRepo;
use crate::transaction::finish;

/// Column list for the `audits` table.
const COLUMNS: &str = "id, plant, module, shift, purchase_order, size, customer, style, \
    color_code, color_description, customer_po_number, inspected_quantity, defect_quantity, \
    status, defect_rate, remarks, audit_type, created_by, submission_date";

/// Audit columns plus one defect's columns, for `audits a LEFT JOIN defects d`.
const JOINED_COLUMNS: &str = "a.id, a.plant, a.module, a.shift, a.purchase_order, a.size, \
    a.customer, a.style, a.color_code, a.color_description, a.customer_po_number, \
    a.inspected_quantity, a.defect_quantity, a.status, a.defect_rate, a.remarks, \
    a.audit_type, a.created_by, a.submission_date, \
    d.id AS defect_id, d.defect_category, d.defect_code, d.quantity AS defect_quantity_value, \
    d.location_category, d.defect_location";

/// Column list for the `defects` table.
pub(crate) const DEFECT_COLUMNS: &str =
    "id, audit_id, defect_category, defect_code, quantity, location_category, defect_location";

/// List filters; binds `$1..$8`. A null parameter matches every row.
const FILTER: &str = "($1::text IS NULL OR a.plant = $1) \
    AND ($2::text IS NULL OR a.module = $2) \
    AND ($3::text IS NULL OR a.shift = $3) \
    AND ($4::text IS NULL OR a.purchase_order LIKE $4) \
    AND ($5::text IS NULL OR a.size = $5) \
    AND ($6::text IS NULL OR a.status = $6) \
    AND ($7::text IS NULL OR a.audit_type = $7) \
    AND ($8::date IS NULL OR (a.submission_date AT TIME ZONE 'UTC')::date = $8)";

/// Provides the audit submission, revision, deletion and listing paths.
pub struct AuditRepo;

impl AuditRepo {
    /// Insert an audit and all of its defects atomically.
    ///
    /// Also records the submitting user. Returns the new audit id and the
    /// stored defects (with their ids) so photos can be attached.
    pub async fn create(pool: &PgPool, input: &ValidatedAudit) -> Result<SavedAudit, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = Self::create_in_tx(&mut tx, input).await;
        finish(tx, result).await
    }

    /// Replace every field and the whole defect set of an audit.
    ///
    /// Existing defects (and their photos) are deleted and the new set is
    /// inserted; nothing is merged. Returns `None` if the audit does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &ValidatedAudit,
    ) -> Result<Option<SavedAudit>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = Self::update_in_tx(&mut tx, id, input).await;
        finish(tx, result).await
    }

    /// Delete an audit, its defects and their photos, bottom-up.
    ///
    /// Returns `None` if the audit does not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<DeletedAudit>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = Self::delete_in_tx(&mut tx, id).await;
        finish(tx, result).await
    }

    /// Find an audit row by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Audit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM audits WHERE id = $1");
        sqlx::query_as::<_, Audit>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an audit with its defects nested.
    pub async fn find_document(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AuditDocument>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM audits a \
             LEFT JOIN defects d ON d.audit_id = a.id \
             WHERE a.id = $1 \
             ORDER BY d.id"
        );
        let rows = sqlx::query_as::<_, AuditDefectRow>(&query)
            .bind(id)
            .fetch_all(pool)
            .await?;
        Ok(into_documents(rows, &[id]).into_iter().next())
    }

    /// List audits matching `filter`, newest first, one page at a time.
    ///
    /// `total` counts every match before pagination. The count, the page of
    /// ids and the joined defect rows are read from one snapshot.
    pub async fn list(
        pool: &PgPool,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> Result<AuditPage, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = Self::list_in_tx(&mut tx, filter, page).await;
        finish(tx, result).await
    }

    // -----------------------------------------------------------------------
    // Transaction bodies
    // -----------------------------------------------------------------------

    async fn create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        input: &ValidatedAudit,
    ) -> Result<SavedAudit, sqlx::Error> {
        UserRepo::touch(&mut **tx, &input.created_by).await?;

        let audit_id: DbId = sqlx::query_scalar(
            "INSERT INTO audits \
                (plant, module, shift, purchase_order, size, customer, style, \
                 color_code, color_description, customer_po_number, inspected_quantity, \
                 defect_quantity, status, defect_rate, remarks, audit_type, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING id",
        )
        .bind(&input.plant)
        .bind(&input.module)
        .bind(&input.shift)
        .bind(&input.purchase_order)
        .bind(&input.size)
        .bind(&input.customer)
        .bind(&input.style)
        .bind(&input.color_code)
        .bind(&input.color_description)
        .bind(&input.customer_po_number)
        .bind(input.inspected_quantity)
        .bind(input.defect_quantity)
        .bind(input.status.as_str())
        .bind(input.defect_rate)
        .bind(&input.remarks)
        .bind(&input.audit_type)
        .bind(&input.created_by)
        .fetch_one(&mut **tx)
        .await?;

        let defects = Self::insert_defects(tx, audit_id, &input.defects).await?;
        Ok(SavedAudit { audit_id, defects })
    }

    async fn update_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        input: &ValidatedAudit,
    ) -> Result<Option<SavedAudit>, sqlx::Error> {
        if !Self::lock_for_write(tx, id).await? {
            return Ok(None);
        }

        UserRepo::touch(&mut **tx, &input.created_by).await?;

        sqlx::query(
            "UPDATE audits SET \
                plant = $2, module = $3, shift = $4, purchase_order = $5, size = $6, \
                customer = $7, style = $8, color_code = $9, color_description = $10, \
                customer_po_number = $11, inspected_quantity = $12, defect_quantity = $13, \
                status = $14, defect_rate = $15, remarks = $16, audit_type = $17, \
                created_by = $18 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.plant)
        .bind(&input.module)
        .bind(&input.shift)
        .bind(&input.purchase_order)
        .bind(&input.size)
        .bind(&input.customer)
        .bind(&input.style)
        .bind(&input.color_code)
        .bind(&input.color_description)
        .bind(&input.customer_po_number)
        .bind(input.inspected_quantity)
        .bind(input.defect_quantity)
        .bind(input.status.as_str())
        .bind(input.defect_rate)
        .bind(&input.remarks)
        .bind(&input.audit_type)
        .bind(&input.created_by)
        .execute(&mut **tx)
        .await?;

        Self::delete_children(tx, id).await?;
        let defects = Self::insert_defects(tx, id, &input.defects).await?;

        Ok(Some(SavedAudit {
            audit_id: id,
            defects,
        }))
    }

    async fn delete_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<DeletedAudit>, sqlx::Error> {
        if !Self::lock_for_write(tx, id).await? {
            return Ok(None);
        }

        let deleted = Self::delete_children(tx, id).await?;
        sqlx::query("DELETE FROM audits WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(Some(deleted))
    }

    async fn list_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> Result<AuditPage, sqlx::Error> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut **tx)
            .await?;

        let po_pattern = filter.purchase_order.as_deref().map(like_contains);

        let count_query = format!("SELECT COUNT(*) FROM audits a WHERE {FILTER}");
        let total: i64 = bind_filters(sqlx::query_scalar(&count_query), filter, &po_pattern)
            .fetch_one(&mut **tx)
            .await?;

        let ids_query = format!(
            "SELECT a.id FROM audits a WHERE {FILTER} \
             ORDER BY a.id DESC \
             LIMIT $9 OFFSET $10"
        );
        let page_ids: Vec<DbId> = bind_filters(sqlx::query_scalar(&ids_query), filter, &po_pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut **tx)
            .await?;

        if page_ids.is_empty() {
            return Ok(AuditPage {
                total,
                data: Vec::new(),
            });
        }

        let rows_query = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM audits a \
             LEFT JOIN defects d ON d.audit_id = a.id \
             WHERE a.id = ANY($1) \
             ORDER BY a.id DESC, d.id"
        );
        let rows = sqlx::query_as::<_, AuditDefectRow>(&rows_query)
            .bind(page_ids.as_slice())
            .fetch_all(&mut **tx)
            .await?;

        Ok(AuditPage {
            total,
            data: into_documents(rows, &page_ids),
        })
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Take a row lock on the audit so concurrent revisions of the same id
    /// serialize. Returns `false` if the audit does not exist.
    async fn lock_for_write(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM audits WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;
        Ok(locked.is_some())
    }

    /// Delete an audit's photos, then its defects.
    async fn delete_children(
        tx: &mut Transaction<'_, Postgres>,
        audit_id: DbId,
    ) -> Result<DeletedAudit, sqlx::Error> {
        let photos = sqlx::query(
            "DELETE FROM defect_photos \
             WHERE audit_id = $1 \
                OR defect_id IN (SELECT id FROM defects WHERE audit_id = $1)",
        )
        .bind(audit_id)
        .execute(&mut **tx)
        .await?;

        let defects = sqlx::query("DELETE FROM defects WHERE audit_id = $1")
            .bind(audit_id)
            .execute(&mut **tx)
            .await?;

        Ok(DeletedAudit {
            photos: photos.rows_affected(),
            defects: defects.rows_affected(),
        })
    }

    /// Insert all defects for an audit in one multi-row statement.
    async fn insert_defects(
        tx: &mut Transaction<'_, Postgres>,
        audit_id: DbId,
        defects: &[DefectInput],
    ) -> Result<Vec<Defect>, sqlx::Error> {
        if defects.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "INSERT INTO defects \
                (audit_id, defect_category, defect_code, quantity, location_category, defect_location) ",
        );
        builder.push_values(defects, |mut row, d| {
            row.push_bind(audit_id)
                .push_bind(d.defect_category.as_str())
                .push_bind(d.defect_code.as_str())
                .push_bind(d.quantity)
                .push_bind(d.location_category.as_deref())
                .push_bind(d.defect_location.as_deref());
        });
        builder.push(format!(" RETURNING {DEFECT_COLUMNS}"));

        let mut rows = builder
            .build_query_as::<Defect>()
            .fetch_all(&mut **tx)
            .await?;
        rows.sort_by_key(|d| d.id);
        Ok(rows)
    }
}

/// Bind the eight list filters, in `FILTER` order.
fn bind_filters<'q>(
    query: QueryScalar<'q, Postgres, i64, PgArguments>,
    filter: &'q AuditFilter,
    po_pattern: &'q Option<String>,
) -> QueryScalar<'q, Postgres, i64, PgArguments> {
    query
        .bind(filter.plant.as_deref())
        .bind(filter.module.as_deref())
        .bind(filter.shift.as_deref())
        .bind(po_pattern.as_deref())
        .bind(filter.size.as_deref())
        .bind(filter.status.as_deref())
        .bind(filter.audit_type.as_deref())
        .bind(filter.date)
}

/// `LIKE` pattern matching `needle` anywhere, with wildcards in the needle
/// escaped so they match literally.
fn like_contains(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_contains("PO-1"), "%PO-1%");
        assert_eq!(like_contains("50%_x"), "%50\\%\\_x%");
    }
}
