//! Repository for the `defect_photos` table.

use fca_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::photo::{NewPhoto, PhotoContent, PhotoMeta};
use crate::transaction::finish;

/// Metadata columns; `content` is only read by [`PhotoRepo::find_content`].
const META_COLUMNS: &str = "id, audit_id, defect_id, file_name, mime_type, size_bytes, uploaded_at";

/// Stores and serves photos attached to defects.
pub struct PhotoRepo;

impl PhotoRepo {
    /// Attach a photo to a defect of the given audit.
    ///
    /// Returns `None` (and stores nothing) when the defect does not exist or
    /// belongs to a different audit.
    pub async fn attach(
        pool: &PgPool,
        audit_id: DbId,
        defect_id: DbId,
        photo: &NewPhoto,
    ) -> Result<Option<PhotoMeta>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = Self::attach_in_tx(&mut tx, audit_id, defect_id, photo).await;
        finish(tx, result).await
    }

    /// Photo bytes with their file name and MIME type.
    pub async fn find_content(pool: &PgPool, id: DbId) -> Result<Option<PhotoContent>, sqlx::Error> {
        sqlx::query_as::<_, PhotoContent>(
            "SELECT file_name, mime_type, content FROM defect_photos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Photo metadata for one defect, newest first. Unknown defects yield an
    /// empty list.
    pub async fn list_by_defect(
        pool: &PgPool,
        defect_id: DbId,
    ) -> Result<Vec<PhotoMeta>, sqlx::Error> {
        let query = format!(
            "SELECT {META_COLUMNS} FROM defect_photos \
             WHERE defect_id = $1 \
             ORDER BY uploaded_at DESC, id DESC"
        );
        sqlx::query_as::<_, PhotoMeta>(&query)
            .bind(defect_id)
            .fetch_all(pool)
            .await
    }

    /// Photo metadata for every defect of an audit.
    pub async fn list_by_audit(
        pool: &PgPool,
        audit_id: DbId,
    ) -> Result<Vec<PhotoMeta>, sqlx::Error> {
        let query = format!(
            "SELECT {META_COLUMNS} FROM defect_photos \
             WHERE audit_id = $1 \
             ORDER BY defect_id, uploaded_at DESC, id DESC"
        );
        sqlx::query_as::<_, PhotoMeta>(&query)
            .bind(audit_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a photo. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM defect_photos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn attach_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        audit_id: DbId,
        defect_id: DbId,
        photo: &NewPhoto,
    ) -> Result<Option<PhotoMeta>, sqlx::Error> {
        // Audit row first, then defect: the same order update and delete lock
        // in, so an attach queues behind a revision instead of deadlocking.
        let audit: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM audits WHERE id = $1 FOR SHARE")
                .bind(audit_id)
                .fetch_optional(&mut **tx)
                .await?;
        if audit.is_none() {
            return Ok(None);
        }

        let owner: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM defects WHERE id = $1 AND audit_id = $2 FOR SHARE",
        )
        .bind(defect_id)
        .bind(audit_id)
        .fetch_optional(&mut **tx)
        .await?;
        if owner.is_none() {
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO defect_photos (audit_id, defect_id, file_name, mime_type, content, size_bytes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {META_COLUMNS}"
        );
        let meta = sqlx::query_as::<_, PhotoMeta>(&query)
            .bind(audit_id)
            .bind(defect_id)
            .bind(&photo.file_name)
            .bind(&photo.mime_type)
            .bind(photo.content.as_slice())
            .bind(photo.content.len() as i64)
            .fetch_one(&mut **tx)
            .await?;

        Ok(Some(meta))
    }
}
