//! Repository for `plant_email_recipients` and `email_log`.

use sqlx::PgPool;

use crate::models::notification::{NewEmailLog, Recipient};

/// Recipient lookup and send logging for failure notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Active recipients configured for a plant, `to` before `cc`.
    pub async fn recipients(pool: &PgPool, plant: &str) -> Result<Vec<Recipient>, sqlx::Error> {
        sqlx::query_as::<_, Recipient>(
            "SELECT email_type, email FROM plant_email_recipients \
             WHERE plant = $1 AND is_active \
             ORDER BY email_type DESC, email",
        )
        .bind(plant)
        .fetch_all(pool)
        .await
    }

    /// Append one row to the send log.
    pub async fn log(pool: &PgPool, entry: &NewEmailLog) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO email_log (audit_id, recipients, subject, status, error_message) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(entry.audit_id)
        .bind(&entry.recipients)
        .bind(&entry.subject)
        .bind(&entry.status)
        .bind(&entry.error_message)
        .execute(pool)
        .await?;
        Ok(())
    }
}
