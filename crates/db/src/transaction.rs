//! Transaction completion helper.
//!
//! Repository write paths run their statements against a
//! `sqlx::Transaction` and hand the outcome to [`finish`], which commits on
//! success and rolls back on failure. A failed rollback is logged but the
//! original error is what the caller sees.

use sqlx::{Postgres, Transaction};

/// Commit `tx` if `result` is `Ok`, otherwise roll it back and return the
/// original error.
pub async fn finish<T>(
    tx: Transaction<'_, Postgres>,
    result: Result<T, sqlx::Error>,
) -> Result<T, sqlx::Error> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(
                    error = %rollback_err,
                    original = %err,
                    "Rollback failed after transaction error",
                );
            }
            Err(err)
        }
    }
}
