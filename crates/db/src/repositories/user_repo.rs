//! Repository for the `users` table.

use sqlx::PgConnection;

/// Records the e-mail identities that submit audits.
pub struct UserRepo;

impl UserRepo {
    /// Insert the user if unseen, otherwise bump `last_seen_at`.
    ///
    /// Takes a connection so it can join the caller's transaction.
    pub async fn touch(conn: &mut PgConnection, email: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO users (email) VALUES ($1) \
             ON CONFLICT (email) DO UPDATE SET last_seen_at = NOW()",
        )
        .bind(email)
        .execute(conn)
        .await?;
        Ok(())
    }
}
