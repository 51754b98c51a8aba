use anyhow::Result;

use super::schema::Database;

impl Database {
    // ========================================================================
    // Auth Token Operations
    // ========================================================================

    /// Record a freshly issued token fingerprint. Expired rows for any user
    /// are pruned opportunistically on the same connection.
    pub async fn insert_token(
        &self,
        user_id: i64,
        fingerprint: &str,
        expires_at: i64,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query("DELETE FROM auth_tokens WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "INSERT INTO auth_tokens (fingerprint, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(fingerprint)
        .bind(user_id)
        .bind(expires_at)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Resolve a token fingerprint to its user id, honoring expiry.
    pub async fn resolve_token(&self, fingerprint: &str) -> Result<Option<i64>> {
        let now = chrono::Utc::now().timestamp();
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT user_id FROM auth_tokens WHERE fingerprint = ? AND expires_at > ?")
                .bind(fingerprint)
                .bind(now)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(user_id,)| user_id))
    }

    /// Revoke a token (logout). Returns whether a live row was removed.
    pub async fn revoke_token(&self, fingerprint: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE fingerprint = ?")
            .bind(fingerprint)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
