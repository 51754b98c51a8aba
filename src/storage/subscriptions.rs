use anyhow::Result;
use sqlx::SqliteConnection;

use super::schema::Database;
use super::types::{Tier, UserSubscription};

const SUBSCRIPTION_COLUMNS: &str = "user_id, tier, start_date, end_date";

impl Database {
    // ========================================================================
    // Subscription Operations
    // ========================================================================

    /// Create the initial subscription row at registration.
    pub async fn create_subscription(
        &self,
        user_id: i64,
        tier: Tier,
        start_date: i64,
        end_date: i64,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_subscriptions (user_id, tier, start_date, end_date) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(tier.as_str())
        .bind(start_date)
        .bind(end_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_subscription(&self, user_id: i64) -> Result<Option<UserSubscription>> {
        let row = sqlx::query_as::<_, UserSubscription>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM user_subscriptions WHERE user_id = ?"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

// ============================================================================
// Transaction-scoped helpers (settings reconciler)
// ============================================================================

pub(crate) async fn get_subscription_tx(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<UserSubscription>, sqlx::Error> {
    sqlx::query_as::<_, UserSubscription>(&format!(
        "SELECT {SUBSCRIPTION_COLUMNS} FROM user_subscriptions WHERE user_id = ?"
    ))
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

/// Replace the user's subscription row with a new tier and window.
pub(crate) async fn update_subscription_tx(
    conn: &mut SqliteConnection,
    user_id: i64,
    tier: Tier,
    start_date: i64,
    end_date: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE user_subscriptions SET tier = ?, start_date = ?, end_date = ? WHERE user_id = ?",
    )
    .bind(tier.as_str())
    .bind(start_date)
    .bind(end_date)
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}
