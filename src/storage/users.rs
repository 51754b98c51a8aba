use anyhow::Result;

use super::schema::Database;
use super::types::{Role, User, UserDbRow};

/// Optional filters for the admin user-search endpoint. Every present
/// field must match exactly; the first matching user wins.
#[derive(Debug, Default)]
pub struct UserFilter {
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

const USER_COLUMNS: &str =
    "id, firstname, lastname, email, password_hash, role, suspended, created_at, updated_at";

impl Database {
    // ========================================================================
    // User Operations
    // ========================================================================

    /// Insert a new user, returning its id. Email uniqueness is enforced by
    /// the schema; callers check for an existing email first to produce a
    /// friendly message.
    pub async fn create_user(
        &self,
        firstname: &str,
        lastname: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            INSERT INTO users (firstname, lastname, email, password_hash, role, suspended, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 0, ?, ?)
        "#,
        )
        .bind(firstname)
        .bind(lastname)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserDbRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserDbRow::into_user))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserDbRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserDbRow::into_user))
    }

    /// All users, oldest first. Admin-only at the HTTP layer.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserDbRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserDbRow::into_user).collect())
    }

    /// First user matching every present filter field exactly.
    pub async fn find_user(&self, filter: &UserFilter) -> Result<Option<User>> {
        let mut builder: sqlx::QueryBuilder<sqlx::Sqlite> =
            sqlx::QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE 1 = 1"));

        if let Some(email) = &filter.email {
            builder.push(" AND email = ").push_bind(email);
        }
        if let Some(firstname) = &filter.firstname {
            builder.push(" AND firstname = ").push_bind(firstname);
        }
        if let Some(lastname) = &filter.lastname {
            builder.push(" AND lastname = ").push_bind(lastname);
        }
        builder.push(" LIMIT 1");

        let row = builder
            .build_query_as::<UserDbRow>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserDbRow::into_user))
    }

    /// Partial profile update; absent fields keep their current value.
    pub async fn update_profile(
        &self,
        user_id: i64,
        firstname: Option<&str>,
        lastname: Option<&str>,
        email: Option<&str>,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            UPDATE users SET
                firstname = COALESCE(?, firstname),
                lastname = COALESCE(?, lastname),
                email = COALESCE(?, email),
                updated_at = ?
            WHERE id = ?
        "#,
        )
        .bind(firstname)
        .bind(lastname)
        .bind(email)
        .bind(now)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Flip the suspension flag. Returns false when no such user exists.
    pub async fn set_suspended(&self, user_id: i64, suspended: bool) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query("UPDATE users SET suspended = ?, updated_at = ? WHERE id = ?")
            .bind(suspended)
            .bind(now)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_password_hash(&self, user_id: i64, password_hash: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(now)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
