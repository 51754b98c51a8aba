use anyhow::Result;
use sqlx::SqliteConnection;

use super::schema::Database;

/// The three preference tables share one shape: (user_id, name) rows
/// replaced wholesale on update.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PreferenceKind {
    Topic,
    Source,
    Keyword,
}

impl PreferenceKind {
    fn table(self) -> &'static str {
        match self {
            PreferenceKind::Topic => "topics",
            PreferenceKind::Source => "sources",
            PreferenceKind::Keyword => "keywords",
        }
    }
}

impl Database {
    // ========================================================================
    // Preference Reads
    // ========================================================================

    pub async fn get_topics(&self, user_id: i64) -> Result<Vec<String>> {
        self.get_preference_names(PreferenceKind::Topic, user_id).await
    }

    pub async fn get_sources(&self, user_id: i64) -> Result<Vec<String>> {
        self.get_preference_names(PreferenceKind::Source, user_id).await
    }

    pub async fn get_keywords(&self, user_id: i64) -> Result<Vec<String>> {
        self.get_preference_names(PreferenceKind::Keyword, user_id).await
    }

    async fn get_preference_names(
        &self,
        kind: PreferenceKind,
        user_id: i64,
    ) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(&format!(
            "SELECT name FROM {} WHERE user_id = ? ORDER BY id",
            kind.table()
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}

// ============================================================================
// Transaction-scoped set replacement (settings reconciler)
// ============================================================================

/// Delete every row of `kind` for the user and insert the incoming names.
/// No diffing: replace-on-update is the whole contract.
pub(crate) async fn replace_names_tx(
    conn: &mut SqliteConnection,
    kind: PreferenceKind,
    user_id: i64,
    names: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query(&format!("DELETE FROM {} WHERE user_id = ?", kind.table()))
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    for name in names {
        sqlx::query(&format!(
            "INSERT INTO {} (user_id, name) VALUES (?, ?)",
            kind.table()
        ))
        .bind(user_id)
        .bind(name)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, Role};

    async fn test_db_with_user() -> (Database, i64) {
        let db = Database::open(":memory:").await.unwrap();
        let user_id = db
            .create_user("Ada", "Lovelace", "ada@example.com", "hash", Role::User)
            .await
            .unwrap();
        (db, user_id)
    }

    async fn replace(db: &Database, kind: PreferenceKind, user_id: i64, names: &[&str]) {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        let mut tx = db.begin().await.unwrap();
        replace_names_tx(&mut tx, kind, user_id, &names).await.unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_replace_and_read_back() {
        let (db, user_id) = test_db_with_user().await;

        replace(&db, PreferenceKind::Topic, user_id, &["tech", "science"]).await;

        let topics = db.get_topics(user_id).await.unwrap();
        assert_eq!(topics, vec!["tech".to_string(), "science".to_string()]);
    }

    #[tokio::test]
    async fn test_replace_overwrites_previous_set() {
        let (db, user_id) = test_db_with_user().await;

        replace(&db, PreferenceKind::Keyword, user_id, &["ai", "rust"]).await;
        replace(&db, PreferenceKind::Keyword, user_id, &["climate"]).await;

        let keywords = db.get_keywords(user_id).await.unwrap();
        assert_eq!(keywords, vec!["climate".to_string()]);
    }

    #[tokio::test]
    async fn test_tables_are_independent() {
        let (db, user_id) = test_db_with_user().await;

        replace(&db, PreferenceKind::Topic, user_id, &["tech"]).await;
        replace(&db, PreferenceKind::Source, user_id, &["nytimes.com"]).await;

        assert_eq!(db.get_topics(user_id).await.unwrap(), vec!["tech"]);
        assert_eq!(db.get_sources(user_id).await.unwrap(), vec!["nytimes.com"]);
        assert!(db.get_keywords(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_names_allowed_within_one_replace() {
        let (db, user_id) = test_db_with_user().await;

        replace(&db, PreferenceKind::Source, user_id, &["a.com", "a.com"]).await;

        assert_eq!(db.get_sources(user_id).await.unwrap().len(), 2);
    }
}
