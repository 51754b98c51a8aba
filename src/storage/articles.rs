use anyhow::Result;
use sqlx::SqliteConnection;

use super::schema::Database;
use super::types::{Article, ArticleDbRow, ArticlePage, NewArticle};
use crate::util::slugify;

/// Maximum page size accepted from the listing endpoints.
const MAX_PAGE_LIMIT: i64 = 200;

const ARTICLE_COLUMNS: &str =
    "id, user_id, title, slug, source, author, date, summary, link, image_url, keywords";

impl Database {
    // ========================================================================
    // Article Queries
    // ========================================================================

    /// Fetch one article, scoped to its owner.
    pub async fn get_article(&self, user_id: i64, article_id: i64) -> Result<Option<Article>> {
        let row = sqlx::query_as::<_, ArticleDbRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ? AND user_id = ?"
        ))
        .bind(article_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ArticleDbRow::into_article))
    }

    /// One page of a user's articles, newest first. `page` is 1-based.
    pub async fn list_articles(&self, user_id: i64, page: i64, limit: i64) -> Result<ArticlePage> {
        self.page_articles(user_id, None, page, limit).await
    }

    /// Like `list_articles`, filtered to articles whose serialized keyword
    /// list contains `keyword` as a substring.
    pub async fn list_articles_by_keyword(
        &self,
        user_id: i64,
        keyword: &str,
        page: i64,
        limit: i64,
    ) -> Result<ArticlePage> {
        self.page_articles(user_id, Some(keyword), page, limit).await
    }

    async fn page_articles(
        &self,
        user_id: i64,
        keyword: Option<&str>,
        page: i64,
        limit: i64,
    ) -> Result<ArticlePage> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        let pattern = keyword.map(|k| format!("%{}%", k));

        let total: (i64,) = match &pattern {
            Some(p) => {
                sqlx::query_as(
                    "SELECT COUNT(*) FROM articles WHERE user_id = ? AND keywords LIKE ?",
                )
                .bind(user_id)
                .bind(p)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM articles WHERE user_id = ?")
                    .bind(user_id)
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        let offset = (page - 1) * limit;
        let rows = match &pattern {
            Some(p) => {
                sqlx::query_as::<_, ArticleDbRow>(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles \
                     WHERE user_id = ? AND keywords LIKE ? \
                     ORDER BY date DESC, id DESC LIMIT ? OFFSET ?"
                ))
                .bind(user_id)
                .bind(p)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ArticleDbRow>(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles \
                     WHERE user_id = ? ORDER BY date DESC, id DESC LIMIT ? OFFSET ?"
                ))
                .bind(user_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let pages = if total.0 == 0 {
            0
        } else {
            (total.0 + limit - 1) / limit
        };

        Ok(ArticlePage {
            articles: rows.into_iter().map(ArticleDbRow::into_article).collect(),
            total: total.0,
            pages,
            page,
        })
    }

    /// Every article across all users. Admin-only at the HTTP layer.
    pub async fn list_all_articles(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, ArticleDbRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ArticleDbRow::into_article).collect())
    }
}

// ============================================================================
// Transaction-scoped writes (settings reconciler)
// ============================================================================

pub(crate) async fn delete_articles_for_user_tx(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM articles WHERE user_id = ?")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Insert fetched articles for a user. The slug is derived from the title
/// here so every persisted row obeys the lowercase/dash invariant; the
/// keyword list is serialized as a JSON string array.
pub(crate) async fn insert_articles_tx(
    conn: &mut SqliteConnection,
    user_id: i64,
    articles: &[NewArticle],
) -> Result<(), sqlx::Error> {
    for article in articles {
        let slug = slugify(&article.title);
        let keywords =
            serde_json::to_string(&article.keywords).unwrap_or_else(|_| "[]".to_string());
        sqlx::query(
            r#"
            INSERT INTO articles (user_id, title, slug, source, author, date, summary, link, image_url, keywords)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        )
        .bind(user_id)
        .bind(&article.title)
        .bind(&slug)
        .bind(&article.source)
        .bind(&article.author)
        .bind(article.date)
        .bind(&article.summary)
        .bind(&article.link)
        .bind(&article.image_url)
        .bind(&keywords)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
