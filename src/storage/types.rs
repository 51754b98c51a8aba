use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Database-specific errors with user-friendly messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another process has the database locked
    #[error("The database is locked by another process. Please try again.")]
    Locked,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Check if a sqlx error indicates database locking
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        let error_string = err.to_string().to_lowercase();

        // SQLITE_BUSY (5), SQLITE_LOCKED (6), SQLITE_CANTOPEN (14)
        if error_string.contains("database is locked")
            || error_string.contains("database table is locked")
            || error_string.contains("sqlite_busy")
            || error_string.contains("sqlite_locked")
            || error_string.contains("unable to open database file")
        {
            return DatabaseError::Locked;
        }

        DatabaseError::Other(err)
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Account capability level. Admin-only routes check this on the resolved
/// identity; there is no role inheritance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// Case-insensitive parse; unknown names are rejected.
    pub fn parse(name: &str) -> Option<Role> {
        match name.to_uppercase().as_str() {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Subscription tier. Registration starts everyone on `Free`; a tier
/// change renews a 30-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Free,
    Paid,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "FREE",
            Tier::Paid => "PAID",
        }
    }

    /// Case-insensitive parse; unknown names are rejected.
    pub fn parse(name: &str) -> Option<Tier> {
        match name.to_uppercase().as_str() {
            "FREE" => Some(Tier::Free),
            "PAID" => Some(Tier::Paid),
            _ => None,
        }
    }
}

// ============================================================================
// Helper Types
// ============================================================================

/// Internal row type for user queries (used by sqlx FromRow).
/// Converts to `User` via `into_user()`, parsing the stored role name.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserDbRow {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub suspended: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserDbRow {
    pub(crate) fn into_user(self) -> User {
        let role = Role::parse(&self.role).unwrap_or_else(|| {
            tracing::warn!(user_id = self.id, role = %self.role, "Unknown role in database, treating as USER");
            Role::User
        });
        User {
            id: self.id,
            firstname: self.firstname,
            lastname: self.lastname,
            email: self.email,
            password_hash: self.password_hash,
            role,
            suspended: self.suspended,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Internal row type for article queries. The keywords column holds a JSON
/// string array; anything unparseable reads back as an empty list.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ArticleDbRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub slug: String,
    pub source: String,
    pub author: String,
    pub date: i64,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub keywords: Option<String>,
}

impl ArticleDbRow {
    pub(crate) fn into_article(self) -> Article {
        let keywords = self
            .keywords
            .as_deref()
            .map(|raw| serde_json::from_str(raw).unwrap_or_default())
            .unwrap_or_default();
        Article {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            slug: self.slug,
            source: self.source,
            author: self.author,
            date: self.date,
            summary: self.summary,
            link: self.link,
            image_url: self.image_url,
            keywords,
        }
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// User account from the database.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub suspended: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// The one active subscription row per user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserSubscription {
    pub user_id: i64,
    pub tier: String,
    pub start_date: i64,
    pub end_date: i64,
}

impl UserSubscription {
    pub fn tier(&self) -> Option<Tier> {
        Tier::parse(&self.tier)
    }
}

/// Article from the database. Keywords are decoded from the stored JSON
/// string array.
#[derive(Debug, Clone)]
pub struct Article {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub slug: String,
    pub source: String,
    pub author: String,
    pub date: i64,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub keywords: Vec<String>,
}

/// An article ready to persist for a user. The slug is derived from the
/// title at insert time; keywords are recomputed from the fetched payload.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub source: String,
    pub author: String,
    pub date: i64,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub keywords: Vec<String>,
}

/// One page of a user's articles plus the pagination bookkeeping the
/// listing endpoints return.
#[derive(Debug)]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    pub total: i64,
    pub pages: i64,
    pub page: i64,
}

impl ArticlePage {
    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1 && self.pages > 0
    }
}
