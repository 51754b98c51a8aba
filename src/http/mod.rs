//! HTTP surface: axum router, shared state, response envelope, views.

mod article;
mod auth;
mod error;
mod extract;
mod user;

use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::news::NewsClient;
use crate::storage::{Article, Database, User, UserSubscription};
use crate::summarizer::Summarizer;

pub use error::ApiError;

// ============================================================================
// Application State
// ============================================================================

pub struct AppState {
    pub db: Database,
    pub news: NewsClient,
    /// Absent when no LLM API key is configured; the summarize endpoint
    /// then reports the upstream as unavailable.
    pub summarizer: Option<Summarizer>,
    pub token_ttl_hours: i64,
}

impl AppState {
    pub fn new(
        db: Database,
        news: NewsClient,
        summarizer: Option<Summarizer>,
        token_ttl_hours: i64,
    ) -> Arc<Self> {
        Arc::new(Self {
            db,
            news,
            summarizer,
            token_ttl_hours,
        })
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users/auth/register", post(auth::register))
        .route("/users/auth/login", post(auth::login))
        .route("/users/auth/logout", get(auth::logout))
        .route("/users/auth/access_token", get(auth::access_token))
        .route("/users/auth/status", get(auth::status))
        .route("/users/auth/update", patch(auth::update))
        .route("/user/list", get(user::list_users))
        .route("/user/get", get(user::get_self))
        .route("/user/get/{user_id}", get(user::get_by_id))
        .route("/user/find", get(user::find))
        .route("/user/suspend/{user_id}", patch(user::suspend))
        .route(
            "/user/setting",
            get(user::get_settings).patch(user::patch_settings),
        )
        .route("/article/ping", get(article::ping))
        .route("/article/topics", get(article::topics))
        .route("/article/sources", get(article::sources))
        .route("/article/list", get(article::list_all))
        .route("/article/get/{article_id}", get(article::get_one))
        .route("/article/get/{page}/{limit}", get(article::page))
        .route(
            "/article/get/{page}/{limit}/{keyword}",
            get(article::page_by_keyword),
        )
        .route("/article/summarize/{article_id}", get(article::summarize))
        .with_state(state)
}

async fn health() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Server is running."))
}

// ============================================================================
// Response Envelope
// ============================================================================

/// Every endpoint answers `{status, message}` plus optional `data`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: &str, data: T) -> Self {
        Self {
            status: true,
            message: message.to_string(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: &str) -> Self {
        Self {
            status: true,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Envelope for the paginated article listings; pagination bookkeeping
/// rides at the top level next to `data`.
#[derive(Debug, Serialize)]
pub struct PagedResponse<T: Serialize> {
    pub status: bool,
    pub message: String,
    pub data: Vec<T>,
    pub total: i64,
    pub pages: i64,
    pub page: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

// ============================================================================
// Views
// ============================================================================

pub(crate) fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub role: &'static str,
    pub suspended: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            email: user.email.clone(),
            role: user.role.as_str(),
            suspended: user.suspended,
            created_at: format_timestamp(user.created_at),
            updated_at: format_timestamp(user.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    pub tier: String,
    pub start_date: String,
    pub end_date: String,
}

impl From<&UserSubscription> for SubscriptionView {
    fn from(sub: &UserSubscription) -> Self {
        Self {
            tier: sub.tier.clone(),
            start_date: format_timestamp(sub.start_date),
            end_date: format_timestamp(sub.end_date),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleView {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub slug: String,
    pub source: String,
    pub author: String,
    pub date: String,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub keywords: Vec<String>,
}

impl From<&Article> for ArticleView {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id,
            user_id: article.user_id,
            title: article.title.clone(),
            slug: article.slug.clone(),
            source: article.source.clone(),
            author: article.author.clone(),
            date: format_timestamp(article.date),
            summary: article.summary.clone(),
            link: article.link.clone(),
            image_url: article.image_url.clone(),
            keywords: article.keywords.clone(),
        }
    }
}
