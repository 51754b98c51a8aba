//! Article browsing, topic/source discovery, and summarization endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use super::error::ApiError;
use super::extract::{AdminUser, AuthUser};
use super::{ApiResponse, AppState, ArticleView, PagedResponse};
use crate::settings::ALLOWED_TOPICS;

/// Bullet points requested per summary.
const SUMMARY_BULLET_POINTS: u32 = 5;

pub async fn ping() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Article service is running."))
}

pub async fn topics(_caller: AuthUser) -> Json<ApiResponse<Vec<&'static str>>> {
    Json(ApiResponse::ok(
        "Topics retrieved successfully.",
        ALLOWED_TOPICS.to_vec(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SourcesParams {
    /// Comma-separated topic list; absent means all topics.
    pub topics: Option<String>,
}

pub async fn sources(
    State(state): State<Arc<AppState>>,
    _caller: AuthUser,
    Query(params): Query<SourcesParams>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let mut sources = Vec::new();
    match params.topics.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(topics) => {
            for topic in topics.split(',') {
                sources.extend(state.news.sources(Some(topic.trim())).await?);
            }
        }
        None => {
            sources = state.news.sources(None).await?;
        }
    }

    Ok(Json(ApiResponse::ok(
        "Sources retrieved successfully.",
        sources,
    )))
}

pub async fn list_all(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<ArticleView>>>, ApiError> {
    let articles = state.db.list_all_articles().await?;
    Ok(Json(ApiResponse::ok(
        "Articles retrieved successfully.",
        articles.iter().map(ArticleView::from).collect(),
    )))
}

pub async fn get_one(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(article_id): Path<i64>,
) -> Result<Json<ApiResponse<ArticleView>>, ApiError> {
    let article = state
        .db
        .get_article(caller.user_id, article_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article not found.".to_string()))?;

    Ok(Json(ApiResponse::ok(
        "Article retrieved successfully.",
        ArticleView::from(&article),
    )))
}

pub async fn page(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path((page, limit)): Path<(i64, i64)>,
) -> Result<Json<PagedResponse<ArticleView>>, ApiError> {
    let result = state.db.list_articles(caller.user_id, page, limit).await?;
    Ok(Json(paged(result)))
}

pub async fn page_by_keyword(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path((page, limit, keyword)): Path<(i64, i64, String)>,
) -> Result<Json<PagedResponse<ArticleView>>, ApiError> {
    let result = state
        .db
        .list_articles_by_keyword(caller.user_id, &keyword, page, limit)
        .await?;
    Ok(Json(paged(result)))
}

fn paged(result: crate::storage::ArticlePage) -> PagedResponse<ArticleView> {
    PagedResponse {
        status: true,
        message: "Articles retrieved successfully.".to_string(),
        data: result.articles.iter().map(ArticleView::from).collect(),
        total: result.total,
        pages: result.pages,
        page: result.page,
        has_next: result.has_next(),
        has_prev: result.has_prev(),
    }
}

pub async fn summarize(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(article_id): Path<i64>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let summarizer = state
        .summarizer
        .as_ref()
        .ok_or_else(|| ApiError::Upstream("Summarization is not configured.".to_string()))?;

    let article = state
        .db
        .get_article(caller.user_id, article_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article not found.".to_string()))?;

    let text = article
        .summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            ApiError::Validation("Article has no text to summarize.".to_string())
        })?;

    let bullets = summarizer
        .bullet_points(text, SUMMARY_BULLET_POINTS)
        .await?;

    Ok(Json(ApiResponse::ok(
        "Article summarized successfully.",
        bullets,
    )))
}
