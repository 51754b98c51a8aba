//! User listing, lookup, and settings endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::ApiError;
use super::extract::{AdminUser, AuthUser};
use super::{ApiResponse, AppState, SubscriptionView, UserView};
use crate::settings::{self, SettingsUpdate};
use crate::storage::UserFilter;

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<UserView>>>, ApiError> {
    let users = state.db.list_users().await?;
    Ok(Json(ApiResponse::ok(
        "Users retrieved successfully.",
        users.iter().map(UserView::from).collect(),
    )))
}

pub async fn get_self(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let user = state
        .db
        .get_user(caller.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    Ok(Json(ApiResponse::ok(
        "User retrieved successfully.",
        UserView::from(&user),
    )))
}

pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let user = state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    Ok(Json(ApiResponse::ok(
        "User retrieved successfully.",
        UserView::from(&user),
    )))
}

#[derive(Debug, Deserialize)]
pub struct FindParams {
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

pub async fn find(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<FindParams>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let filter = UserFilter {
        email: params.email.filter(|v| !v.is_empty()),
        firstname: params.firstname.filter(|v| !v.is_empty()),
        lastname: params.lastname.filter(|v| !v.is_empty()),
    };

    let user = state
        .db
        .find_user(&filter)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    Ok(Json(ApiResponse::ok(
        "User retrieved successfully.",
        UserView::from(&user),
    )))
}

#[derive(Debug, Deserialize)]
pub struct SuspendPayload {
    pub suspended: Option<bool>,
}

pub async fn suspend(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(user_id): Path<i64>,
    Json(payload): Json<SuspendPayload>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let suspended = payload
        .suspended
        .ok_or_else(|| ApiError::Validation("suspended is required.".to_string()))?;

    if !state.db.set_suspended(user_id, suspended).await? {
        return Err(ApiError::NotFound("User not found.".to_string()));
    }

    let user = state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    Ok(Json(ApiResponse::ok(
        "User updated successfully.",
        UserView::from(&user),
    )))
}

#[derive(Debug, Serialize)]
pub struct SettingsData {
    pub subscription: Option<SubscriptionView>,
    pub topics: Vec<String>,
    pub sources: Vec<String>,
    pub keywords: Vec<String>,
}

pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<SettingsData>>, ApiError> {
    let settings = settings::get_settings(&state.db, caller.user_id).await?;

    Ok(Json(ApiResponse::ok(
        "User settings retrieved successfully.",
        SettingsData {
            subscription: settings.subscription.as_ref().map(SubscriptionView::from),
            topics: settings.topics,
            sources: settings.sources,
            keywords: settings.keywords,
        },
    )))
}

pub async fn patch_settings(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    settings::apply_settings(&state.db, &state.news, caller.user_id, &update).await?;

    Ok(Json(ApiResponse::message(
        "User settings updated successfully.",
    )))
}
