//! Registration, login, and account endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::ApiError;
use super::extract::AuthUser;
use super::{ApiResponse, AppState, UserView};
use crate::auth;
use crate::storage::{Role, Tier, User};

/// Registration grants a FREE subscription for this long.
const INITIAL_SUBSCRIPTION_DAYS: i64 = 365;

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePayload {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthData {
    pub id: i64,
    pub role: &'static str,
    pub auth_token: String,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ApiError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::Validation(format!("{} is required.", field)))
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = email.contains('@')
        && email.rsplit('@').next().is_some_and(|domain| domain.contains('.'))
        && !email.starts_with('@');
    if valid {
        Ok(())
    } else {
        Err(ApiError::Validation("Invalid email address.".to_string()))
    }
}

async fn issue_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    let token = auth::generate_token();
    let fingerprint = auth::token_fingerprint(&token);
    let expires_at = chrono::Utc::now().timestamp() + state.token_ttl_hours * 3600;
    state.db.insert_token(user.id, &fingerprint, expires_at).await?;
    Ok(token)
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<ApiResponse<AuthData>>), ApiError> {
    let firstname = required(&payload.firstname, "firstname")?;
    let lastname = required(&payload.lastname, "lastname")?;
    let email = required(&payload.email, "email")?;
    let password = required(&payload.password, "password")?;
    validate_email(email)?;

    let role = match payload.role.as_deref() {
        None | Some("") => Role::User,
        Some(name) => Role::parse(name)
            .ok_or_else(|| ApiError::Validation(format!("Invalid role {}.", name)))?,
    };

    if state.db.get_user_by_email(email).await?.is_some() {
        return Err(ApiError::Validation("Email already exists.".to_string()));
    }

    let password_hash =
        auth::hash_password(password).map_err(|e| ApiError::Internal(e.into()))?;
    let user_id = state
        .db
        .create_user(firstname, lastname, email, &password_hash, role)
        .await?;

    let now = chrono::Utc::now().timestamp();
    state
        .db
        .create_subscription(
            user_id,
            Tier::Free,
            now,
            now + INITIAL_SUBSCRIPTION_DAYS * 86_400,
        )
        .await?;

    let user = state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("user vanished after insert")))?;
    let token = issue_token(&state, &user).await?;

    tracing::info!(user_id, email = %user.email, role = user.role.as_str(), "User registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            &format!("Successfully registered as {}.", user.role.as_str()),
            AuthData {
                id: user.id,
                role: user.role.as_str(),
                auth_token: token,
            },
        )),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<ApiResponse<AuthData>>, ApiError> {
    let email = required(&payload.email, "email")?;
    let password = required(&payload.password, "password")?;

    let user = state
        .db
        .get_user_by_email(email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Email or password is incorrect.".to_string()))?;

    if !auth::verify_password(password, &user.password_hash) {
        return Err(ApiError::Unauthorized(
            "Email or password is incorrect.".to_string(),
        ));
    }

    if user.suspended {
        return Err(ApiError::Unauthorized(
            "Account is suspended by admin.".to_string(),
        ));
    }

    let token = issue_token(&state, &user).await?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(ApiResponse::ok(
        "User logged in successfully.",
        AuthData {
            id: user.id,
            role: user.role.as_str(),
            auth_token: token,
        },
    )))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.db.revoke_token(&caller.fingerprint).await?;
    Ok(Json(ApiResponse::message("Successfully logged out.")))
}

pub async fn access_token(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<AuthData>>, ApiError> {
    let user = state
        .db
        .get_user(caller.user_id)
        .await?
        .ok_or_else(ApiError::unauthorized_access)?;

    let token = issue_token(&state, &user).await?;
    Ok(Json(ApiResponse::ok(
        "Access token generated successfully.",
        AuthData {
            id: user.id,
            role: user.role.as_str(),
            auth_token: token,
        },
    )))
}

#[derive(Debug, Serialize)]
pub struct StatusData {
    pub active: bool,
    pub role: &'static str,
}

pub async fn status(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<StatusData>>, ApiError> {
    let user = state
        .db
        .get_user(caller.user_id)
        .await?
        .ok_or_else(ApiError::unauthorized_access)?;

    Ok(Json(ApiResponse::ok(
        "User status.",
        StatusData {
            active: !user.suspended,
            role: user.role.as_str(),
        },
    )))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(payload): Json<UpdatePayload>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    if let Some(email) = payload.email.as_deref().filter(|e| !e.is_empty()) {
        validate_email(email)?;
    }

    if let Some(password) = payload.password.as_deref().filter(|p| !p.is_empty()) {
        let hash = auth::hash_password(password).map_err(|e| ApiError::Internal(e.into()))?;
        state.db.set_password_hash(caller.user_id, &hash).await?;
    }

    state
        .db
        .update_profile(
            caller.user_id,
            payload.firstname.as_deref().filter(|v| !v.is_empty()),
            payload.lastname.as_deref().filter(|v| !v.is_empty()),
            payload.email.as_deref().filter(|v| !v.is_empty()),
        )
        .await?;

    let user = state
        .db
        .get_user(caller.user_id)
        .await?
        .ok_or_else(ApiError::unauthorized_access)?;

    Ok(Json(ApiResponse::ok(
        "User updated successfully.",
        UserView::from(&user),
    )))
}
