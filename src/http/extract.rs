use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use std::sync::Arc;

use super::error::ApiError;
use super::AppState;
use crate::auth::token_fingerprint;
use crate::storage::Role;

/// The authenticated caller, resolved from the `Authorization: Bearer`
/// header. The reconciler and every owner-scoped query receive this
/// `user_id` as trusted input.
pub struct AuthUser {
    pub user_id: i64,
    /// Fingerprint of the presented token; logout revokes exactly this one.
    pub fingerprint: String,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header.".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Invalid authorization header.".to_string()))?;

        let fingerprint = token_fingerprint(token);
        let user_id = state
            .db
            .resolve_token(&fingerprint)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token.".to_string()))?;

        Ok(AuthUser {
            user_id,
            fingerprint,
        })
    }
}

/// An authenticated caller that also holds the admin capability. Admin
/// routes take this extractor; everyone else gets 401.
pub struct AdminUser {
    pub user_id: i64,
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;

        let user = state
            .db
            .get_user(auth.user_id)
            .await?
            .ok_or_else(ApiError::unauthorized_access)?;

        if user.role != Role::Admin {
            return Err(ApiError::unauthorized_access());
        }

        Ok(AdminUser {
            user_id: auth.user_id,
        })
    }
}
