use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::news::NewsError;
use crate::settings::SettingsError;
use crate::summarizer::SummarizeError;

/// API error taxonomy. Client mistakes and upstream-dependency failures
/// map to distinct status ranges; upstream trouble is never reported as a
/// client error.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request fields → 400
    #[error("{0}")]
    Validation(String),

    /// Missing/invalid credentials, or a capability the identity lacks → 401
    #[error("{0}")]
    Unauthorized(String),

    /// → 404
    #[error("{0}")]
    NotFound(String),

    /// The news or LLM service failed at the transport level → 502
    #[error("Upstream service unavailable: {0}")]
    Upstream(String),

    /// Anything else → 500. Details go to the log, not the client.
    #[error("Internal server error.")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// The admin-gate rejection, phrased once.
    pub fn unauthorized_access() -> Self {
        ApiError::Unauthorized("Unauthorized access.".to_string())
    }
}

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Upstream(e) => ApiError::Upstream(e.to_string()),
            SettingsError::UpstreamData(msg) => ApiError::Upstream(msg),
            SettingsError::Database(e) => ApiError::Internal(e.into()),
        }
    }
}

impl From<NewsError> for ApiError {
    fn from(err: NewsError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl From<SummarizeError> for ApiError {
    fn from(err: SummarizeError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let ApiError::Internal(err) = &self {
            tracing::error!(error = ?err, "Request failed with internal error");
        }

        let body = Json(serde_json::json!({
            "status": false,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
