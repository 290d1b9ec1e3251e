//! Control-plane error taxonomy with an explicit HTTP status mapping, so
//! handlers can `?`-propagate and still return the exact codes in the
//! endpoint table.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    InputInvalid(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("integration unavailable: {0}")]
    IntegrationUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<mindops_core::MindopsError> for ApiError {
    fn from(err: mindops_core::MindopsError) -> Self {
        match err {
            mindops_core::MindopsError::InputInvalid(msg) => ApiError::InputInvalid(msg),
            mindops_core::MindopsError::NotFound(msg) => ApiError::NotFound(msg),
            mindops_core::MindopsError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<mindops_slo::SloError> for ApiError {
    fn from(err: mindops_slo::SloError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<mindops_topology::TopologyError> for ApiError {
    fn from(err: mindops_topology::TopologyError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InputInvalid(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::IntegrationUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string()),
        };
        (status, Json(json!({ "detail": message }))).into_response()
    }
}
