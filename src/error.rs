use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::models::ErrorResponse;
use crate::services::StoreError;

/// Errors surfaced to HTTP callers as `{"error": message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] anyhow::Error),

    #[error("cluster store failure")]
    Store(#[source] sqlx::Error),
}

impl ApiError {
    pub fn cluster_not_found(id: &str) -> Self {
        ApiError::NotFound(format!("cluster {} is not found", id))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmptyName => ApiError::Validation(err.to_string()),
            StoreError::DuplicateName(_) => ApiError::Validation(err.to_string()),
            StoreError::Database(e) => ApiError::Store(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Upstream(e) => error!("Upstream error: {:#}", e),
            ApiError::Store(e) => error!("Cluster store error: {}", e),
            other => warn!("Request rejected ({}): {}", status, other),
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
