use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub mod action_handler;
pub mod cluster_handler;
pub mod health_handler;
pub mod resource_handler;

/// Parses a JSON request body whatever its declared content type.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::Validation(format!("Invalid JSON body: {}", e)))
}
