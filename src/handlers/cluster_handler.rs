use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    error::ApiError,
    handlers::parse_json_body,
    models::{ClusterListResponse, CreateClusterBody},
    AppState,
};

/// GET /cluster
pub async fn list_clusters(
    State(state): State<AppState>,
) -> Result<Json<ClusterListResponse>, ApiError> {
    let clusters = state.store.list().await?;
    Ok(Json(ClusterListResponse { clusters }))
}

/// POST /cluster
pub async fn create_cluster(
    State(state): State<AppState>,
    payload: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body: CreateClusterBody = parse_json_body(&payload)?;

    info!("Add cluster '{}' ({})", body.cluster.name, body.cluster.auth_url);
    let cluster = state.store.create(body.cluster).await?;
    info!("Created cluster '{}' with id {}", cluster.name, cluster.id);

    Ok(Json(json!({})))
}

/// DELETE /cluster/:id
pub async fn delete_cluster(
    State(state): State<AppState>,
    Path(cluster_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.store.delete_by_id(&cluster_id).await?;
    if deleted == 0 {
        return Err(ApiError::cluster_not_found(&cluster_id));
    }

    state.resolver.forget(&cluster_id);
    info!("Deleted cluster {}", cluster_id);
    Ok(StatusCode::NO_CONTENT)
}
