use axum::response::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    context::ClusterContext, error::ApiError, models::ResourceKind, services::ResourceClient,
    AppState,
};

/// GET /{kind}
/// Lists every item of `kind` in the cluster selected by the request cookies.
///
/// Returns `{"<kind>s": [...]}`; the array is empty when the cluster has none.
pub async fn list_resources(
    state: AppState,
    context: ClusterContext,
    kind: ResourceKind,
) -> Result<Json<Value>, ApiError> {
    debug!("List {} for cluster {:?}", kind, context.cluster_id);
    let client = state.resolver.resolve(&context).await?;
    let items = fetch_items(client.as_ref(), kind).await?;

    debug!("Listed {} {} item(s)", items.len(), kind);
    let mut body = Map::new();
    body.insert(kind.collection_key().to_string(), Value::Array(items));
    Ok(Json(Value::Object(body)))
}

async fn fetch_items(client: &dyn ResourceClient, kind: ResourceKind) -> Result<Vec<Value>, ApiError> {
    match kind {
        ResourceKind::Node => to_values(client.list_nodes().await?),
        ResourceKind::Namespace => to_values(client.list_namespaces().await?),
        ResourceKind::Deployment => to_values(client.list_deployments().await?),
        ResourceKind::Daemonset => to_values(client.list_daemonsets().await?),
        ResourceKind::Pod => to_values(client.list_pods().await?),
    }
}

fn to_values<T: Serialize>(items: Vec<T>) -> Result<Vec<Value>, ApiError> {
    items
        .into_iter()
        .map(|item| serde_json::to_value(item).map_err(|e| ApiError::Upstream(e.into())))
        .collect()
}
