use axum::{body::Bytes, extract::State, http::StatusCode};
use tracing::{info, warn};

use crate::{
    context::ClusterContext,
    error::ApiError,
    handlers::parse_json_body,
    models::{ActionRequest, DeleteLabelAction, ResourceKind},
    AppState,
};

/// POST /action
/// Runs a one-off action against the selected cluster.
pub async fn run_action(
    State(state): State<AppState>,
    context: ClusterContext,
    payload: Bytes,
) -> Result<StatusCode, ApiError> {
    let request: ActionRequest = parse_json_body(&payload)?;

    if let Some(action) = request.delete_label {
        delete_label(&state, &context, action).await?;
    }

    Ok(StatusCode::OK)
}

async fn delete_label(
    state: &AppState,
    context: &ClusterContext,
    action: DeleteLabelAction,
) -> Result<(), ApiError> {
    match ResourceKind::from_name(&action.kind) {
        Some(ResourceKind::Node) => {
            info!("Delete label '{}' from node '{}'", action.label, action.name);
            let client = state.resolver.resolve(context).await?;
            client.delete_node_label(&action.name, &action.label).await?;
            Ok(())
        }
        _ => {
            warn!(
                "Ignoring deleteLabel for unsupported kind '{}' ({})",
                action.kind, action.name
            );
            Ok(())
        }
    }
}
