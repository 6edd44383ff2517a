use axum::{
    extract::State,
    middleware::from_fn,
    routing::{delete, get, post, MethodRouter},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::{
    context::ClusterContext,
    handlers::{action_handler, cluster_handler, health_handler, resource_handler},
    middleware::cors_middleware,
    models::ResourceKind,
    AppState,
};

/// What a route is served by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Resource(ResourceKind),
    Action,
    Clusters,
    Cluster,
    Health,
}

impl Endpoint {
    fn method_router(self) -> MethodRouter<AppState> {
        match self {
            Endpoint::Resource(kind) => {
                get(move |State(state): State<AppState>, context: ClusterContext| {
                    resource_handler::list_resources(state, context, kind)
                })
            }
            Endpoint::Action => post(action_handler::run_action),
            Endpoint::Clusters => {
                get(cluster_handler::list_clusters).post(cluster_handler::create_cluster)
            }
            Endpoint::Cluster => delete(cluster_handler::delete_cluster),
            Endpoint::Health => get(health_handler::health_check),
        }
    }
}

/// The static route table. OPTIONS is answered for every path by the CORS layer.
pub const ROUTES: &[(&str, Endpoint)] = &[
    ("/node", Endpoint::Resource(ResourceKind::Node)),
    ("/namespace", Endpoint::Resource(ResourceKind::Namespace)),
    ("/deployment", Endpoint::Resource(ResourceKind::Deployment)),
    ("/daemonset", Endpoint::Resource(ResourceKind::Daemonset)),
    ("/pod", Endpoint::Resource(ResourceKind::Pod)),
    ("/action", Endpoint::Action),
    ("/cluster", Endpoint::Clusters),
    ("/cluster/:id", Endpoint::Cluster),
    ("/health", Endpoint::Health),
];

/// Build the application router from [`ROUTES`]. Called once before the listener binds.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new();
    for (pattern, endpoint) in ROUTES {
        debug!("Registering route {} -> {:?}", pattern, endpoint);
        router = router.route(pattern, endpoint.method_router());
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(cors_middleware)),
        )
        .with_state(state)
}
