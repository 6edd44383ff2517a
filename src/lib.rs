// kubevision backend library
// Public modules are exported for use in tests and by the binary

pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

pub use config::Config;
pub use context::ClusterContext;
pub use error::ApiError;
pub use routes::build_router;

use services::{ClusterStore, ContextResolver};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ClusterStore>,
    pub resolver: Arc<ContextResolver>,
}
