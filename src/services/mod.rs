pub mod cluster_store;
pub mod context_resolver;
pub mod kube_client;

pub use cluster_store::{
    open_store, ClusterStore, MemoryClusterStore, SqliteClusterStore, StoreError,
    MEMORY_DATABASE_URL,
};
pub use context_resolver::ContextResolver;
pub use kube_client::{ClientFactory, KubeClientFactory, KubeResourceClient, ResourceClient};
