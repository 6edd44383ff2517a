use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::context::ClusterContext;
use crate::error::ApiError;
use crate::services::{ClientFactory, ClusterStore, ResourceClient};

/// Picks the upstream client for a request.
///
/// Requests without a cluster go to the default client configured at startup.
/// Clients for registered clusters are built on first use and cached until the
/// cluster is deleted.
pub struct ContextResolver {
    store: Arc<dyn ClusterStore>,
    factory: Arc<dyn ClientFactory>,
    default_client: Option<Arc<dyn ResourceClient>>,
    cache: RwLock<ClientCache>,
}

#[derive(Default)]
struct ClientCache {
    clients: HashMap<String, Arc<dyn ResourceClient>>,
    // Bumped by every `forget`; a connect that started before a bump must not
    // be cached.
    generation: u64,
}

impl ContextResolver {
    pub fn new(
        store: Arc<dyn ClusterStore>,
        factory: Arc<dyn ClientFactory>,
        default_client: Option<Arc<dyn ResourceClient>>,
    ) -> Self {
        Self {
            store,
            factory,
            default_client,
            cache: RwLock::new(ClientCache::default()),
        }
    }

    pub async fn resolve(&self, context: &ClusterContext) -> Result<Arc<dyn ResourceClient>, ApiError> {
        let Some(cluster_id) = context.cluster_id.as_deref() else {
            return self.default_client.clone().ok_or_else(|| {
                ApiError::Upstream(anyhow!("no default cluster is configured"))
            });
        };

        let (cached, generation) = {
            let cache = self.cache.read();
            (cache.clients.get(cluster_id).cloned(), cache.generation)
        };
        if let Some(client) = cached {
            debug!("Using cached client for cluster {}", cluster_id);
            return Ok(client);
        }

        let cluster = self
            .store
            .get(cluster_id)
            .await?
            .ok_or_else(|| ApiError::cluster_not_found(cluster_id))?;

        let client = self
            .factory
            .connect(&cluster, context.region.as_deref())
            .await?;

        info!("Connected client for cluster {} ({})", cluster.name, cluster.id);
        {
            let mut cache = self.cache.write();
            if cache.generation == generation {
                let client = cache
                    .clients
                    .entry(cluster.id.clone())
                    .or_insert(client)
                    .clone();
                return Ok(client);
            }
        }

        // A cluster was forgotten while connecting; it may have been this one.
        if self.store.get(&cluster.id).await?.is_none() {
            debug!("Cluster {} was deleted while connecting", cluster.id);
            return Err(ApiError::cluster_not_found(&cluster.id));
        }
        Ok(client)
    }

    /// Drop the cached client for a cluster.
    pub fn forget(&self, cluster_id: &str) {
        let mut cache = self.cache.write();
        cache.generation += 1;
        if cache.clients.remove(cluster_id).is_some() {
            debug!("Dropped cached client for cluster {}", cluster_id);
        }
    }
}
