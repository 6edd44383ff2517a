// Shared helpers for the integration tests: a scripted resource client,
// a factory handing out per-cluster clients, and test app construction.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::http::{header, HeaderValue};
use axum_test::{TestRequest, TestServer};
use parking_lot::Mutex;

use kubevision::{
    build_router,
    models::{ClusterRecord, DaemonsetInfo, DeploymentInfo, NamespaceInfo, NodeInfo, PodInfo},
    services::{ClientFactory, ClusterStore, ContextResolver, MemoryClusterStore, ResourceClient},
    AppState, Config,
};

/// Resource client returning canned items and recording label deletions.
#[derive(Default)]
pub struct MockResourceClient {
    pub nodes: Vec<NodeInfo>,
    pub namespaces: Vec<NamespaceInfo>,
    pub deployments: Vec<DeploymentInfo>,
    pub daemonsets: Vec<DaemonsetInfo>,
    pub pods: Vec<PodInfo>,
    pub fail: bool,
    pub deleted_labels: Mutex<Vec<(String, String)>>,
}

impl MockResourceClient {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn with_nodes(names: &[&str]) -> Self {
        Self {
            nodes: names
                .iter()
                .map(|name| NodeInfo {
                    name: name.to_string(),
                    ready: true,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn deleted_labels(&self) -> Vec<(String, String)> {
        self.deleted_labels.lock().clone()
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(anyhow!("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceClient for MockResourceClient {
    async fn list_nodes(&self) -> Result<Vec<NodeInfo>> {
        self.check()?;
        Ok(self.nodes.clone())
    }

    async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>> {
        self.check()?;
        Ok(self.namespaces.clone())
    }

    async fn list_deployments(&self) -> Result<Vec<DeploymentInfo>> {
        self.check()?;
        Ok(self.deployments.clone())
    }

    async fn list_daemonsets(&self) -> Result<Vec<DaemonsetInfo>> {
        self.check()?;
        Ok(self.daemonsets.clone())
    }

    async fn list_pods(&self) -> Result<Vec<PodInfo>> {
        self.check()?;
        Ok(self.pods.clone())
    }

    async fn delete_node_label(&self, node: &str, label: &str) -> Result<()> {
        self.check()?;
        self.deleted_labels
            .lock()
            .push((node.to_string(), label.to_string()));
        Ok(())
    }
}

/// Hands out one client per cluster name and counts connections.
#[derive(Default)]
pub struct MockClientFactory {
    pub clients: Mutex<HashMap<String, Arc<MockResourceClient>>>,
    pub connects: Mutex<Vec<(String, Option<String>)>>,
}

impl MockClientFactory {
    pub fn register(&self, cluster_name: &str, client: MockResourceClient) -> Arc<MockResourceClient> {
        let client = Arc::new(client);
        self.clients
            .lock()
            .insert(cluster_name.to_string(), client.clone());
        client
    }

    pub fn connect_count(&self) -> usize {
        self.connects.lock().len()
    }
}

#[async_trait]
impl ClientFactory for MockClientFactory {
    async fn connect(
        &self,
        cluster: &ClusterRecord,
        region: Option<&str>,
    ) -> Result<Arc<dyn ResourceClient>> {
        self.connects
            .lock()
            .push((cluster.name.clone(), region.map(str::to_string)));

        let client = self
            .clients
            .lock()
            .get(&cluster.name)
            .cloned()
            .ok_or_else(|| anyhow!("cluster {} is unreachable", cluster.name))?;
        Ok(client)
    }
}

/// Creates a test configuration
pub fn create_test_config() -> Config {
    Config {
        server_address: "127.0.0.1:8091".to_string(),
        database_url: "memory".to_string(),
        log_level: "debug".to_string(),
        workers: None,
        kube_context: None,
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<dyn ClusterStore>,
    pub factory: Arc<MockClientFactory>,
    pub default_client: Option<Arc<MockResourceClient>>,
}

/// Creates a test app backed by an in-memory store and mock clients
pub fn create_test_app(default_client: Option<MockResourceClient>) -> TestApp {
    let store: Arc<dyn ClusterStore> = Arc::new(MemoryClusterStore::new());
    let factory = Arc::new(MockClientFactory::default());
    let default_client = default_client.map(Arc::new);

    let resolver = ContextResolver::new(
        store.clone(),
        factory.clone(),
        default_client
            .clone()
            .map(|c| c as Arc<dyn ResourceClient>),
    );

    let state = AppState {
        config: create_test_config(),
        store: store.clone(),
        resolver: Arc::new(resolver),
    };

    let server = TestServer::new(build_router(state)).unwrap();

    TestApp {
        server,
        store,
        factory,
        default_client,
    }
}

/// Selects a cluster the way the dashboard does, through the `clusterId` cookie
pub fn with_cluster(request: TestRequest, cluster_id: &str) -> TestRequest {
    request.add_header(
        header::COOKIE,
        HeaderValue::from_str(&format!("clusterId={}; region=RegionOne", cluster_id)).unwrap(),
    )
}
