//! Kubernetes client used to proxy resource listings

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::http::Uri;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use k8s_openapi::api::core::v1::{Namespace, Node, Pod, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use kube::api::{ListParams, Patch, PatchParams};
use kube::config::KubeConfigOptions;
use kube::Api;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::models::{
    ClusterRecord, DaemonsetInfo, DeploymentInfo, NamespaceInfo, NodeInfo, PodInfo,
};

/// Operations the dashboard needs from an upstream cluster.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn list_nodes(&self) -> Result<Vec<NodeInfo>>;

    async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>>;

    async fn list_deployments(&self) -> Result<Vec<DeploymentInfo>>;

    async fn list_daemonsets(&self) -> Result<Vec<DaemonsetInfo>>;

    async fn list_pods(&self) -> Result<Vec<PodInfo>>;

    async fn delete_node_label(&self, node: &str, label: &str) -> Result<()>;
}

/// Builds clients for registered clusters.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn connect(
        &self,
        cluster: &ClusterRecord,
        region: Option<&str>,
    ) -> Result<Arc<dyn ResourceClient>>;
}

/// Kubernetes client wrapper
#[derive(Clone)]
pub struct KubeResourceClient {
    client: kube::Client,
}

impl KubeResourceClient {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    /// Create a client from the local kubeconfig, optionally for a named context
    pub async fn from_kubeconfig(context: Option<&str>) -> Result<Self> {
        let config = match context {
            Some(name) => kube::Config::from_kubeconfig(&KubeConfigOptions {
                context: Some(name.to_string()),
                ..Default::default()
            })
            .await
            .context(format!("Failed to load kubeconfig context: {}", name))?,
            None => kube::Config::infer()
                .await
                .context("Failed to infer kube config. Is kubectl configured?")?,
        };

        let client = kube::Client::try_from(config).context("Failed to create kube client")?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    async fn list_nodes(&self) -> Result<Vec<NodeInfo>> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        let list = nodes
            .list(&ListParams::default())
            .await
            .context("Failed to list nodes")?;

        Ok(list.items.into_iter().map(node_to_info).collect())
    }

    async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces
            .list(&ListParams::default())
            .await
            .context("Failed to list namespaces")?;

        Ok(list.items.into_iter().map(namespace_to_info).collect())
    }

    async fn list_deployments(&self) -> Result<Vec<DeploymentInfo>> {
        let deployments: Api<Deployment> = Api::all(self.client.clone());
        let list = deployments
            .list(&ListParams::default())
            .await
            .context("Failed to list deployments")?;

        Ok(list.items.into_iter().map(deployment_to_info).collect())
    }

    async fn list_daemonsets(&self) -> Result<Vec<DaemonsetInfo>> {
        let daemonsets: Api<DaemonSet> = Api::all(self.client.clone());
        let list = daemonsets
            .list(&ListParams::default())
            .await
            .context("Failed to list daemonsets")?;

        Ok(list.items.into_iter().map(daemonset_to_info).collect())
    }

    async fn list_pods(&self) -> Result<Vec<PodInfo>> {
        let pods: Api<Pod> = Api::all(self.client.clone());
        let list = pods
            .list(&ListParams::default())
            .await
            .context("Failed to list pods")?;

        Ok(list.items.into_iter().map(pod_to_info).collect())
    }

    async fn delete_node_label(&self, node: &str, label: &str) -> Result<()> {
        let nodes: Api<Node> = Api::all(self.client.clone());

        // A null value removes the key under a JSON merge patch.
        let mut labels = Map::new();
        labels.insert(label.to_string(), Value::Null);
        let patch = json!({ "metadata": { "labels": labels } });
        nodes
            .patch(node, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .context(format!("Failed to delete label '{}' from node '{}'", label, node))?;

        Ok(())
    }
}

/// Connects to registered clusters using the record's endpoint and basic auth.
#[derive(Clone, Default)]
pub struct KubeClientFactory;

impl KubeClientFactory {
    /// Build the kube config for a registered cluster
    pub fn config_for(cluster: &ClusterRecord) -> Result<kube::Config> {
        let cluster_url: Uri = cluster
            .auth_url
            .parse()
            .context(format!("Invalid auth url for cluster {}: '{}'", cluster.name, cluster.auth_url))?;

        let mut config = kube::Config::new(cluster_url);
        if !cluster.auth_project.is_empty() {
            config.default_namespace = cluster.auth_project.clone();
        }
        if !cluster.auth_user.is_empty() {
            config.auth_info.username = Some(cluster.auth_user.clone());
            config.auth_info.password = Some(cluster.auth_password.clone().into());
        }

        Ok(config)
    }
}

#[async_trait]
impl ClientFactory for KubeClientFactory {
    async fn connect(
        &self,
        cluster: &ClusterRecord,
        region: Option<&str>,
    ) -> Result<Arc<dyn ResourceClient>> {
        info!(
            "Connecting to cluster {} ({}) region={:?}",
            cluster.name,
            cluster.auth_url,
            region
        );
        let config = Self::config_for(cluster)?;
        let client = kube::Client::try_from(config).context(format!(
            "Failed to create client for cluster: {}",
            cluster.name
        ))?;

        Ok(Arc::new(KubeResourceClient::new(client)))
    }
}

// ============================================================================
// Conversions
// ============================================================================

fn labels_of(meta: &ObjectMeta) -> BTreeMap<String, String> {
    meta.labels.clone().unwrap_or_default()
}

fn created_at(meta: &ObjectMeta) -> Option<chrono::DateTime<chrono::Utc>> {
    meta.creation_timestamp.as_ref().map(|Time(t)| *t)
}

fn template_images(template: &PodTemplateSpec) -> Vec<String> {
    template
        .spec
        .as_ref()
        .map(container_images)
        .unwrap_or_default()
}

fn container_images(spec: &PodSpec) -> Vec<String> {
    spec.containers
        .iter()
        .filter_map(|c| c.image.clone())
        .collect()
}

/// Convert a k8s Node to NodeInfo
pub fn node_to_info(node: Node) -> NodeInfo {
    let mut info = NodeInfo {
        name: node.metadata.name.clone().unwrap_or_default(),
        labels: labels_of(&node.metadata),
        creation_timestamp: created_at(&node.metadata),
        ..Default::default()
    };

    if let Some(spec) = node.spec {
        info.unschedulable = spec.unschedulable.unwrap_or(false);
    }

    if let Some(status) = node.status {
        info.ready = status
            .conditions
            .unwrap_or_default()
            .iter()
            .any(|c| c.type_ == "Ready" && c.status == "True");
        info.internal_ip = status
            .addresses
            .unwrap_or_default()
            .into_iter()
            .find(|a| a.type_ == "InternalIP")
            .map(|a| a.address);
        if let Some(node_info) = status.node_info {
            info.kubelet_version = Some(node_info.kubelet_version);
            info.os_image = Some(node_info.os_image);
            info.container_runtime = Some(node_info.container_runtime_version);
        }
    }

    info
}

/// Convert a k8s Namespace to NamespaceInfo
pub fn namespace_to_info(ns: Namespace) -> NamespaceInfo {
    NamespaceInfo {
        name: ns.metadata.name.clone().unwrap_or_default(),
        status: ns
            .status
            .and_then(|s| s.phase)
            .unwrap_or_else(|| "Unknown".to_string()),
        labels: labels_of(&ns.metadata),
        creation_timestamp: created_at(&ns.metadata),
    }
}

/// Convert a k8s Deployment to DeploymentInfo
pub fn deployment_to_info(deploy: Deployment) -> DeploymentInfo {
    let mut info = DeploymentInfo {
        name: deploy.metadata.name.clone().unwrap_or_default(),
        namespace: deploy.metadata.namespace.clone().unwrap_or_default(),
        labels: labels_of(&deploy.metadata),
        creation_timestamp: created_at(&deploy.metadata),
        ..Default::default()
    };

    if let Some(spec) = deploy.spec {
        info.replicas = spec.replicas.unwrap_or(0);
        info.images = template_images(&spec.template);
    }

    if let Some(status) = deploy.status {
        info.ready_replicas = status.ready_replicas.unwrap_or(0);
        info.available_replicas = status.available_replicas.unwrap_or(0);
    }

    info
}

/// Convert a k8s DaemonSet to DaemonsetInfo
pub fn daemonset_to_info(ds: DaemonSet) -> DaemonsetInfo {
    let mut info = DaemonsetInfo {
        name: ds.metadata.name.clone().unwrap_or_default(),
        namespace: ds.metadata.namespace.clone().unwrap_or_default(),
        labels: labels_of(&ds.metadata),
        creation_timestamp: created_at(&ds.metadata),
        ..Default::default()
    };

    if let Some(spec) = ds.spec {
        info.images = template_images(&spec.template);
    }

    if let Some(status) = ds.status {
        info.desired_number_scheduled = status.desired_number_scheduled;
        info.current_number_scheduled = status.current_number_scheduled;
        info.number_ready = status.number_ready;
        info.number_available = status.number_available.unwrap_or(0);
    }

    info
}

/// Convert a k8s Pod to PodInfo
pub fn pod_to_info(pod: Pod) -> PodInfo {
    let mut info = PodInfo {
        name: pod.metadata.name.clone().unwrap_or_default(),
        namespace: pod.metadata.namespace.clone().unwrap_or_default(),
        phase: "Unknown".to_string(),
        labels: labels_of(&pod.metadata),
        creation_timestamp: created_at(&pod.metadata),
        ..Default::default()
    };

    if let Some(spec) = &pod.spec {
        info.node_name = spec.node_name.clone();
        info.containers = spec.containers.iter().map(|c| c.name.clone()).collect();
    }

    if let Some(status) = pod.status {
        if let Some(phase) = status.phase {
            info.phase = phase;
        }
        info.pod_ip = status.pod_ip;
        info.host_ip = status.host_ip;
        info.restarts = status
            .container_statuses
            .unwrap_or_default()
            .iter()
            .map(|cs| cs.restart_count)
            .sum();
    }

    info
}
