use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Resource kinds
// ============================================================================

/// Resource categories proxied read-only from the upstream cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Node,
    Namespace,
    Deployment,
    Daemonset,
    Pod,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Node,
        ResourceKind::Namespace,
        ResourceKind::Deployment,
        ResourceKind::Daemonset,
        ResourceKind::Pod,
    ];

    /// Singular name, as used in URLs and the `kind` field of actions.
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Node => "node",
            ResourceKind::Namespace => "namespace",
            ResourceKind::Deployment => "deployment",
            ResourceKind::Daemonset => "daemonset",
            ResourceKind::Pod => "pod",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ResourceKind::Node => "/node",
            ResourceKind::Namespace => "/namespace",
            ResourceKind::Deployment => "/deployment",
            ResourceKind::Daemonset => "/daemonset",
            ResourceKind::Pod => "/pod",
        }
    }

    /// Key of the array in list responses.
    pub fn collection_key(&self) -> &'static str {
        match self {
            ResourceKind::Node => "nodes",
            ResourceKind::Namespace => "namespaces",
            ResourceKind::Deployment => "deployments",
            ResourceKind::Daemonset => "daemonsets",
            ResourceKind::Pod => "pods",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Resource views
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub ready: bool,
    pub internal_ip: Option<String>,
    pub kubelet_version: Option<String>,
    pub os_image: Option<String>,
    pub container_runtime: Option<String>,
    pub unschedulable: bool,
    pub creation_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceInfo {
    pub name: String,
    pub status: String,
    pub labels: BTreeMap<String, String>,
    pub creation_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentInfo {
    pub name: String,
    pub namespace: String,
    pub replicas: i32,
    pub ready_replicas: i32,
    pub available_replicas: i32,
    pub labels: BTreeMap<String, String>,
    pub images: Vec<String>,
    pub creation_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonsetInfo {
    pub name: String,
    pub namespace: String,
    pub desired_number_scheduled: i32,
    pub current_number_scheduled: i32,
    pub number_ready: i32,
    pub number_available: i32,
    pub labels: BTreeMap<String, String>,
    pub images: Vec<String>,
    pub creation_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub phase: String,
    pub node_name: Option<String>,
    pub pod_ip: Option<String>,
    pub host_ip: Option<String>,
    pub restarts: i32,
    pub containers: Vec<String>,
    pub labels: BTreeMap<String, String>,
    pub creation_timestamp: Option<DateTime<Utc>>,
}
