use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered upstream cluster and the credentials used to reach it.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRecord {
    pub id: String,
    pub name: String,
    pub auth_url: String,
    pub auth_project: String,
    pub auth_user: String,
    #[serde(skip_serializing)]
    pub auth_password: String,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when registering a cluster. Missing fields default to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateClusterRequest {
    pub name: String,
    pub auth_url: String,
    pub auth_project: String,
    pub auth_user: String,
    pub auth_password: String,
}

/// Body of `POST /cluster`: `{"cluster": {...}}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateClusterBody {
    pub cluster: CreateClusterRequest,
}

#[derive(Debug, Serialize)]
pub struct ClusterListResponse {
    pub clusters: Vec<ClusterRecord>,
}
