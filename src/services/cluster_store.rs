use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{ClusterRecord, CreateClusterRequest};

/// Value of `DATABASE_URL` selecting the in-process store.
pub const MEMORY_DATABASE_URL: &str = "memory";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cluster name must not be empty")]
    EmptyName,

    #[error("cluster {0} already exists")]
    DuplicateName(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence for registered clusters.
#[async_trait]
pub trait ClusterStore: Send + Sync {
    async fn create(&self, request: CreateClusterRequest) -> Result<ClusterRecord, StoreError>;

    async fn list(&self) -> Result<Vec<ClusterRecord>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<ClusterRecord>, StoreError>;

    /// Returns the number of removed records (0 or 1).
    async fn delete_by_id(&self, id: &str) -> Result<u64, StoreError>;
}

fn new_record(request: CreateClusterRequest) -> Result<ClusterRecord, StoreError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(StoreError::EmptyName);
    }

    Ok(ClusterRecord {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        auth_url: request.auth_url,
        auth_project: request.auth_project,
        auth_user: request.auth_user,
        auth_password: request.auth_password,
        created_at: Utc::now(),
    })
}

/// Opens the store selected by `database_url`.
pub async fn open_store(database_url: &str) -> Result<Arc<dyn ClusterStore>, StoreError> {
    if database_url == MEMORY_DATABASE_URL {
        info!("Using in-memory cluster store");
        return Ok(Arc::new(MemoryClusterStore::new()));
    }

    let store = SqliteClusterStore::connect(database_url).await?;
    info!("Using sqlite cluster store at {}", database_url);
    Ok(Arc::new(store))
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
pub struct MemoryClusterStore {
    clusters: RwLock<Vec<ClusterRecord>>,
}

impl MemoryClusterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClusterStore for MemoryClusterStore {
    async fn create(&self, request: CreateClusterRequest) -> Result<ClusterRecord, StoreError> {
        let record = new_record(request)?;

        let mut clusters = self.clusters.write();
        if clusters.iter().any(|c| c.name == record.name) {
            return Err(StoreError::DuplicateName(record.name));
        }
        clusters.push(record.clone());

        Ok(record)
    }

    async fn list(&self) -> Result<Vec<ClusterRecord>, StoreError> {
        Ok(self.clusters.read().clone())
    }

    async fn get(&self, id: &str) -> Result<Option<ClusterRecord>, StoreError> {
        Ok(self.clusters.read().iter().find(|c| c.id == id).cloned())
    }

    async fn delete_by_id(&self, id: &str) -> Result<u64, StoreError> {
        let mut clusters = self.clusters.write();
        let before = clusters.len();
        clusters.retain(|c| c.id != id);
        Ok((before - clusters.len()) as u64)
    }
}

// ============================================================================
// SQLite store
// ============================================================================

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS clusters (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE,
    auth_url TEXT NOT NULL,
    auth_project TEXT NOT NULL,
    auth_user TEXT NOT NULL,
    auth_password TEXT NOT NULL,
    created_at TEXT NOT NULL
)
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, name, auth_url, auth_project, auth_user, auth_password, created_at FROM clusters";

#[derive(Clone)]
pub struct SqliteClusterStore {
    pool: SqlitePool,
}

impl SqliteClusterStore {
    /// Connects and creates the schema if it does not exist yet.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to `sqlite::memory:` opens a distinct database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ClusterStore for SqliteClusterStore {
    async fn create(&self, request: CreateClusterRequest) -> Result<ClusterRecord, StoreError> {
        let record = new_record(request)?;

        let result = sqlx::query(
            "INSERT INTO clusters (id, name, auth_url, auth_project, auth_user, auth_password, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.auth_url)
        .bind(&record.auth_project)
        .bind(&record.auth_user)
        .bind(&record.auth_password)
        .bind(record.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(record),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateName(record.name))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<ClusterRecord>, StoreError> {
        let clusters = sqlx::query_as::<_, ClusterRecord>(&format!(
            "{} ORDER BY created_at",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(clusters)
    }

    async fn get(&self, id: &str) -> Result<Option<ClusterRecord>, StoreError> {
        let cluster =
            sqlx::query_as::<_, ClusterRecord>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(cluster)
    }

    async fn delete_by_id(&self, id: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM clusters WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
