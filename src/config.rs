use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:8091";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://kubevision.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub log_level: String,
    pub workers: Option<usize>,
    pub kube_context: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            log_level: "info".to_string(),
            workers: None,
            kube_context: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Only read .env when explicitly asked to
        if env::var("USE_DOTENV").ok().as_deref() == Some("true") {
            dotenv::dotenv().ok();
        }

        let workers = match env::var("WORKERS") {
            Ok(value) => Some(
                value
                    .parse::<usize>()
                    .context(format!("WORKERS must be a positive integer, got '{}'", value))?,
            ),
            Err(_) => None,
        };

        let config = Config {
            server_address: env::var("SERVER_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_SERVER_ADDRESS.to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            workers: workers.filter(|w| *w > 0),
            kube_context: env::var("KUBE_CONTEXT").ok().filter(|c| !c.is_empty()),
        };

        Ok(config)
    }

    /// Listener address, with the port replaced when `port` is given.
    pub fn bind_address(&self, port: Option<u16>) -> String {
        match port {
            Some(port) => {
                let host = self
                    .server_address
                    .rsplit_once(':')
                    .map(|(host, _)| host)
                    .unwrap_or(self.server_address.as_str());
                format!("{}:{}", host, port)
            }
            None => self.server_address.clone(),
        }
    }
}
