use axum::response::Json;
use chrono::Utc;
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().timestamp(),
        "service": "kubevision",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
