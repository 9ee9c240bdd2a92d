//! Health endpoints.

use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Reached only through the auth middleware, so answering at all means the
/// token verified.
pub async fn health_auth() -> Json<Value> {
    Json(json!({"status": "ok", "auth": "passed"}))
}
