pub mod resource;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::database::RecordStore;
use crate::error::ApiError;
use crate::resource::PostFields;

/// GET / - greeting
pub async fn root() -> Json<&'static str> {
    Json("Hi.")
}

/// GET /health - store connectivity
pub async fn health(
    State(store): State<Arc<dyn RecordStore<PostFields>>>,
) -> Result<Json<Value>, ApiError> {
    if let Err(e) = store.ping().await {
        tracing::error!("Health check failed: {}", e);
        return Err(ApiError::service_unavailable("Database unavailable"));
    }

    Ok(Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    })))
}
