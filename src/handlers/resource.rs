//! List, create and update for any resource schema.
//!
//! Every response body is a JSON array: the matching rows for a list, or the
//! single created/updated row. An update against an unknown id is an empty
//! array with 200, not a 404.

use axum::{
    body::Bytes,
    extract::{FromRef, Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

use crate::auth::Secrets;
use crate::database::RecordStore;
use crate::error::ApiError;
use crate::middleware::{ArchivedAccess, WriteAccess};
use crate::resource::{Record, Schema};

/// Per-resource router state
pub struct ResourceState<S> {
    pub store: Arc<dyn RecordStore<S>>,
    pub secrets: Secrets,
}

impl<S> Clone for ResourceState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            secrets: self.secrets.clone(),
        }
    }
}

impl<S> FromRef<ResourceState<S>> for Secrets {
    fn from_ref(state: &ResourceState<S>) -> Self {
        state.secrets.clone()
    }
}

type Records<S> = Json<Vec<Record<S>>>;

/// Routes for one resource mounted at `base` (e.g. `/posts`)
pub fn routes<S: Schema>(base: &str, state: ResourceState<S>) -> Router {
    Router::new()
        .route(base, get(list::<S>).post(create::<S>).put(update_without_id))
        .route(
            &format!("{}/", base),
            get(list::<S>).post(create::<S>).put(update_without_id),
        )
        .route(&format!("{}/:id", base), axum::routing::put(update::<S>))
        .with_state(state)
}

/// GET - every visible record
pub async fn list<S: Schema>(
    State(state): State<ResourceState<S>>,
    ArchivedAccess(include_archived): ArchivedAccess,
) -> Result<Records<S>, ApiError> {
    let records = state.store.list(include_archived).await?;
    Ok(Json(records))
}

/// POST - insert a new record
pub async fn create<S: Schema>(
    State(state): State<ResourceState<S>>,
    _access: WriteAccess,
    body: Bytes,
) -> Result<Records<S>, ApiError> {
    let patch: S::Patch = serde_json::from_slice(&body)?;
    let fields = S::from_patch(patch)?;

    let record = state.store.insert(&fields).await?;
    tracing::info!("Created {} {}", S::KIND, record.id);

    Ok(Json(vec![record]))
}

/// PUT - merge a partial payload over the stored record
pub async fn update<S: Schema>(
    State(state): State<ResourceState<S>>,
    _access: WriteAccess,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Records<S>, ApiError> {
    let id = parse_id(&id)?;
    let patch: S::Patch = serde_json::from_slice(&body)?;

    let saved = state.store.update(id, &patch, Utc::now()).await?;
    match &saved {
        Some(record) => tracing::info!("Updated {} {}", S::KIND, record.id),
        None => tracing::debug!("Update of missing {} {}", S::KIND, id),
    }

    Ok(Json(saved.into_iter().collect()))
}

/// PUT on the collection itself
async fn update_without_id(_access: WriteAccess) -> ApiError {
    ApiError::bad_request("Missing record id in path")
}

fn parse_id(raw: &str) -> Result<i32, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::bad_request("Missing record id in path"));
    }
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid record id: {}", raw)))
}
