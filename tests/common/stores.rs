//! Store doubles for exercising handler behavior the in-memory tables never show.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use lupus_api_rust::database::{DatabaseError, MemoryStore, RecordStore};
use lupus_api_rust::resource::{Record, Schema};

/// Fails every call with a driver error that names the table
pub struct FailingStore;

fn driver_error<S: Schema>() -> DatabaseError {
    DatabaseError::Sqlx(sqlx::Error::Protocol(format!(
        "relation \"{}\" does not exist",
        S::TABLE
    )))
}

#[async_trait]
impl<S: Schema> RecordStore<S> for FailingStore {
    async fn list(&self, _include_archived: bool) -> Result<Vec<Record<S>>, DatabaseError> {
        Err(driver_error::<S>())
    }

    async fn insert(&self, _fields: &S) -> Result<Record<S>, DatabaseError> {
        Err(driver_error::<S>())
    }

    async fn update(
        &self,
        _id: i32,
        _patch: &S::Patch,
        _now: DateTime<Utc>,
    ) -> Result<Option<Record<S>>, DatabaseError> {
        Err(driver_error::<S>())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Err(driver_error::<S>())
    }
}

/// In-memory tables that stall before every update, widening any race between writers
pub struct SlowStore<S> {
    inner: MemoryStore<S>,
    delay: Duration,
}

impl<S> SlowStore<S> {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            delay,
        }
    }
}

#[async_trait]
impl<S: Schema> RecordStore<S> for SlowStore<S> {
    async fn list(&self, include_archived: bool) -> Result<Vec<Record<S>>, DatabaseError> {
        self.inner.list(include_archived).await
    }

    async fn insert(&self, fields: &S) -> Result<Record<S>, DatabaseError> {
        self.inner.insert(fields).await
    }

    async fn update(
        &self,
        id: i32,
        patch: &S::Patch,
        now: DateTime<Utc>,
    ) -> Result<Option<Record<S>>, DatabaseError> {
        tokio::time::sleep(self.delay).await;
        self.inner.update(id, patch, now).await
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        RecordStore::<S>::ping(&self.inner).await
    }
}
