pub mod connection;
pub mod memory;
pub mod query_builder;
pub mod repository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::resource::{Record, Schema};

pub use connection::connect;
pub use memory::MemoryStore;
pub use repository::Repository;

/// Errors from the record store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence boundary for one resource table.
///
/// The store assigns ids and creation timestamps on insert.
#[async_trait]
pub trait RecordStore<S: Schema>: Send + Sync {
    async fn list(&self, include_archived: bool) -> Result<Vec<Record<S>>, DatabaseError>;

    async fn insert(&self, fields: &S) -> Result<Record<S>, DatabaseError>;

    /// Merge `patch` over the stored row and persist it, atomically per row.
    /// `None` when no row has that id.
    async fn update(
        &self,
        id: i32,
        patch: &S::Patch,
        now: DateTime<Utc>,
    ) -> Result<Option<Record<S>>, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}
