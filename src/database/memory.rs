use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{DatabaseError, RecordStore};
use crate::auth::is_visible;
use crate::resource::{merge, Record, Schema};

/// In-process table used for tests and database-less runs
pub struct MemoryStore<S> {
    inner: RwLock<Table<S>>,
}

struct Table<S> {
    next_id: i32,
    rows: BTreeMap<i32, Record<S>>,
}

impl<S> MemoryStore<S> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Table {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }
}

impl<S> Default for MemoryStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S: Schema> RecordStore<S> for MemoryStore<S> {
    async fn list(&self, include_archived: bool) -> Result<Vec<Record<S>>, DatabaseError> {
        let table = self.inner.read().await;
        Ok(table
            .rows
            .values()
            .filter(|r| is_visible(*r, include_archived))
            .cloned()
            .collect())
    }

    async fn insert(&self, fields: &S) -> Result<Record<S>, DatabaseError> {
        let mut table = self.inner.write().await;
        let id = table.next_id;
        table.next_id += 1;

        let now = Utc::now();
        let record = Record {
            id,
            created_at: now,
            updated_at: now,
            fields: fields.clone(),
        };
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: i32,
        patch: &S::Patch,
        now: DateTime<Utc>,
    ) -> Result<Option<Record<S>>, DatabaseError> {
        // The merge runs while the write lock is held
        let mut table = self.inner.write().await;
        Ok(table.rows.get_mut(&id).map(|row| {
            *row = merge(row, patch, now);
            row.clone()
        }))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
