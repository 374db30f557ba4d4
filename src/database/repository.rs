use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgArguments, query::QueryAs, PgPool, Postgres};
use tracing::debug;

use super::query_builder::QueryBuilder;
use super::{DatabaseError, RecordStore};
use crate::resource::{merge, ColumnValue, Record, Schema};

/// Postgres-backed store, shared by every schema
#[derive(Clone)]
pub struct Repository {
    pool: PgPool,
}

impl Repository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl<S: Schema> RecordStore<S> for Repository {
    async fn list(&self, include_archived: bool) -> Result<Vec<Record<S>>, DatabaseError> {
        let sql = QueryBuilder::select::<S>(include_archived);
        let rows = sqlx::query_as::<_, Record<S>>(&sql)
            .fetch_all(&self.pool)
            .await?;
        debug!("Listed {} {} rows (archived included: {})", rows.len(), S::KIND, include_archived);
        Ok(rows)
    }

    async fn insert(&self, fields: &S) -> Result<Record<S>, DatabaseError> {
        let sql = QueryBuilder::insert::<S>();
        let mut q = sqlx::query_as::<_, Record<S>>(&sql);
        for value in fields.column_values() {
            q = bind_column(q, value);
        }
        let row = q.fetch_one(&self.pool).await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: i32,
        patch: &S::Patch,
        now: DateTime<Utc>,
    ) -> Result<Option<Record<S>>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let select = QueryBuilder::select_for_update::<S>();
        let existing = sqlx::query_as::<_, Record<S>>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(existing) = existing else {
            tx.rollback().await?;
            return Ok(None);
        };

        let next = merge(&existing, patch, now);
        let sql = QueryBuilder::update::<S>();
        let mut q = sqlx::query_as::<_, Record<S>>(&sql);
        for value in next.fields.column_values() {
            q = bind_column(q, value);
        }
        let row = q
            .bind(next.updated_at)
            .bind(next.id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("Updated {} {} under row lock", S::KIND, id);
        Ok(row)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn bind_column<'q, O>(
    q: QueryAs<'q, Postgres, O, PgArguments>,
    value: ColumnValue,
) -> QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
{
    match value {
        ColumnValue::Text(v) => q.bind(v),
        ColumnValue::Int(v) => q.bind(v),
        ColumnValue::Bool(v) => q.bind(v),
    }
}
