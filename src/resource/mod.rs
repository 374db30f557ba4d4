pub mod author;
pub mod merge;
pub mod post;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, Row};
use std::fmt::Debug;

pub use author::{Author, AuthorFields, AuthorPatch};
pub use merge::merge;
pub use post::{Post, PostFields, PostPatch};

/// Errors raised while turning a decoded payload into a storable record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),
}

/// A value bound into SQL for one mutable column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(Option<String>),
    Int(Option<i32>),
    Bool(bool),
}

/// The per-resource half of a record: everything a caller may write.
///
/// `Record<S>` adds the server-assigned identity and timestamps, so handlers
/// and stores are written once against this trait and reused for every table.
pub trait Schema:
    Clone + Debug + Serialize + Send + Sync + Unpin + for<'r> FromRow<'r, PgRow> + 'static
{
    /// Inbound partial payload; every field is optional.
    type Patch: DeserializeOwned + Debug + Default + Send + Sync;

    /// Singular name used in logs and error messages.
    const KIND: &'static str;
    const TABLE: &'static str;
    /// Mutable columns, in the order `column_values` produces them.
    const COLUMNS: &'static [&'static str];

    /// Validate a create payload and fill defaults.
    fn from_patch(patch: Self::Patch) -> Result<Self, ValidationError>;

    /// Merge a partial payload over the current field values.
    fn apply(&mut self, patch: &Self::Patch);

    fn archived(&self) -> bool;

    fn column_values(&self) -> Vec<ColumnValue>;
}

/// A stored row: server-assigned id and timestamps plus the schema fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<S> {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: S,
}

impl<S: Schema> Record<S> {
    pub fn archived(&self) -> bool {
        self.fields.archived()
    }
}

impl<'r, S> FromRow<'r, PgRow> for Record<S>
where
    S: FromRow<'r, PgRow>,
{
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let created_at: DateTime<Utc> = row.try_get("date_created")?;
        // Rows written before updates were stamped on insert carry a null here
        let updated_at: Option<DateTime<Utc>> = row.try_get("date_updated")?;

        Ok(Self {
            id: row.try_get("id")?,
            created_at,
            updated_at: updated_at.unwrap_or(created_at),
            fields: S::from_row(row)?,
        })
    }
}

/// Empty strings are stored as null for optional text columns
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Zero is never a valid reference id
pub(crate) fn non_zero(value: Option<i32>) -> Option<i32> {
    value.filter(|&id| id != 0)
}
