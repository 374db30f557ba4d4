use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::merge;
use super::{non_empty, non_zero, ColumnValue, Record, Schema, ValidationError};

pub type Author = Record<AuthorFields>;

/// Writable columns of the `authors` table
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuthorFields {
    pub name: String,
    pub bio: Option<String>,
    #[sqlx(rename = "image")]
    pub image_id: Option<i32>,
    pub archived: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthorPatch {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image_id: Option<i32>,
    pub archived: Option<bool>,
}

impl Schema for AuthorFields {
    type Patch = AuthorPatch;

    const KIND: &'static str = "author";
    const TABLE: &'static str = "authors";
    const COLUMNS: &'static [&'static str] = &["name", "bio", "image", "archived"];

    fn from_patch(patch: AuthorPatch) -> Result<Self, ValidationError> {
        let name = non_empty(patch.name).ok_or(ValidationError::MissingRequiredField("name"))?;

        Ok(Self {
            name,
            bio: non_empty(patch.bio),
            image_id: non_zero(patch.image_id),
            archived: patch.archived.unwrap_or(false),
        })
    }

    fn apply(&mut self, patch: &AuthorPatch) {
        merge::text(&mut self.name, patch.name.as_deref());
        merge::optional_text(&mut self.bio, patch.bio.as_deref());
        merge::optional_reference(&mut self.image_id, patch.image_id);
        merge::flag(&mut self.archived, patch.archived);
    }

    fn archived(&self) -> bool {
        self.archived
    }

    fn column_values(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::Text(Some(self.name.clone())),
            ColumnValue::Text(self.bio.clone()),
            ColumnValue::Int(self.image_id),
            ColumnValue::Bool(self.archived),
        ]
    }
}
