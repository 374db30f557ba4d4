use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::merge;
use super::{non_empty, non_zero, ColumnValue, Record, Schema, ValidationError};

pub type Post = Record<PostFields>;

/// Writable columns of the `posts` table
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PostFields {
    pub title: String,
    pub short_title: Option<String>,
    pub content: Option<String>,
    #[sqlx(rename = "author")]
    pub author_id: i32,
    #[sqlx(rename = "image")]
    pub image_id: Option<i32>,
    pub archived: bool,
}

/// Partial post payload accepted by create and update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostPatch {
    pub title: Option<String>,
    pub short_title: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<i32>,
    pub image_id: Option<i32>,
    pub archived: Option<bool>,
}

impl Schema for PostFields {
    type Patch = PostPatch;

    const KIND: &'static str = "post";
    const TABLE: &'static str = "posts";
    const COLUMNS: &'static [&'static str] =
        &["title", "short_title", "content", "author", "image", "archived"];

    fn from_patch(patch: PostPatch) -> Result<Self, ValidationError> {
        let title = non_empty(patch.title).ok_or(ValidationError::MissingRequiredField("title"))?;
        let author_id =
            non_zero(patch.author_id).ok_or(ValidationError::MissingRequiredField("authorId"))?;

        Ok(Self {
            title,
            short_title: non_empty(patch.short_title),
            content: non_empty(patch.content),
            author_id,
            image_id: non_zero(patch.image_id),
            archived: patch.archived.unwrap_or(false),
        })
    }

    fn apply(&mut self, patch: &PostPatch) {
        merge::text(&mut self.title, patch.title.as_deref());
        merge::optional_text(&mut self.short_title, patch.short_title.as_deref());
        merge::optional_text(&mut self.content, patch.content.as_deref());
        merge::reference(&mut self.author_id, patch.author_id);
        merge::optional_reference(&mut self.image_id, patch.image_id);
        merge::flag(&mut self.archived, patch.archived);
    }

    fn archived(&self) -> bool {
        self.archived
    }

    fn column_values(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::Text(Some(self.title.clone())),
            ColumnValue::Text(self.short_title.clone()),
            ColumnValue::Text(self.content.clone()),
            ColumnValue::Int(Some(self.author_id)),
            ColumnValue::Int(self.image_id),
            ColumnValue::Bool(self.archived),
        ]
    }
}
