//! Field merge engine for partial updates.
//!
//! A partial payload only changes what it carries. Absent fields keep their
//! stored value, and so do the sentinel values a client cannot meaningfully
//! write: an empty string for text and zero for a reference id. The merge is
//! pure so it can be checked without a store.

use chrono::{DateTime, Duration, Utc};

use super::{Record, Schema};

/// Compute the next state of `existing` after applying `patch` at `now`.
///
/// `id` and `created_at` are carried over untouched. `updated_at` always
/// advances, by at least one microsecond (the store's timestamp resolution)
/// when the clock has not moved past the previous stamp.
pub fn merge<S: Schema>(existing: &Record<S>, patch: &S::Patch, now: DateTime<Utc>) -> Record<S> {
    let mut fields = existing.fields.clone();
    fields.apply(patch);

    Record {
        id: existing.id,
        created_at: existing.created_at,
        updated_at: next_stamp(existing.updated_at, now),
        fields,
    }
}

fn next_stamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + Duration::microseconds(1);
    if now < floor {
        floor
    } else {
        now
    }
}

/// Required text column: absent or empty keeps the current value.
pub fn text(current: &mut String, incoming: Option<&str>) {
    if let Some(value) = incoming.filter(|v| !v.is_empty()) {
        *current = value.to_string();
    }
}

/// Optional text column. An update cannot clear it back to null.
pub fn optional_text(current: &mut Option<String>, incoming: Option<&str>) {
    if let Some(value) = incoming.filter(|v| !v.is_empty()) {
        *current = Some(value.to_string());
    }
}

/// Required reference column: absent or zero keeps the current id.
pub fn reference(current: &mut i32, incoming: Option<i32>) {
    if let Some(id) = incoming.filter(|&id| id != 0) {
        *current = id;
    }
}

pub fn optional_reference(current: &mut Option<i32>, incoming: Option<i32>) {
    if let Some(id) = incoming.filter(|&id| id != 0) {
        *current = Some(id);
    }
}

/// Flags overwrite whenever present; `false` is a real target state.
pub fn flag(current: &mut bool, incoming: Option<bool>) {
    if let Some(value) = incoming {
        *current = value;
    }
}
