use crate::resource::Schema;

/// Columns every table carries in addition to the schema's own
const SYSTEM_COLUMNS: &[&str] = &["id", "date_created", "date_updated"];

/// SQL text for one schema's table. Parameters are always positional.
pub struct QueryBuilder;

impl QueryBuilder {
    fn returning<S: Schema>() -> String {
        SYSTEM_COLUMNS
            .iter()
            .chain(S::COLUMNS.iter())
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn select<S: Schema>(include_archived: bool) -> String {
        let filter = if include_archived { "" } else { " WHERE NOT \"archived\"" };
        format!(
            "SELECT {} FROM {}{} ORDER BY \"id\"",
            Self::returning::<S>(),
            quote_identifier(S::TABLE),
            filter
        )
    }

    /// Locks the row for the rest of the transaction; `$1` is the id
    pub fn select_for_update<S: Schema>() -> String {
        format!(
            "SELECT {} FROM {} WHERE \"id\" = $1 FOR UPDATE",
            Self::returning::<S>(),
            quote_identifier(S::TABLE)
        )
    }

    /// Binds the schema columns in order; timestamps come from the database clock
    pub fn insert<S: Schema>() -> String {
        let columns = S::COLUMNS
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let params = (1..=S::COLUMNS.len())
            .map(|i| format!("${}", i))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({}, \"date_created\", \"date_updated\") VALUES ({}, current_timestamp, current_timestamp) RETURNING {}",
            quote_identifier(S::TABLE),
            columns,
            params,
            Self::returning::<S>()
        )
    }

    /// Binds the schema columns, then `date_updated`, then the id
    pub fn update<S: Schema>() -> String {
        let n = S::COLUMNS.len();
        let assignments = S::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} = ${}", quote_identifier(c), i + 1))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "UPDATE {} SET {}, \"date_updated\" = ${} WHERE \"id\" = ${} RETURNING {}",
            quote_identifier(S::TABLE),
            assignments,
            n + 1,
            n + 2,
            Self::returning::<S>()
        )
    }
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
