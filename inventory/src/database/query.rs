//! Variable-arity `IN` predicates with bound parameters.

use sqlx::{QueryBuilder, Sqlite};

/// `column IN (...)` over an ordered list of values.
///
/// The whole list travels as a single bound JSON array expanded by
/// `json_each`, so its length is not capped by SQLite's host parameter limit.
/// Values are never spliced into the SQL text. The column is a `'static` name
/// chosen by the DAO, never caller input. An empty list renders as the
/// statically false `1 = 0`, though DAOs short-circuit before that so an empty
/// filter never reaches the database.
#[derive(Debug, Clone, Copy)]
pub struct InList<'a> {
    column: &'static str,
    values: &'a [String],
}

impl<'a> InList<'a> {
    pub fn new(column: &'static str, values: &'a [String]) -> Self {
        Self { column, values }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Appends the predicate to `builder`.
    pub fn push_to(&self, builder: &mut QueryBuilder<'_, Sqlite>) -> Result<(), serde_json::Error> {
        if self.values.is_empty() {
            builder.push("1 = 0");
            return Ok(());
        }

        let encoded = serde_json::to_string(self.values)?;
        builder.push(self.column);
        builder.push(" IN (SELECT value FROM json_each(");
        builder.push_bind(encoded);
        builder.push("))");
        Ok(())
    }
}
