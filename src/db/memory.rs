//! In-memory row source.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::{RowSource, Value};
use crate::error::{Error, Result};

/// In-memory catalog holding fixed column contents.
///
/// Rows are handed back in SQLite's ascending order regardless of the
/// order they were inserted in.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    columns: HashMap<(String, String), Vec<Value>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(
        mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        rows: impl IntoIterator<Item = Value>,
    ) -> Self {
        self.columns
            .insert((table.into(), column.into()), rows.into_iter().collect());
        self
    }
}

impl RowSource for MemoryCatalog {
    fn read_column(&self, table: &str, column: &str) -> Result<Vec<Value>> {
        let rows = self
            .columns
            .get(&(table.to_string(), column.to_string()))
            .ok_or_else(|| Error::Query {
                table: table.to_string(),
                column: column.to_string(),
                source: rusqlite::Error::InvalidColumnName(format!("{table}.{column}")),
            })?;

        let mut rows = rows.clone();
        rows.sort_by(sqlite_order);
        Ok(rows)
    }
}

/// NULL < numbers < text < blob, numbers compared by value.
fn sqlite_order(a: &Value, b: &Value) -> Ordering {
    fn class(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Integer(_) | Value::Real(_) => 1,
            Value::Text(_) => 2,
            Value::Blob(_) => 3,
        }
    }

    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
        (Value::Integer(x), Value::Real(y)) => (*x as f64).total_cmp(y),
        (Value::Real(x), Value::Integer(y)) => x.total_cmp(&(*y as f64)),
        (Value::Real(x), Value::Real(y)) => x.total_cmp(y),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Blob(x), Value::Blob(y)) => x.cmp(y),
        _ => class(a).cmp(&class(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_come_back_sorted() {
        let catalog = MemoryCatalog::new().with_column(
            "exif",
            "focalLength",
            vec![Value::Real(50.0), Value::Null, Value::Integer(35), Value::Real(24.5)],
        );

        let rows = catalog.read_column("exif", "focalLength").unwrap();
        assert_eq!(
            rows,
            vec![Value::Null, Value::Real(24.5), Value::Integer(35), Value::Real(50.0)]
        );
    }

    #[test]
    fn test_unknown_column() {
        let catalog = MemoryCatalog::new();
        assert!(matches!(
            catalog.read_column("exif", "focalLength"),
            Err(Error::Query { .. })
        ));
    }
}
