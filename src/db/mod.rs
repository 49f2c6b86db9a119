//! Read-only access to photo catalog tables.
//!
//! Everything the pipeline needs from storage is a single-column scan, so
//! the seam is one trait method. [`SqliteCatalog`] reads a catalog file;
//! [`MemoryCatalog`] serves fixed rows for tests and embedding.

pub mod memory;
pub mod sqlite;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use memory::MemoryCatalog;
pub use rusqlite::types::Value;
pub use sqlite::SqliteCatalog;

use crate::error::{Error, Result};

/// Source of single-column row scans.
pub trait RowSource {
    /// Every value of `table.column`, ascending by the column's own ordering
    /// (NULLs first, as SQLite sorts them).
    fn read_column(&self, table: &str, column: &str) -> Result<Vec<Value>>;
}

/// A `table.column` pair to scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn read<S: RowSource + ?Sized>(&self, source: &S) -> Result<Vec<Value>> {
        source.read_column(&self.table, &self.column)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Quote a table or column name for interpolation into SQL.
pub(crate) fn quote_identifier(name: &str) -> Result<String> {
    if name.is_empty() || name.contains('\0') {
        return Err(Error::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("Adobe_images").unwrap(), "\"Adobe_images\"");
        assert_eq!(quote_identifier("odd\"name").unwrap(), "\"odd\"\"name\"");
        assert!(matches!(quote_identifier(""), Err(Error::InvalidIdentifier(_))));
        assert!(matches!(quote_identifier("a\0b"), Err(Error::InvalidIdentifier(_))));
    }

    #[test]
    fn test_column_ref_display() {
        let column = ColumnRef::new("Adobe_images", "captureTime");
        assert_eq!(column.to_string(), "Adobe_images.captureTime");
    }
}
