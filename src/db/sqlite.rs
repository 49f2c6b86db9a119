//! SQLite catalog backend.

use rusqlite::{Connection, ErrorCode, OpenFlags};
use std::path::{Path, PathBuf};

use super::{quote_identifier, RowSource, Value};
use crate::error::{Error, Result};

/// Read-only connection to a catalog file (e.g. a Lightroom `.lrcat`).
///
/// The connection is released when this value is dropped, so every exit
/// path gives it back. [`SqliteCatalog::close`] releases it explicitly and
/// reports a failed close.
pub struct SqliteCatalog {
    conn: Connection,
    path: PathBuf,
}

impl SqliteCatalog {
    pub fn open(path: &Path) -> Result<Self> {
        let unavailable = |source: rusqlite::Error| Error::StorageUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(unavailable)?;

        // Opening is lazy; touch the header so a corrupt file fails here
        conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
            .map_err(unavailable)?;

        tracing::debug!("Opened catalog {:?}", path);
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.conn
            .close()
            .map_err(|(_, source)| Error::StorageUnavailable { path, source })
    }

    fn has_column(&self, table: &str, column: &str) -> rusqlite::Result<bool> {
        self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2 COLLATE NOCASE)",
            [table, column],
            |row| row.get(0),
        )
    }

    fn query_error(&self, table: &str, column: &str, source: rusqlite::Error) -> Error {
        if source.sqlite_error_code() == Some(ErrorCode::NotADatabase) {
            Error::StorageUnavailable {
                path: self.path.clone(),
                source,
            }
        } else {
            Error::Query {
                table: table.to_string(),
                column: column.to_string(),
                source,
            }
        }
    }
}

impl RowSource for SqliteCatalog {
    fn read_column(&self, table: &str, column: &str) -> Result<Vec<Value>> {
        // SQLite reads an unknown double-quoted column as a string literal,
        // so the scan alone would return the column name for every row
        let exists = self
            .has_column(table, column)
            .map_err(|e| self.query_error(table, column, e))?;
        if !exists {
            return Err(self.query_error(
                table,
                column,
                rusqlite::Error::InvalidColumnName(column.to_string()),
            ));
        }

        let sql = format!(
            "SELECT {col} FROM {tbl} ORDER BY {col} ASC",
            col = quote_identifier(column)?,
            tbl = quote_identifier(table)?,
        );

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| self.query_error(table, column, e))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, Value>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| self.query_error(table, column, e))?;

        tracing::debug!("Read {} rows from {}.{}", rows.len(), table, column);
        Ok(rows)
    }
}
