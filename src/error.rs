//! Error taxonomy for the catalog pipeline.

use std::path::PathBuf;
use thiserror::Error;

use crate::aggregate::FormatError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The catalog file is missing, unreadable, or not a SQLite database.
    #[error("catalog unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("reading {table}.{column} failed: {source}")]
    Query {
        table: String,
        column: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("invalid table or column name {0:?}")]
    InvalidIdentifier(String),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn render(err: impl std::fmt::Display) -> Self {
        Self::Render(err.to_string())
    }
}
