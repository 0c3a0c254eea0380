//! Error taxonomy for export runs.
//!
//! Every failure is terminal for the run: the CLI reports it once and exits
//! with a kind-specific code. There are no retries and no partial documents —
//! a half-populated export would mislead downstream consumers.

use std::path::PathBuf;

use thiserror::Error;

/// Failures an export run can end with.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The data source could not be reached or refused authentication.
    #[error("cannot connect to the database: {0}")]
    Connection(#[source] sqlx::Error),

    /// A query failed — in practice a missing or renamed table/column,
    /// i.e. the local schema expectations no longer match the source.
    #[error("query against {table} failed: {source}")]
    Query {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// The finished document could not be encoded as JSON.
    #[error("cannot encode the export document: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The finished document could not be written to its destination.
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// Process exit code for this error kind. Callers use these to let
    /// wrapping scripts distinguish "database down" from "schema drift"
    /// from "disk full".
    pub fn exit_code(&self) -> i32 {
        match self {
            ExportError::Connection(_) => 2,
            ExportError::Query { .. } => 3,
            ExportError::Serialization(_) | ExportError::Write { .. } => 4,
        }
    }
}
