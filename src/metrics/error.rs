use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the engagement metrics store.
pub enum MetricsError {
    /// The database file could not be opened or initialised.
    #[error("failed to open metrics database '{path}': {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A query failed.
    #[error("metrics query failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),

    /// The blocking worker running the query panicked or was cancelled.
    #[error("metrics worker failed: {0}")]
    WorkerFailed(String),
}
