use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the relationship store.
pub enum GraphError {
    /// Could not open a connection to Neo4j.
    #[error("failed to connect to Neo4j at '{uri}': {message}")]
    ConnectionFailed { uri: String, message: String },

    /// Query execution or row streaming failed.
    #[error("graph query failed: {message}")]
    QueryFailed { message: String },

    /// A returned row did not have the expected shape.
    #[error("unexpected graph row: missing or mistyped '{field}'")]
    InvalidRow { field: &'static str },
}
