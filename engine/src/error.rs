use thiserror::Error;

/// Errors surfaced by index building, query parsing and snapshot exchange.
#[derive(Debug, Error)]
pub enum Error {
    /// A document in the build batch was rejected; the build is aborted.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    /// Engine configuration is unusable (bad weight, duplicate field, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The query has no usable clause left to rank by.
    #[error("query has no usable clauses")]
    EmptyQuery,
    /// Snapshot was produced by a different configuration or format.
    #[error("incompatible snapshot: {0}")]
    IncompatibleSnapshot(String),
    /// The build was cancelled before the new index was published.
    #[error("index build cancelled")]
    Cancelled,
    /// The document store script could not be read.
    #[error("malformed document store: {0}")]
    Store(String),
    #[error("failed to encode snapshot: {0}")]
    Encode(bincode::Error),
    #[error("failed to decode snapshot: {0}")]
    Decode(bincode::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
