use thiserror::Error;

/// All possible errors in the platform
#[derive(Error, Debug)]
pub enum RentRadarError {
    #[error("connection error at {path}: {source}")]
    Connection {
        path: String,
        source: rusqlite::Error,
    },

    #[error("database at {0} is closed")]
    Closed(String),

    #[error("query failed: {source}")]
    Query {
        sql: String,
        source: rusqlite::Error,
    },

    #[error("no such table: {0}")]
    UnknownTable(String),

    #[error("cannot load an empty batch into table {0}")]
    EmptyBatch(String),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    InvalidArguments(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RentRadarError>;
