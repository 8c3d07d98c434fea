use std::path::PathBuf;

/// Core error type for chanlog.
///
/// Adapter crates map their specific errors into this type so the ingest loop
/// can tell recoverable failures (decode, persistence) from fatal ones.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("could not connect to {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("undecodable chunk of {len} bytes discarded")]
    Undecodable { len: usize },

    #[error("snapshot {path}: {reason}")]
    Snapshot { path: PathBuf, reason: String },

    #[error("unknown request: {0}")]
    UnknownRequest(String),
}

pub type Result<T> = std::result::Result<T, Error>;
