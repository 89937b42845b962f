//! Error types for event decoding.

/// Errors produced while decoding execution events.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty event line")]
    EmptyLine,
}

/// Result alias used throughout abbrev-proto.
pub type Result<T> = std::result::Result<T, Error>;
