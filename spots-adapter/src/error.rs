//! Error types for the state cache.

pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Cached bytes decoded as JSON but not as a component payload.
    #[error("payload error: {0}")]
    Payload(#[from] spots::Error),

    /// A stored blob is shorter than its expiry header.
    #[error("corrupt cache entry '{0}'")]
    Corrupt(String),
}
