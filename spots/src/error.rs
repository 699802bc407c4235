//! Error types for payload decoding.

/// Result type alias for fallible `spots` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding or encoding component payloads.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The payload is not valid JSON or does not match the model shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload object has no array under the expected key.
    #[error("payload has no '{0}' array")]
    MissingKey(String),

    /// The payload is valid JSON but not an object.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl Error {
    /// Create a missing-key error.
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey(key.into())
    }

    /// Create an invalid-payload error.
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload(message.into())
    }
}
