//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid collection name or document id
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The remote store could not be reached.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote store rejected the request.
    ///
    /// `code` is the store's canonical error code (`permission-denied`,
    /// `not-found`, ...); the message is kept verbatim.
    #[error("{message}")]
    Api { code: String, message: String },

    /// The remote store answered with something we could not decode.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Backend options are unusable (bad credentials format, ...).
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    /// Lock was poisoned (another thread panicked while holding the lock)
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StorageError {
    /// Create an invalid key error.
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey(message.into())
    }

    /// Create an API error.
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Canonical error code, when the store provided one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// The user-facing message for this error.
    pub fn message(&self) -> String {
        self.to_string()
    }
}
