//! Error types for the core crate.

use crate::view::Field;
use snipstash_storage::StorageError;
use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The startup probe could not reach the store.
    #[error("connection probe failed: {0}")]
    Probe(#[source] StorageError),

    /// A mutating operation was attempted without a successful probe.
    #[error("not connected to the document store")]
    NotConnected,

    /// Input rejected before any store call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A create/query/delete request failed.
    #[error("store error: {0}")]
    Store(#[from] StorageError),

    /// The user declined a confirmation. Not a failure.
    #[error("cancelled")]
    Aborted,

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Whether this is the user backing out rather than something failing.
    pub fn is_aborted(&self) -> bool {
        matches!(self, CoreError::Aborted)
    }
}

/// Missing required input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a date.")]
    MissingDate,

    #[error("Please enter some code.")]
    MissingCode,
}

impl ValidationError {
    /// Status banner title.
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::MissingDate => "Missing Date",
            ValidationError::MissingCode => "Missing Code",
        }
    }

    /// The input that needs attention.
    pub fn field(&self) -> Field {
        match self {
            ValidationError::MissingDate => Field::Date,
            ValidationError::MissingCode => Field::Code,
        }
    }
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid JSON/JSONC syntax.
    #[error("invalid config at {path}: {message}")]
    InvalidJson { path: String, message: String },

    /// Config validation failed.
    #[error("config validation failed: {message}")]
    Validation { message: String },

    /// Environment variable not found during substitution.
    #[error("environment variable not found: {name}")]
    EnvVarNotFound { name: String },

    /// File reference not found during substitution.
    #[error("file reference not found: {path}")]
    FileRefNotFound { path: String },

    /// Unknown backend name.
    #[error("unknown backend: {0} (expected memory, json or firestore)")]
    UnknownBackend(String),

    /// Invalid path (e.g., could not determine data directory).
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
