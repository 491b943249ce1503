//! Error types for the nbx client.

use thiserror::Error;

/// Result type alias using the nbx error type.
pub type Result<T> = std::result::Result<T, NbxError>;

/// Main error type for the nbx client.
#[derive(Error, Debug)]
pub enum NbxError {
    /// Resource kind identifier not present in the registry
    #[error("Unknown resource kind: {0}")]
    UnknownKind(String),

    /// Update/delete requested on a record without an `id` field
    #[error("Record \"{0}\" has no id field")]
    MissingId(String),

    /// Mutation or live load attempted on a client bound to a snapshot file
    #[error("Client is bound to a snapshot file, no backend connection")]
    Offline,

    /// Transport-level failure to reach the backend
    #[error("Connection failed: {0}")]
    Connection(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error (config or snapshot files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}
