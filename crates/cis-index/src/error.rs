//! Error types for image index operations.

use std::fmt;

use thiserror::Error;

/// Errors that can occur during image index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// No image is stored under this name.
    #[error("image not found: {name}")]
    NotFound { name: String },

    /// An image is already stored under this name.
    #[error("image already exists: {name}")]
    AlreadyExists { name: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from a file-backed index.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend cannot serve requests (poisoned lock, lost connection).
    #[error("index unavailable: {0}")]
    Unavailable(String),
}

impl IndexError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, IndexError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, IndexError::AlreadyExists { .. })
    }
}

impl From<serde_json::Error> for IndexError {
    fn from(e: serde_json::Error) -> Self {
        IndexError::Serialization(e.to_string())
    }
}

/// The index operation an error came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexOp {
    Create,
    Get,
    Delete,
    List,
}

impl fmt::Display for IndexOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexOp::Create => "create",
            IndexOp::Get => "get",
            IndexOp::Delete => "delete",
            IndexOp::List => "list",
        })
    }
}

/// Convenience type alias for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
