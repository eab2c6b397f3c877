//! Errors for content types.

use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid digest {digest:?}: {reason}")]
    InvalidDigest { digest: String, reason: String },

    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),
}
