//! Error types for reference parsing.

use thiserror::Error;

/// Errors that can occur while parsing a reference.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    /// The reference string is empty.
    #[error("reference must not be empty")]
    Empty,

    /// The repository name exceeds the maximum length.
    #[error("repository name must not exceed {max} characters: {name}")]
    NameTooLong { name: String, max: usize },

    /// The repository name contains uppercase characters.
    #[error("repository name must be lowercase: {name}")]
    Uppercase { name: String },

    /// A path component does not match the component grammar.
    #[error("invalid path component {component:?} in {name}")]
    InvalidComponent { name: String, component: String },

    /// The domain part is malformed.
    #[error("invalid domain {domain:?} in {name}")]
    InvalidDomain { name: String, domain: String },

    /// The tag does not match the tag grammar.
    #[error("invalid tag {tag:?} in {name}")]
    InvalidTag { name: String, tag: String },

    /// The digest part is malformed.
    #[error("invalid digest in {name}: {source}")]
    InvalidDigest {
        name: String,
        #[source]
        source: cis_types::TypeError,
    },
}

/// Convenience type alias for reference operations.
pub type Result<T> = std::result::Result<T, ReferenceError>;
