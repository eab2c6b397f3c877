//! Error taxonomy for image service operations.
//!
//! Every error names the image it concerns; errors raised while touching the
//! index also carry the digest involved. [`ImageError::kind`] sorts errors
//! into the coarse classes callers branch on.

use cis_index::{IndexError, IndexOp};
use cis_reference::ReferenceError;
use cis_types::{Digest, ImageId};
use thiserror::Error;

use crate::resolver::ResolveError;

/// Coarse classification of an [`ImageError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller supplied something unusable; retrying will not help.
    InvalidParameter,
    /// Required content or entry is absent.
    NotFound,
    /// The name is taken.
    AlreadyExists,
    /// The backend failed.
    System,
    /// An invariant was violated; indicates a bug or a misbehaving backend.
    Unknown,
}

impl From<&IndexError> for ErrorKind {
    fn from(err: &IndexError) -> Self {
        match err {
            IndexError::NotFound { .. } => ErrorKind::NotFound,
            IndexError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            IndexError::Serialization(_) | IndexError::Io(_) | IndexError::Unavailable(_) => {
                ErrorKind::System
            }
        }
    }
}

/// Errors from image service operations.
#[derive(Debug, Error)]
pub enum ImageError {
    /// An image name could not be parsed as a reference.
    #[error("image name {name} ({digest}) is not a valid reference: {source}")]
    InvalidParameter {
        name: String,
        digest: Digest,
        #[source]
        source: ReferenceError,
    },

    /// A digest-qualified name was given content with a different digest.
    #[error("image name {name} pins {expected} but the content is {digest}")]
    DigestMismatch {
        name: String,
        digest: Digest,
        expected: Digest,
    },

    /// The content resolver could not resolve the image to tag.
    #[error("cannot resolve image {id} for {name}: {source}")]
    Resolve {
        id: ImageId,
        name: String,
        #[source]
        source: ResolveError,
    },

    /// No image exists under the requested name.
    #[error("no such image: {name}")]
    NotFound { name: String },

    /// An index operation failed.
    #[error("failed to {op} image {name} ({digest}): {source}")]
    System {
        op: IndexOp,
        name: String,
        digest: Digest,
        #[source]
        source: IndexError,
    },

    /// Looking up an image by name failed before its target was known.
    #[error("failed to look up image {name}: {source}")]
    Lookup {
        name: String,
        #[source]
        source: IndexError,
    },

    /// The image occupying a name could not be displaced.
    #[error("failed to displace image {name} ({digest}): {source}")]
    Displace {
        name: String,
        digest: Digest,
        #[source]
        source: Box<ImageError>,
    },

    /// The index contradicted itself.
    #[error("inconsistent state for image {name} ({digest}): {reason}")]
    Unknown {
        name: String,
        digest: Digest,
        reason: String,
    },
}

impl ImageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImageError::InvalidParameter { .. } | ImageError::DigestMismatch { .. } => {
                ErrorKind::InvalidParameter
            }
            ImageError::Resolve { source, .. } => match source {
                ResolveError::NotFound { .. } => ErrorKind::NotFound,
                ResolveError::Backend(_) => ErrorKind::System,
            },
            ImageError::NotFound { .. } => ErrorKind::NotFound,
            ImageError::System { source, .. } | ImageError::Lookup { source, .. } => {
                ErrorKind::from(source)
            }
            ImageError::Displace { .. } => ErrorKind::System,
            ImageError::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// The image name the failing operation acted on.
    pub fn name(&self) -> &str {
        match self {
            ImageError::InvalidParameter { name, .. }
            | ImageError::DigestMismatch { name, .. }
            | ImageError::Resolve { name, .. }
            | ImageError::NotFound { name }
            | ImageError::System { name, .. }
            | ImageError::Lookup { name, .. }
            | ImageError::Displace { name, .. }
            | ImageError::Unknown { name, .. } => name,
        }
    }

    /// The digest involved, when the error arose against a known target.
    pub fn digest(&self) -> Option<&Digest> {
        match self {
            ImageError::InvalidParameter { digest, .. }
            | ImageError::DigestMismatch { digest, .. }
            | ImageError::System { digest, .. }
            | ImageError::Displace { digest, .. }
            | ImageError::Unknown { digest, .. } => Some(digest),
            ImageError::Resolve { .. } | ImageError::NotFound { .. } | ImageError::Lookup { .. } => {
                None
            }
        }
    }
}

/// Convenience alias for image service results.
pub type ImageResult<T> = Result<T, ImageError>;
