//! Content descriptors and opaque image identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::digest::Digest;

/// Well-known media types for image content.
pub mod media_types {
    pub const OCI_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
}

/// Immutable description of a piece of stored content.
///
/// A descriptor is never mutated after creation. Two descriptors with the
/// same digest name the same content.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(rename = "mediaType")]
    pub media_type: String,
    pub digest: Digest,
    pub size: u64,
}

impl Descriptor {
    pub fn new(media_type: impl Into<String>, digest: Digest, size: u64) -> Self {
        Self {
            media_type: media_type.into(),
            digest,
            size,
        }
    }

    /// Describe `data` as an OCI image manifest, hashing it with sha256.
    pub fn for_manifest(data: &[u8]) -> Self {
        Self::new(
            media_types::OCI_MANIFEST,
            Digest::sha256(data),
            data.len() as u64,
        )
    }
}

/// Opaque image identifier.
///
/// The image service never interprets an `ImageId`; it is handed to the
/// content resolver which maps it to a [`Descriptor`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
