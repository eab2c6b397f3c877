//! The named entry stored by the image index.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cis_types::{Descriptor, Digest};

/// A named image: a reference string bound to a content descriptor.
///
/// `name` is unique across the index. `target` is immutable once the entry
/// is created; re-pointing a name means deleting the entry and creating a
/// new one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Reference string, e.g. `registry.local/app:v1` or `app@sha256:...`.
    pub name: String,
    /// The content this name points to.
    pub target: Descriptor,
    /// Free-form metadata attached at creation.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// When the index stored this entry.
    pub created_at: DateTime<Utc>,
    /// When the entry was last written.
    pub updated_at: DateTime<Utc>,
}

impl Image {
    /// Create an unstored image entry with no labels.
    pub fn new(name: impl Into<String>, target: Descriptor) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            target,
            labels: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a label, replacing any previous value for the key.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Digest of the target content.
    pub fn digest(&self) -> &Digest {
        &self.target.digest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_image_has_no_labels() {
        let image = Image::new("app:v1", Descriptor::for_manifest(b"m"));
        assert!(image.labels.is_empty());
        assert_eq!(image.created_at, image.updated_at);
        assert_eq!(image.digest(), &Digest::sha256(b"m"));
    }

    #[test]
    fn labels_survive_serde() {
        let image = Image::new("app:v1", Descriptor::for_manifest(b"m"))
            .with_label("io.containerd.image.name", "app:v1")
            .with_label("team", "infra");
        let json = serde_json::to_string(&image).unwrap();
        let parsed: Image = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, image);
    }
}
