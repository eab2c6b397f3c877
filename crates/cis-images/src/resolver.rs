//! Resolution of opaque image identifiers to content descriptors.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use cis_types::{Descriptor, ImageId};
use thiserror::Error;

/// Errors from content resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No content is known under this identifier.
    #[error("no content for image id {id}")]
    NotFound { id: String },

    /// The resolver's backing store failed.
    #[error("resolver backend failure: {0}")]
    Backend(String),
}

/// Maps an [`ImageId`] to the descriptor of the content it identifies.
#[async_trait]
pub trait ContentResolver: Send + Sync {
    async fn resolve(&self, id: &ImageId) -> Result<Descriptor, ResolveError>;
}

/// A [`ContentResolver`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryResolver {
    descriptors: RwLock<HashMap<ImageId, Descriptor>>,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `descriptor` under `id`, replacing any previous mapping.
    pub fn insert(&self, id: ImageId, descriptor: Descriptor) -> Result<(), ResolveError> {
        self.descriptors
            .write()
            .map_err(|e| ResolveError::Backend(format!("lock poisoned: {e}")))?
            .insert(id, descriptor);
        Ok(())
    }
}

#[async_trait]
impl ContentResolver for InMemoryResolver {
    async fn resolve(&self, id: &ImageId) -> Result<Descriptor, ResolveError> {
        self.descriptors
            .read()
            .map_err(|e| ResolveError::Backend(format!("lock poisoned: {e}")))?
            .get(id)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_registered_id() {
        let resolver = InMemoryResolver::new();
        let desc = Descriptor::for_manifest(b"manifest");
        resolver.insert(ImageId::from("img-a"), desc.clone()).unwrap();

        assert_eq!(resolver.resolve(&ImageId::from("img-a")).await.unwrap(), desc);
    }

    #[tokio::test]
    async fn resolve_unknown_id() {
        let resolver = InMemoryResolver::new();
        let err = resolver.resolve(&ImageId::from("missing")).await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));
    }
}
