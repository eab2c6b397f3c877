//! The image service: assigning and removing image names.

use std::sync::Arc;

use cis_index::labels::default_name_labels;
use cis_index::{Image, ImageIndex, IndexOp};
use cis_reference::Named;
use cis_types::ImageId;
use tracing::{debug, error, info};

use crate::config::{ConfigError, ImagesConfig};
use crate::error::{ImageError, ImageResult};
use crate::resolver::ContentResolver;
use crate::soft_delete::SoftDelete;

/// Assigns names to content and removes them without orphaning content.
///
/// The service holds no state of its own beyond handles to the index and the
/// resolver; any number of services may share one index.
#[derive(Clone)]
pub struct ImageService {
    index: Arc<dyn ImageIndex>,
    resolver: Arc<dyn ContentResolver>,
    name_labels: Arc<[String]>,
}

impl std::fmt::Debug for ImageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageService")
            .field("name_labels", &self.name_labels)
            .finish_non_exhaustive()
    }
}

impl ImageService {
    /// Create a service stripping the default name-identity labels.
    pub fn new(index: Arc<dyn ImageIndex>, resolver: Arc<dyn ContentResolver>) -> Self {
        Self {
            index,
            resolver,
            name_labels: default_name_labels().into(),
        }
    }

    /// Replace the set of labels stripped from dangling images.
    pub fn with_name_labels(mut self, name_labels: Vec<String>) -> Self {
        self.name_labels = name_labels.into();
        self
    }

    /// Open the configured index and build a service over it.
    pub fn from_config(
        config: &ImagesConfig,
        resolver: Arc<dyn ContentResolver>,
    ) -> Result<Self, ConfigError> {
        let index = config.index.open()?;
        Ok(Self::new(index, resolver).with_name_labels(config.name_labels.clone()))
    }

    pub fn index(&self) -> &Arc<dyn ImageIndex> {
        &self.index
    }

    /// Point `reference` at the content identified by `id`.
    ///
    /// A digest-qualified `reference` must name the resolved content. If the
    /// name is taken, the image holding it is soft-deleted (see
    /// [`SoftDelete`]) and creation is retried once; a digest-qualified name
    /// already holding this content is returned as is. Dropping the returned
    /// future cancels the operation only until the displacement starts; from
    /// then on the displacement runs to completion regardless.
    pub async fn tag(&self, id: &ImageId, reference: &Named) -> ImageResult<Image> {
        let name = reference.to_string();

        let target = self
            .resolver
            .resolve(id)
            .await
            .map_err(|source| ImageError::Resolve {
                id: id.clone(),
                name: name.clone(),
                source,
            })?;
        let digest = target.digest.clone();
        if let Some(expected) = reference.digest() {
            if expected != &digest {
                debug!(name = %name, digest = %digest, expected = %expected, "content does not match the digest in the name");
                return Err(ImageError::DigestMismatch {
                    name,
                    digest,
                    expected: expected.clone(),
                });
            }
        }
        let image = Image::new(name.clone(), target);

        match self.index.create(image.clone()).await {
            Ok(created) => {
                info!(name = %name, digest = %digest, "tagged image");
                return Ok(created);
            }
            Err(e) if e.is_already_exists() => {
                debug!(name = %name, digest = %digest, "name already in use; displacing current image");
            }
            Err(source) => {
                error!(name = %name, digest = %digest, error = %source, "failed to create image");
                return Err(ImageError::System {
                    op: IndexOp::Create,
                    name,
                    digest,
                    source,
                });
            }
        }

        let replaced = match self.index.get(&name).await {
            Ok(replaced) => replaced,
            Err(e) if e.is_not_found() => {
                error!(name = %name, digest = %digest, "image vanished after reporting a conflict");
                return Err(ImageError::Unknown {
                    name,
                    digest,
                    reason: "image reported as existing could not be found".into(),
                });
            }
            Err(source) => {
                error!(name = %name, digest = %digest, error = %source, "failed to fetch conflicting image");
                return Err(ImageError::System {
                    op: IndexOp::Get,
                    name,
                    digest,
                    source,
                });
            }
        };

        // The name pins the digest, so there is nothing to displace.
        if reference.digest().is_some() && replaced.digest() == &digest {
            debug!(name = %name, digest = %digest, "image already tagged");
            return Ok(replaced);
        }

        let replaced_digest = replaced.digest().clone();
        self.soft_delete(replaced)
            .await
            .map_err(|source| ImageError::Displace {
                name: name.clone(),
                digest: replaced_digest.clone(),
                source: Box::new(source),
            })?;

        match self.index.create(image).await {
            Ok(created) => {
                info!(name = %name, digest = %digest, replaced = %replaced_digest, "retagged image");
                Ok(created)
            }
            Err(source) => {
                error!(name = %name, digest = %digest, error = %source, "failed to create image after displacing the previous one");
                Err(ImageError::System {
                    op: IndexOp::Create,
                    name,
                    digest,
                    source,
                })
            }
        }
    }

    /// Remove the name `reference`, keeping its content reachable.
    ///
    /// Returns the entry that held the name. A digest-qualified name that is
    /// the last reference to its content stays in place.
    pub async fn untag(&self, reference: &Named) -> ImageResult<Image> {
        let name = reference.to_string();
        let image = self.index.get(&name).await.map_err(|source| {
            if source.is_not_found() {
                ImageError::NotFound { name: name.clone() }
            } else {
                ImageError::Lookup {
                    name: name.clone(),
                    source,
                }
            }
        })?;

        self.soft_delete(image.clone()).await?;
        info!(name = %name, digest = %image.digest(), "untagged image");
        Ok(image)
    }

    /// Remove `image`'s name, first preserving its content under a
    /// digest-qualified name if no other name references it.
    pub async fn soft_delete(&self, image: Image) -> ImageResult<()> {
        SoftDelete::new(Arc::clone(&self.index), image, Arc::clone(&self.name_labels))
            .commit()
            .await
    }
}
