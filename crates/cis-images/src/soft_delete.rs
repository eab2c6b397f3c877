//! Reachability-preserving removal of an image name.
//!
//! Removing a name must never leave its content without any name at all.
//! If the entry being removed is the only one pointing at its digest, a
//! dangling entry named `repository@digest` is created first; only then is
//! the original name deleted.
//!
//! The sequence is list, create dangling, delete. It touches several keys of
//! an index that only offers per-key atomicity, so each step tolerates the
//! outcomes a concurrent caller can produce:
//!
//! - the dangling entry already exists: another displacement created it
//! - the original name is already gone: another caller deleted it
//!
//! An entry already named `repository@digest` that is the last reference to
//! its digest is its own dangling entry; removing it is a no-op.
//!
//! Cardinality is read once, before any mutation, and not re-checked. A
//! concurrent retag between the list and the delete can leave a redundant
//! dangling entry, or briefly a digest with no name until the next
//! displacement touches it.

use std::collections::BTreeMap;
use std::sync::Arc;

use cis_index::{Image, ImageIndex, IndexOp};
use cis_reference::Named;
use tracing::{debug, error};

use crate::error::{ImageError, ImageResult};

/// Derive the dangling entry that keeps `image`'s content reachable.
///
/// The name is `reference` with its tag dropped and `image`'s digest
/// appended; the target is unchanged; `name_labels` are removed since they
/// describe the name being given up.
pub fn dangling_image(image: &Image, reference: &Named, name_labels: &[String]) -> Image {
    let name = reference.trim().with_digest(image.digest().clone()).to_string();
    let labels: BTreeMap<String, String> = image
        .labels
        .iter()
        .filter(|(key, _)| !name_labels.contains(*key))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Image {
        name,
        target: image.target.clone(),
        labels,
        created_at: image.created_at,
        updated_at: image.updated_at,
    }
}

/// The commit phase of removing an image name.
///
/// Once built, a `SoftDelete` can only be committed. [`commit`](Self::commit)
/// runs the sequence on its own task: dropping the future returned by
/// `commit` detaches from the task instead of interrupting it, so a caller
/// that gives up mid-way never leaves content unreachable. Callers that want
/// to honour cancellation must do so before constructing one.
pub struct SoftDelete {
    index: Arc<dyn ImageIndex>,
    image: Image,
    name_labels: Arc<[String]>,
}

impl std::fmt::Debug for SoftDelete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftDelete")
            .field("name", &self.image.name)
            .field("digest", self.image.digest())
            .finish()
    }
}

impl SoftDelete {
    pub fn new(index: Arc<dyn ImageIndex>, image: Image, name_labels: Arc<[String]>) -> Self {
        Self {
            index,
            image,
            name_labels,
        }
    }

    /// Run the removal to completion.
    ///
    /// Must be called within a Tokio runtime.
    pub async fn commit(self) -> ImageResult<()> {
        let name = self.image.name.clone();
        let digest = self.image.digest().clone();

        match tokio::spawn(self.run()).await {
            Ok(result) => result,
            Err(e) => {
                error!(name = %name, digest = %digest, error = %e, "soft delete task did not complete");
                Err(ImageError::Unknown {
                    name,
                    digest,
                    reason: format!("soft delete task did not complete: {e}"),
                })
            }
        }
    }

    async fn run(self) -> ImageResult<()> {
        let image = &self.image;
        let name = image.name.as_str();
        let digest = image.digest();

        let reference: Named = cis_reference::parse(name).map_err(|source| {
            debug!(name, digest = %digest, error = %source, "image name is not a valid reference");
            ImageError::InvalidParameter {
                name: name.to_string(),
                digest: digest.clone(),
                source,
            }
        })?;

        let holders = self.index.list_by_digest(digest).await.map_err(|source| {
            error!(name, digest = %digest, error = %source, "failed to list images targeting digest");
            ImageError::System {
                op: IndexOp::List,
                name: name.to_string(),
                digest: digest.clone(),
                source,
            }
        })?;

        // Last name pointing at this content: keep it reachable by digest.
        if holders.len() == 1 {
            let dangling = dangling_image(image, &reference, &self.name_labels);
            let dangling_name = dangling.name.clone();

            if dangling_name == name {
                debug!(name, digest = %digest, "image is the last reference to its content; keeping it");
                return Ok(());
            }

            match self.index.create(dangling).await {
                Ok(_) => {
                    debug!(name, digest = %digest, dangling = %dangling_name, "created dangling image");
                }
                Err(e) if e.is_already_exists() => {
                    debug!(name, digest = %digest, dangling = %dangling_name, "dangling image already exists");
                }
                Err(source) => {
                    error!(
                        name,
                        digest = %digest,
                        dangling = %dangling_name,
                        error = %source,
                        "failed to create a dangling image for the image being replaced"
                    );
                    return Err(ImageError::System {
                        op: IndexOp::Create,
                        name: dangling_name,
                        digest: digest.clone(),
                        source,
                    });
                }
            }
        } else {
            debug!(name, digest = %digest, holders = holders.len(), "content still referenced; no dangling image needed");
        }

        match self.index.delete(name).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!(name, digest = %digest, "image already deleted");
                Ok(())
            }
            Err(source) => {
                error!(name, digest = %digest, error = %source, "failed to delete image which existed a moment before");
                Err(ImageError::System {
                    op: IndexOp::Delete,
                    name: name.to_string(),
                    digest: digest.clone(),
                    source,
                })
            }
        }
    }
}
