//! The [`ImageIndex`] trait defining the image index interface.

use async_trait::async_trait;

use cis_types::Digest;

use crate::error::IndexResult;
use crate::types::Image;

/// Storage backend for named images.
///
/// # Atomicity contract
///
/// Every method is atomic with respect to the single name it touches:
/// two concurrent `create` calls for one name produce exactly one entry and
/// one [`IndexError::AlreadyExists`](crate::IndexError::AlreadyExists), and a
/// `delete` racing a `get` observes either the entry or its absence.
///
/// Nothing is atomic across names. In particular `list_by_digest` is a
/// point-in-time view that may be stale by the time the caller acts on it;
/// entries for the listed digest can be created or deleted concurrently.
/// Callers composing several operations must tolerate every interleaving.
#[async_trait]
pub trait ImageIndex: Send + Sync {
    /// Store `image` under `image.name` if no entry exists for that name.
    ///
    /// Returns the stored entry with index-assigned timestamps, or
    /// `AlreadyExists` if the name is taken.
    async fn create(&self, image: Image) -> IndexResult<Image>;

    /// Fetch the entry stored under `name`, or `NotFound`.
    async fn get(&self, name: &str) -> IndexResult<Image>;

    /// Remove the entry stored under `name`, or `NotFound` if there is none.
    async fn delete(&self, name: &str) -> IndexResult<()>;

    /// List every entry whose target digest equals `digest`, ordered by name.
    async fn list_by_digest(&self, digest: &Digest) -> IndexResult<Vec<Image>>;
}
