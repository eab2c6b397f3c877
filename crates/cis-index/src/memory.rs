//! In-memory image index for testing and ephemeral use.
//!
//! [`InMemoryImageIndex`] stores all images in a `HashMap` protected by a
//! `RwLock`. Each trait operation holds the lock for exactly one key access,
//! which gives the per-name atomicity the [`ImageIndex`] contract requires.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use cis_types::Digest;

use crate::error::{IndexError, IndexResult};
use crate::traits::ImageIndex;
use crate::types::Image;

/// An in-memory implementation of [`ImageIndex`].
///
/// All data lives in a `HashMap` behind a `RwLock`. Data is lost when the
/// index is dropped.
#[derive(Debug, Default)]
pub struct InMemoryImageIndex {
    images: RwLock<HashMap<String, Image>>,
}

impl InMemoryImageIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> IndexResult<RwLockReadGuard<'_, HashMap<String, Image>>> {
        self.images
            .read()
            .map_err(|e| IndexError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> IndexResult<RwLockWriteGuard<'_, HashMap<String, Image>>> {
        self.images
            .write()
            .map_err(|e| IndexError::Unavailable(format!("lock poisoned: {e}")))
    }

    /// Store `image` unconditionally, replacing any entry with the same name.
    pub fn insert(&self, image: Image) -> IndexResult<Option<Image>> {
        Ok(self.write()?.insert(image.name.clone(), image))
    }

    /// Remove and return the entry stored under `name`, if any.
    pub fn remove(&self, name: &str) -> IndexResult<Option<Image>> {
        Ok(self.write()?.remove(name))
    }

    /// All entries, ordered by name.
    pub fn snapshot(&self) -> IndexResult<Vec<Image>> {
        let mut images: Vec<Image> = self.read()?.values().cloned().collect();
        images.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(images)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.read().map(|images| images.len()).unwrap_or(0)
    }

    /// Returns `true` if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageIndex for InMemoryImageIndex {
    async fn create(&self, mut image: Image) -> IndexResult<Image> {
        let mut images = self.write()?;
        if images.contains_key(&image.name) {
            return Err(IndexError::AlreadyExists { name: image.name });
        }

        let now = Utc::now();
        image.created_at = now;
        image.updated_at = now;
        images.insert(image.name.clone(), image.clone());
        Ok(image)
    }

    async fn get(&self, name: &str) -> IndexResult<Image> {
        self.read()?
            .get(name)
            .cloned()
            .ok_or_else(|| IndexError::NotFound {
                name: name.to_string(),
            })
    }

    async fn delete(&self, name: &str) -> IndexResult<()> {
        match self.write()?.remove(name) {
            Some(_) => Ok(()),
            None => Err(IndexError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    async fn list_by_digest(&self, digest: &Digest) -> IndexResult<Vec<Image>> {
        let mut matching: Vec<Image> = self
            .read()?
            .values()
            .filter(|image| image.digest() == digest)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use cis_types::Descriptor;

    fn image(name: &str, content: &[u8]) -> Image {
        Image::new(name, Descriptor::for_manifest(content))
    }

    // ---- Create and get ----
    #[tokio::test]
    async fn create_and_get() {
        let index = InMemoryImageIndex::new();
        let stored = index.create(image("app:v1", b"a")).await.unwrap();

        let read = index.get("app:v1").await.unwrap();
        assert_eq!(read, stored);
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let index = InMemoryImageIndex::new();
        let err = index.get("app:nope").await.unwrap_err();
        assert!(err.is_not_found(), "expected NotFound, got: {err}");
    }

    // ---- Names are unique ----
    #[tokio::test]
    async fn create_existing_name_is_already_exists() {
        let index = InMemoryImageIndex::new();
        index.create(image("app:v1", b"a")).await.unwrap();

        let err = index.create(image("app:v1", b"b")).await.unwrap_err();
        assert!(err.is_already_exists(), "expected AlreadyExists, got: {err}");

        // The original target is untouched.
        let read = index.get("app:v1").await.unwrap();
        assert_eq!(read.digest(), &Digest::sha256(b"a"));
    }

    // ---- Delete ----
    #[tokio::test]
    async fn delete_then_get() {
        let index = InMemoryImageIndex::new();
        index.create(image("app:v1", b"a")).await.unwrap();
        index.delete("app:v1").await.unwrap();

        assert!(index.get("app:v1").await.unwrap_err().is_not_found());
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let index = InMemoryImageIndex::new();
        let err = index.delete("app:ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }

    // ---- List by digest ----
    #[tokio::test]
    async fn list_by_digest_filters_and_sorts() {
        let index = InMemoryImageIndex::new();
        index.create(image("app:v2", b"shared")).await.unwrap();
        index.create(image("app:v1", b"shared")).await.unwrap();
        index.create(image("other:v1", b"other")).await.unwrap();

        let listed = index
            .list_by_digest(&Digest::sha256(b"shared"))
            .await
            .unwrap();
        let names: Vec<&str> = listed.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["app:v1", "app:v2"]);

        let none = index
            .list_by_digest(&Digest::sha256(b"absent"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    // ---- Sync helpers ----
    #[test]
    fn insert_replaces_and_remove_returns() {
        let index = InMemoryImageIndex::new();
        assert!(index.insert(image("app:v1", b"a")).unwrap().is_none());
        let replaced = index.insert(image("app:v1", b"b")).unwrap().unwrap();
        assert_eq!(replaced.digest(), &Digest::sha256(b"a"));

        let removed = index.remove("app:v1").unwrap().unwrap();
        assert_eq!(removed.digest(), &Digest::sha256(b"b"));
        assert!(index.remove("app:v1").unwrap().is_none());
    }

    #[test]
    fn snapshot_is_sorted() {
        let index = InMemoryImageIndex::new();
        index.insert(image("c", b"1")).unwrap();
        index.insert(image("a", b"2")).unwrap();
        index.insert(image("b", b"3")).unwrap();
        let names: Vec<String> = index
            .snapshot()
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    // ---- Per-key atomicity under contention ----
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_produce_one_entry() {
        let index = Arc::new(InMemoryImageIndex::new());

        let handles: Vec<_> = (0..16u8)
            .map(|i| {
                let index = Arc::clone(&index);
                tokio::spawn(async move { index.create(image("app:v1", &[i])).await })
            })
            .collect();

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) if e.is_already_exists() => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(conflicts, 15);
        assert_eq!(index.len(), 1);
    }
}
