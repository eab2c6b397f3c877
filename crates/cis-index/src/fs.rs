//! File-backed image index.
//!
//! Each entry is a JSON file under the index root, named by the sha256 of
//! the image name. The filesystem supplies the per-name atomicity:
//!
//! - `create` writes a temp file and links it into place with a no-clobber
//!   rename, so an existing entry is never overwritten and a reader never
//!   sees a partial file.
//! - `delete` is a single unlink.
//! - `list_by_digest` scans the directory and is not atomic with anything.

use std::io::{self, Write};
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use cis_types::Digest;

use crate::error::{IndexError, IndexResult};
use crate::traits::ImageIndex;
use crate::types::Image;

const ENTRY_EXTENSION: &str = "json";
const TMP_PREFIX: &str = ".tmp-";

/// An [`ImageIndex`] persisted as one file per image name.
#[derive(Clone, Debug)]
pub struct FsImageIndex {
    root: PathBuf,
}

impl FsImageIndex {
    /// Open (creating if needed) an index rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> IndexResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened filesystem image index");
        Ok(Self { root })
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        let key = Digest::sha256(name.as_bytes());
        self.root.join(format!("{}.{ENTRY_EXTENSION}", key.encoded()))
    }
}

fn not_found_or_io(e: io::Error, name: &str) -> IndexError {
    if e.kind() == io::ErrorKind::NotFound {
        IndexError::NotFound {
            name: name.to_string(),
        }
    } else {
        IndexError::Io(e)
    }
}

#[async_trait]
impl ImageIndex for FsImageIndex {
    async fn create(&self, mut image: Image) -> IndexResult<Image> {
        let now = Utc::now();
        image.created_at = now;
        image.updated_at = now;

        let bytes = serde_json::to_vec_pretty(&image)?;
        let root = self.root.clone();
        let path = self.entry_path(&image.name);

        tokio::task::spawn_blocking(move || -> IndexResult<Image> {
            let mut tmp = tempfile::Builder::new()
                .prefix(TMP_PREFIX)
                .tempfile_in(&root)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;

            match tmp.persist_noclobber(&path) {
                Ok(_) => Ok(image),
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                    Err(IndexError::AlreadyExists { name: image.name })
                }
                Err(e) => Err(IndexError::Io(e.error)),
            }
        })
        .await
        .map_err(|e| IndexError::Unavailable(format!("blocking write failed: {e}")))?
    }

    async fn get(&self, name: &str) -> IndexResult<Image> {
        let bytes = tokio::fs::read(self.entry_path(name))
            .await
            .map_err(|e| not_found_or_io(e, name))?;
        let image: Image = serde_json::from_slice(&bytes)?;
        Ok(image)
    }

    async fn delete(&self, name: &str) -> IndexResult<()> {
        tokio::fs::remove_file(self.entry_path(name))
            .await
            .map_err(|e| not_found_or_io(e, name))
    }

    async fn list_by_digest(&self, digest: &Digest) -> IndexResult<Vec<Image>> {
        let mut matching = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.root).await?;

        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }

            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                // Deleted between the directory scan and the read.
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(IndexError::Io(e)),
            };
            let image: Image = match serde_json::from_slice(&bytes) {
                Ok(image) => image,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable index entry");
                    continue;
                }
            };
            if image.digest() == digest {
                matching.push(image);
            }
        }

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
            .with_label(crate::labels::IMAGE_NAME, name)
    }

    #[tokio::test]
    async fn create_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let index = FsImageIndex::open(dir.path()).unwrap();

        let stored = index.create(image("app:v1", b"a")).await.unwrap();
        let read = index.get("app:v1").await.unwrap();
        assert_eq!(read, stored);

        index.delete("app:v1").await.unwrap();
        assert!(index.get("app:v1").await.unwrap_err().is_not_found());
        assert!(index.delete("app:v1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn create_never_clobbers() {
        let dir = tempfile::tempdir().unwrap();
        let index = FsImageIndex::open(dir.path()).unwrap();

        index.create(image("app:v1", b"a")).await.unwrap();
        let err = index.create(image("app:v1", b"b")).await.unwrap_err();
        assert!(err.is_already_exists(), "expected AlreadyExists, got: {err}");

        let read = index.get("app:v1").await.unwrap();
        assert_eq!(read.digest(), &Digest::sha256(b"a"));
    }

    #[tokio::test]
    async fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let index = FsImageIndex::open(dir.path()).unwrap();
            index.create(image("app:v1", b"a")).await.unwrap();
        }
        let reopened = FsImageIndex::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get("app:v1").await.unwrap().digest(),
            &Digest::sha256(b"a")
        );
    }

    #[tokio::test]
    async fn list_by_digest_ignores_stray_files() {
        let dir = tempfile::tempdir().unwrap();
        let index = FsImageIndex::open(dir.path()).unwrap();
        index.create(image("app:v2", b"shared")).await.unwrap();
        index.create(image("app:v1", b"shared")).await.unwrap();
        index.create(image("other:v1", b"other")).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"not an entry").unwrap();
        std::fs::write(dir.path().join("broken.json"), b"{").unwrap();

        let listed = index
            .list_by_digest(&Digest::sha256(b"shared"))
            .await
            .unwrap();
        let names: Vec<&str> = listed.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["app:v1", "app:v2"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_produce_one_entry() {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(FsImageIndex::open(dir.path()).unwrap());

        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let index = Arc::clone(&index);
                tokio::spawn(async move { index.create(image("app:v1", &[i])).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) => assert!(e.is_already_exists(), "unexpected error: {e}"),
            }
        }
        assert_eq!(created, 1);

        // No temp files are left behind.
        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(TMP_PREFIX))
            .count();
        assert_eq!(leftovers, 0);
    }
}
