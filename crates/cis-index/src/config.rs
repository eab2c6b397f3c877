//! Backend selection for the image index.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::IndexResult;
use crate::fs::FsImageIndex;
use crate::memory::InMemoryImageIndex;
use crate::traits::ImageIndex;

/// Which [`ImageIndex`] backend to open.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum IndexConfig {
    /// Volatile in-process index.
    #[default]
    Memory,
    /// One JSON file per image under `root`.
    Filesystem { root: PathBuf },
}

impl IndexConfig {
    /// Open the configured backend.
    pub fn open(&self) -> IndexResult<Arc<dyn ImageIndex>> {
        Ok(match self {
            IndexConfig::Memory => Arc::new(InMemoryImageIndex::new()),
            IndexConfig::Filesystem { root } => Arc::new(FsImageIndex::open(root.clone())?),
        })
    }
}
