//! Image service configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use cis_index::labels::default_name_labels;
use cis_index::IndexConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading an [`ImagesConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot open image index: {0}")]
    Index(#[from] cis_index::IndexError),
}

/// Configuration for the image service.
///
/// ```toml
/// name_labels = ["io.containerd.image.name"]
///
/// [index]
/// backend = "filesystem"
/// root = "/var/lib/cis/index"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Where image entries are stored.
    pub index: IndexConfig,
    /// Label keys that identify an entry by name. They are stripped when an
    /// entry is preserved under its digest-qualified name.
    pub name_labels: Vec<String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            index: IndexConfig::default(),
            name_labels: default_name_labels(),
        }
    }
}

impl ImagesConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }
}
