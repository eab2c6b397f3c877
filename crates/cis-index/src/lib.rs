//! Image index for the content image store.
//!
//! The index maps image names (reference strings) to content descriptors.
//! It is the only shared mutable state in the image service: every name is
//! a primary key, and each single-key operation is atomic. There is no
//! transaction spanning several keys, so callers that touch more than one
//! name must recover idempotently from every interleaving.
//!
//! # Modules
//!
//! - [`error`] — [`IndexError`] and the [`IndexOp`] that failed
//! - [`types`] — The stored [`Image`] entry
//! - [`labels`] — Well-known label keys
//! - [`traits`] — The [`ImageIndex`] trait
//! - [`memory`] — [`InMemoryImageIndex`] for tests and embedding
//! - [`fs`] — [`FsImageIndex`], one JSON file per name
//! - [`config`] — [`IndexConfig`] backend selection

pub mod config;
pub mod error;
pub mod fs;
pub mod labels;
pub mod memory;
pub mod traits;
pub mod types;

pub use config::IndexConfig;
pub use error::{IndexError, IndexOp, IndexResult};
pub use fs::FsImageIndex;
pub use memory::InMemoryImageIndex;
pub use traits::ImageIndex;
pub use types::Image;
