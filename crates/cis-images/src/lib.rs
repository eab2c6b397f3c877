//! Image tagging for the content image store.
//!
//! This crate assigns human-readable names to content and removes them again
//! without ever silently orphaning content that a name was the last handle
//! on. It holds no state: all entries live in an [`ImageIndex`], which only
//! guarantees atomicity per name.
//!
//! # Architecture
//!
//! - [`ImageService::tag`] resolves an image id to a descriptor and creates
//!   the name. If the name is taken, the current holder is displaced and
//!   creation is retried exactly once.
//! - [`SoftDelete`] displaces a name. When the entry is the sole reference
//!   to its digest, a dangling entry `repository@digest` is created before
//!   the name is deleted. Once committed it runs to completion even if the
//!   caller stops waiting.
//! - [`ImageService::untag`] removes a single name through the same path.
//!
//! [`ImageIndex`]: cis_index::ImageIndex

pub mod config;
pub mod error;
pub mod resolver;
pub mod service;
pub mod soft_delete;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, ImagesConfig};
pub use error::{ErrorKind, ImageError, ImageResult};
pub use resolver::{ContentResolver, InMemoryResolver, ResolveError};
pub use service::ImageService;
pub use soft_delete::{dangling_image, SoftDelete};
