//! Foundation types for the content image store (CIS).
//!
//! Every other CIS crate depends on `cis-types`.
//!
//! # Key Types
//!
//! - [`Digest`] — Algorithm-qualified content hash (`sha256:...`)
//! - [`Descriptor`] — Immutable `(media type, digest, size)` triple naming stored content
//! - [`ImageId`] — Opaque image identifier resolved to a descriptor by the image service

pub mod descriptor;
pub mod digest;
pub mod error;

pub use descriptor::{media_types, Descriptor, ImageId};
pub use digest::{Algorithm, Digest};
pub use error::TypeError;
