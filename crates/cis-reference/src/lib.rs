//! Image reference syntax for the content image store.
//!
//! A reference names content in the image index. It has the shape
//! `[domain/]path[:tag][@digest]`, for example `registry.local:5000/team/app:v1`
//! or `app@sha256:...`. References are stored exactly as written; no default
//! registry or namespace is ever filled in.
//!
//! # Modules
//!
//! - [`error`] — [`ReferenceError`] for malformed references
//! - [`named`] — [`Named`] references, [`Repository`] names and [`parse`]
//! - [`grammar`] — Component, domain and tag validation

pub mod error;
pub mod grammar;
pub mod named;

pub use error::{ReferenceError, Result};
pub use named::{parse, Named, Repository};
