//! Structured references and repository names.

use std::fmt;
use std::str::FromStr;

use cis_types::Digest;

use crate::error::{ReferenceError, Result};
use crate::grammar::{is_domain, is_path_component, is_tag, looks_like_domain, NAME_MAX_LEN};

/// A repository name with no tag or digest, e.g. `registry.local/team/app`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Repository {
    domain: Option<String>,
    path: String,
}

impl Repository {
    /// The registry domain, if the name carries one.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// The slash-separated repository path without the domain.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The full repository name, domain included.
    pub fn name(&self) -> String {
        match &self.domain {
            Some(domain) => format!("{domain}/{}", self.path),
            None => self.path.clone(),
        }
    }

    /// Qualify this repository with a digest: `name@digest`.
    pub fn with_digest(&self, digest: Digest) -> Named {
        Named {
            repository: self.clone(),
            tag: None,
            digest: Some(digest),
        }
    }

    /// Qualify this repository with a tag: `name:tag`.
    pub fn with_tag(&self, tag: &str) -> Result<Named> {
        if !is_tag(tag) {
            return Err(ReferenceError::InvalidTag {
                name: self.name(),
                tag: tag.to_string(),
            });
        }
        Ok(Named {
            repository: self.clone(),
            tag: Some(tag.to_string()),
            digest: None,
        })
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(domain) = &self.domain {
            write!(f, "{domain}/")?;
        }
        f.write_str(&self.path)
    }
}

/// A parsed reference: a repository with an optional tag and digest.
///
/// The `Display` form is the canonical string stored as an image name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Named {
    repository: Repository,
    tag: Option<String>,
    digest: Option<Digest>,
}

impl Named {
    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&Digest> {
        self.digest.as_ref()
    }

    /// Drop the tag and digest, keeping only the repository name.
    pub fn trim(&self) -> Repository {
        self.repository.clone()
    }

    /// Returns `true` if the reference is digest-qualified and carries no tag.
    pub fn is_canonical(&self) -> bool {
        self.tag.is_none() && self.digest.is_some()
    }
}

impl fmt::Display for Named {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repository)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{tag}")?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}

impl FromStr for Named {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

/// Parse a reference string into a [`Named`] reference.
///
/// # Examples
///
/// ```
/// use cis_reference::parse;
///
/// let named = parse("registry.local:5000/team/app:v1").unwrap();
/// assert_eq!(named.repository().domain(), Some("registry.local:5000"));
/// assert_eq!(named.repository().path(), "team/app");
/// assert_eq!(named.tag(), Some("v1"));
/// assert!(parse("Team/App").is_err());
/// ```
pub fn parse(s: &str) -> Result<Named> {
    if s.is_empty() {
        return Err(ReferenceError::Empty);
    }

    let (remainder, digest) = match s.split_once('@') {
        Some((remainder, digest)) => {
            let digest = Digest::parse(digest).map_err(|source| ReferenceError::InvalidDigest {
                name: s.to_string(),
                source,
            })?;
            (remainder, Some(digest))
        }
        None => (s, None),
    };

    // A ':' after the last '/' separates the tag; earlier ones belong to a port.
    let last_slash = remainder.rfind('/');
    let (name, tag) = match remainder.rfind(':') {
        Some(colon) if last_slash.map_or(true, |slash| colon > slash) => {
            (&remainder[..colon], Some(&remainder[colon + 1..]))
        }
        _ => (remainder, None),
    };

    if name.len() > NAME_MAX_LEN {
        return Err(ReferenceError::NameTooLong {
            name: name.to_string(),
            max: NAME_MAX_LEN,
        });
    }

    let repository = parse_repository(name)?;

    if let Some(tag) = tag {
        if !is_tag(tag) {
            return Err(ReferenceError::InvalidTag {
                name: s.to_string(),
                tag: tag.to_string(),
            });
        }
    }

    Ok(Named {
        repository,
        tag: tag.map(str::to_string),
        digest,
    })
}

fn parse_repository(name: &str) -> Result<Repository> {
    let (domain, path) = match name.split_once('/') {
        Some((first, rest)) if looks_like_domain(first) => (Some(first), rest),
        _ => (None, name),
    };

    if let Some(domain) = domain {
        if !is_domain(domain) {
            return Err(ReferenceError::InvalidDomain {
                name: name.to_string(),
                domain: domain.to_string(),
            });
        }
    }

    if path.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(ReferenceError::Uppercase {
            name: name.to_string(),
        });
    }

    for component in path.split('/') {
        if !is_path_component(component) {
            return Err(ReferenceError::InvalidComponent {
                name: name.to_string(),
                component: component.to_string(),
            });
        }
    }

    Ok(Repository {
        domain: domain.map(str::to_string),
        path: path.to_string(),
    })
}
