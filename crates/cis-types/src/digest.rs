//! Algorithm-qualified content digests (`algorithm:hex`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256, Sha512};

use crate::error::TypeError;

/// Hash algorithm component of a [`Digest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    Sha256,
    Sha512,
    Blake3,
}

impl Algorithm {
    /// The algorithm identifier as it appears before the `:` separator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha512 => "sha512",
            Algorithm::Blake3 => "blake3",
        }
    }

    /// Number of lowercase hex characters in an encoded hash.
    pub fn encoded_len(&self) -> usize {
        match self {
            Algorithm::Sha256 | Algorithm::Blake3 => 64,
            Algorithm::Sha512 => 128,
        }
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Algorithm::Sha256 => Sha256::digest(data).to_vec(),
            Algorithm::Sha512 => Sha512::digest(data).to_vec(),
            Algorithm::Blake3 => blake3::hash(data).as_bytes().to_vec(),
        }
    }
}

impl FromStr for Algorithm {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(Algorithm::Sha256),
            "sha512" => Ok(Algorithm::Sha512),
            "blake3" => Ok(Algorithm::Blake3),
            other => Err(TypeError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content digest: the primary immutable identity of stored content.
///
/// A digest is an algorithm paired with the lowercase hex encoding of the
/// content hash, rendered as `algorithm:encoded` (e.g. `sha256:9f86d0...`).
/// Identical content always produces the same digest.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest {
    algorithm: Algorithm,
    encoded: String,
}

impl Digest {
    /// Compute the digest of `data` with the given algorithm.
    pub fn from_bytes(algorithm: Algorithm, data: &[u8]) -> Self {
        Self {
            algorithm,
            encoded: hex::encode(algorithm.hash(data)),
        }
    }

    /// Compute the canonical `sha256` digest of `data`.
    pub fn sha256(data: &[u8]) -> Self {
        Self::from_bytes(Algorithm::Sha256, data)
    }

    /// Parse and validate a digest string of the form `algorithm:encoded`.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let (alg, encoded) = s.split_once(':').ok_or_else(|| TypeError::InvalidDigest {
            digest: s.to_string(),
            reason: "missing ':' separator".into(),
        })?;
        let algorithm: Algorithm = alg.parse()?;

        if encoded.len() != algorithm.encoded_len() {
            return Err(TypeError::InvalidDigest {
                digest: s.to_string(),
                reason: format!(
                    "expected {} hex characters, got {}",
                    algorithm.encoded_len(),
                    encoded.len()
                ),
            });
        }
        if !encoded
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(TypeError::InvalidDigest {
                digest: s.to_string(),
                reason: "encoded hash must be lowercase hex".into(),
            });
        }

        Ok(Self {
            algorithm,
            encoded: encoded.to_string(),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The hex-encoded hash without the algorithm prefix.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Short form used in log lines (first 12 hex characters).
    pub fn short(&self) -> &str {
        &self.encoded[..12]
    }

    /// Verify that `data` hashes to this digest.
    pub fn verify(&self, data: &[u8]) -> bool {
        Self::from_bytes(self.algorithm, data) == *self
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({}:{})", self.algorithm, self.short())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.encoded)
    }
}

impl FromStr for Digest {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Digest {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.to_string()
    }
}
