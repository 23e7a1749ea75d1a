//! Canonical JSON (RFC 8785) serialization and content fingerprints.
//!
//! Cache identity is a blake3 hash over the JCS form of a request, so
//! two requests that differ only in field order, whitespace, or number
//! formatting always collapse to the same key. The inverse also holds:
//! any semantic difference in the serialized fields yields a different
//! fingerprint.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::EaselError;

/// Serialize a value to canonical JSON (JCS).
///
/// The output has sorted object keys, no insignificant whitespace, and
/// canonical number formatting per RFC 8785.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let json_value =
        serde_json::to_value(value).context("failed to convert value to JSON for JCS emission")?;

    let canonical_bytes = serde_json_canonicalizer::to_vec(&json_value)
        .context("failed to canonicalize JSON value (JCS)")?;

    String::from_utf8(canonical_bytes).context("JCS output was not valid UTF-8")
}

/// Deterministic identity of a request: blake3 over its JCS form.
///
/// Rendered as 64 lowercase hex characters. Serializes transparently as
/// a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of any serializable value.
    pub fn of<T: Serialize>(value: &T) -> Result<Self, EaselError> {
        let canonical = canonical_json(value).map_err(|e| EaselError::FingerprintFailed {
            reason: format!("{e:#}"),
        })?;
        Ok(Self(blake3::hash(canonical.as_bytes()).to_hex().to_string()))
    }

    /// Wrap an already-computed hex digest, e.g. one read back from a
    /// persisted cache entry.
    #[must_use]
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
