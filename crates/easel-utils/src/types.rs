//! Shared domain types for the easel pipeline.
//!
//! These types travel between the tool surface, the orchestrators, the
//! cache, and the store. They serialize to the wire names used by the
//! tool contracts (`quality`/`background` lowercase, `image_format`
//! uppercase, `dimensions` as a two-element array).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Requested generation quality tier.
///
/// `Auto` defers the choice to the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    High,
    Auto,
}

impl Quality {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Auto => "auto",
        }
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::Auto
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "auto" => Ok(Self::Auto),
            other => Err(format!(
                "unknown quality '{other}' (expected low, medium, high, or auto)"
            )),
        }
    }
}

/// Requested background treatment for generated images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    Opaque,
    Transparent,
    Auto,
}

impl Background {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opaque => "opaque",
            Self::Transparent => "transparent",
            Self::Auto => "auto",
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::Auto
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Background {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "opaque" => Ok(Self::Opaque),
            "transparent" => Ok(Self::Transparent),
            "auto" => Ok(Self::Auto),
            other => Err(format!(
                "unknown background '{other}' (expected opaque, transparent, or auto)"
            )),
        }
    }
}

/// Encoded image format of a stored artifact.
///
/// Serializes uppercase (`"PNG"`) to match the tool contract; file
/// extensions and MIME types are lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    /// Lowercase file extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
        }
    }

    /// MIME type for data URLs and HTTP payloads.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Webp => "WEBP",
        }
    }

    /// Recover the format from a file extension, e.g. when rebuilding
    /// metadata from a directory scan. `jpg` is accepted for `jpeg`.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

impl Default for ImageFormat {
    fn default() -> Self {
        Self::Png
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PNG" => Ok(Self::Png),
            "JPEG" | "JPG" => Ok(Self::Jpeg),
            "WEBP" => Ok(Self::Webp),
            other => Err(format!(
                "unknown image format '{other}' (expected PNG, JPEG, or WEBP)"
            )),
        }
    }
}

/// Pixel dimensions of a generated image.
///
/// Serialized as `[width, height]` so that tuple and list encodings of
/// the same dimensions are indistinguishable on the wire and in
/// fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(1024, 1024)
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl From<Dimensions> for (u32, u32) {
    fn from(d: Dimensions) -> Self {
        (d.width, d.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Normalized generation parameters.
///
/// An `AssetRequest` exists only to derive a fingerprint: it carries the
/// fields that define the identity of a generated artifact and nothing
/// else. Validation flags and retry limits deliberately live outside this
/// struct so they can never perturb cache keys.
///
/// Optional fields are skipped when absent so that "no style" serializes
/// identically whether the field was omitted or explicitly unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRequest {
    pub prompt: String,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub background: Background,
    #[serde(default)]
    pub dimensions: Dimensions,
    #[serde(default)]
    pub format: ImageFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,
}

/// Judge classification of an artifact against stated criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }

    #[must_use]
    pub fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One judge evaluation, immutable once created.
///
/// `confidence` is advisory only; the verdict alone drives retry and
/// termination decisions. `attempt` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub verdict: Verdict,
    pub confidence: f64,
    pub reason: String,
    pub attempt: u32,
}

/// A configuration value with source attribution.
///
/// Used in status output to show the effective configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue {
    /// The configuration value as arbitrary JSON.
    pub value: serde_json::Value,
    /// Source of this configuration value.
    pub source: ConfigSource,
}

/// Source of a configuration value.
///
/// Indicates where a configuration value originated from in the
/// precedence chain: CLI arguments > environment > config file >
/// programmatic overrides > built-in defaults.
///
/// # Serialization
///
/// Serializes to lowercase strings: `"cli"`, `"env"`, `"config"`,
/// `"programmatic"`, `"default"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Value provided via CLI argument (highest precedence).
    Cli,
    /// Value taken from an environment variable.
    Env,
    /// Value loaded from configuration file.
    Config,
    /// Value provided programmatically (e.g., `Config::builder()`).
    Programmatic,
    /// Built-in default value (lowest precedence).
    Default,
}

impl ValidationRecord {
    #[must_use]
    pub fn new(verdict: Verdict, confidence: f64, reason: impl Into<String>, attempt: u32) -> Self {
        Self {
            verdict,
            confidence,
            reason: reason.into(),
            attempt,
        }
    }
}
