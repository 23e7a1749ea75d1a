//! Capability traits and call payloads for the external services.
//!
//! The orchestrators never talk to a provider directly; they hold
//! `Arc<dyn GenerationService>` (and friends) injected at construction
//! time. Production wiring selects an HTTP backend or the offline stub
//! from configuration; tests inject scripted doubles through the same
//! seam. Backends are never swapped at runtime.

use std::time::Duration;

use async_trait::async_trait;

use easel_utils::error::ServiceError;
use easel_utils::types::{AssetRequest, ImageFormat};

/// Encoded image bytes returned by a generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

/// An image handed to the description or judge service.
///
/// Carries the raw encoded bytes plus the format so HTTP backends can
/// build a correctly-typed data URL without sniffing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl ImagePayload {
    #[must_use]
    pub fn new(bytes: Vec<u8>, format: ImageFormat) -> Self {
        Self { bytes, format }
    }
}

/// One description request.
///
/// `purpose` and `audience` steer the register of the summary;
/// `structure_detail` additionally asks the service for a structured
/// breakdown, which the orchestrator parses out of the reply.
#[derive(Debug, Clone)]
pub struct DescribeCall {
    pub image: ImagePayload,
    pub purpose: Option<String>,
    pub audience: Option<String>,
    pub structure_detail: bool,
    /// Per-call timeout enforced by the backend.
    pub timeout: Duration,
}

/// One judge request.
///
/// At least one of `image` / `description` is present: generation
/// validation judges the image alone, description validation judges the
/// text against the image, and standalone validation judges the image
/// against `expected`.
#[derive(Debug, Clone)]
pub struct JudgeCall {
    pub image: Option<ImagePayload>,
    pub description: Option<String>,
    /// Expected description supplied by the caller, if any.
    pub expected: Option<String>,
    /// Free-text evaluation focus forwarded verbatim to the judge.
    pub focus: Option<String>,
    /// Per-call timeout enforced by the backend.
    pub timeout: Duration,
}

/// Produces image bytes from a normalized request.
///
/// The request deliberately carries no timeout: it is fingerprint
/// material, and transport concerns must never perturb cache keys.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate one image.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] for transport, auth, quota, outage,
    /// timeout, and unusable-payload failures. The validation retry
    /// loop never retries these.
    async fn generate(
        &self,
        request: &AssetRequest,
        timeout: Duration,
    ) -> Result<GeneratedImage, ServiceError>;
}

impl std::fmt::Debug for dyn GenerationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn GenerationService")
    }
}

/// Produces a natural-language description of an image.
///
/// Returns the raw reply text; the description orchestrator extracts
/// the summary and any structured detail from it. Descriptions are not
/// contract-bound the way judge verdicts are.
#[async_trait]
pub trait DescriptionService: Send + Sync {
    /// Describe the image in `call`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] for any failure reaching the service or
    /// obtaining a text reply.
    async fn describe(&self, call: &DescribeCall) -> Result<String, ServiceError>;
}

/// Classifies an artifact against stated criteria.
///
/// Returns the raw reply text. Parsing it against the strict
/// verdict/confidence/reason contract belongs to the judge adapter, so
/// scripted test doubles can exercise the full contract-violation
/// surface through this seam.
#[async_trait]
pub trait JudgeService: Send + Sync {
    /// Obtain one judgement for `call`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] for any failure reaching the service or
    /// obtaining a text reply.
    async fn judge(&self, call: &JudgeCall) -> Result<String, ServiceError>;
}
