//! Description orchestration and standalone asset validation.
//!
//! `describe` reads an asset through the store, asks the description
//! service for a summary (optionally a structured breakdown), and, when
//! auto-validation is on, runs the same bounded-retry loop as
//! generation: a failed verdict requests a fresh description rather
//! than regenerating an image. Descriptions are never cached.
//!
//! `validate_asset` is the standalone check: describe the asset once,
//! then judge the summary against a caller-supplied expected
//! description. One attempt, no retry loop.
//!
//! Description replies are parsed softly, in deliberate contrast to
//! judge verdicts: prose meant for humans never becomes an error just
//! because it is not the JSON we hoped for.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use easel_services::{DescribeCall, DescriptionService, ImagePayload};
use easel_store::AssetStore;
use easel_utils::error::EaselError;
use easel_utils::types::ValidationRecord;

use crate::judge::{JudgeAdapter, JudgeSubject, strip_code_fence};
use crate::retry::{AttemptState, RetryState};

/// Caller-side switches for one describe call.
#[derive(Debug, Clone)]
pub struct DescribeOptions {
    pub purpose: Option<String>,
    pub audience: Option<String>,
    pub structure_detail: bool,
    pub auto_validate: bool,
    pub validation_focus: Option<String>,
    pub max_validation_retries: u32,
}

impl Default for DescribeOptions {
    fn default() -> Self {
        Self {
            purpose: None,
            audience: None,
            structure_detail: false,
            auto_validate: false,
            validation_focus: None,
            max_validation_retries: 1,
        }
    }
}

/// Switches for the standalone validation operation.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// What the asset is supposed to show, in the caller's words.
    pub expected_description: Option<String>,
    pub structure_detail: bool,
    pub evaluation_focus: Option<String>,
}

/// What a describe call resolved to.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptionResult {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRecord>,
}

/// Drives describe and validate calls against a stored asset.
#[derive(Clone)]
pub struct DescriptionOrchestrator {
    store: Arc<AssetStore>,
    service: Arc<dyn DescriptionService>,
    judge: JudgeAdapter,
    timeout: Duration,
}

impl DescriptionOrchestrator {
    #[must_use]
    pub fn new(
        store: Arc<AssetStore>,
        service: Arc<dyn DescriptionService>,
        judge: JudgeAdapter,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            service,
            judge,
            timeout,
        }
    }

    /// Describe the asset at `uri`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the uri resolves to nothing; service failures
    /// and judge contract violations abort the call. A failing verdict
    /// with retries exhausted is an `Ok` result carrying that record.
    pub async fn describe(
        &self,
        uri: &str,
        options: &DescribeOptions,
    ) -> Result<DescriptionResult, EaselError> {
        let image = self.load_image(uri)?;
        let call = DescribeCall {
            image: image.clone(),
            purpose: options.purpose.clone(),
            audience: options.audience.clone(),
            structure_detail: options.structure_detail,
            timeout: self.timeout,
        };

        let mut retry = RetryState::new(options.max_validation_retries);
        loop {
            let raw = self.service.describe(&call).await?;
            retry.produced();
            let (summary, detail) = parse_description(&raw, options.structure_detail);

            if !options.auto_validate {
                retry.skip_validation();
                debug!(uri, "described without validation");
                return Ok(DescriptionResult {
                    summary,
                    detail,
                    validation: None,
                });
            }

            retry.begin_validation();
            let subject = JudgeSubject {
                image: Some(image.clone()),
                description: Some(summary.clone()),
                focus: options.validation_focus.clone(),
                ..JudgeSubject::default()
            };
            let record = self.judge.evaluate(subject, retry.attempts_made()).await?;
            let observed = retry.record_verdict(record.clone());

            if observed == AttemptState::FailRetry {
                warn!(
                    uri,
                    attempt = record.attempt,
                    max_attempts = retry.max_attempts(),
                    reason = %record.reason,
                    "description failed validation; requesting a fresh one"
                );
                continue;
            }
            if observed == AttemptState::FailExhausted {
                warn!(
                    uri,
                    attempts = retry.attempts_made(),
                    "description validation retries exhausted; returning the last summary"
                );
            }
            return Ok(DescriptionResult {
                summary,
                detail,
                validation: Some(record),
            });
        }
    }

    /// Judge a stored asset against an expected description: one
    /// describe call, one judge call, no retries.
    ///
    /// # Errors
    ///
    /// `NotFound` when the uri resolves to nothing; service failures
    /// and judge contract violations abort the call.
    pub async fn validate_asset(
        &self,
        uri: &str,
        options: &ValidateOptions,
    ) -> Result<ValidationRecord, EaselError> {
        let image = self.load_image(uri)?;
        let call = DescribeCall {
            image: image.clone(),
            purpose: None,
            audience: None,
            structure_detail: options.structure_detail,
            timeout: self.timeout,
        };
        let raw = self.service.describe(&call).await?;
        let (summary, _) = parse_description(&raw, options.structure_detail);

        debug!(uri, "validating asset against expected description");
        let subject = JudgeSubject {
            image: Some(image),
            description: Some(summary),
            expected: options.expected_description.clone(),
            focus: options.evaluation_focus.clone(),
        };
        self.judge.evaluate(subject, 1).await
    }

    fn load_image(&self, uri: &str) -> Result<ImagePayload, EaselError> {
        let meta = self.store.metadata(uri)?;
        let bytes = self.store.get(uri)?;
        Ok(ImagePayload::new(bytes, meta.format))
    }
}

/// Extract `(summary, detail)` from a raw description reply.
///
/// When structure was requested the reply should be JSON with a
/// `summary` string and a `detail` object, but a service that answers
/// in prose anyway still produces a usable result.
fn parse_description(raw: &str, structured: bool) -> (String, Option<Value>) {
    if !structured {
        return (raw.trim().to_string(), None);
    }
    let payload = strip_code_fence(raw);
    let Ok(value) = serde_json::from_str::<Value>(payload) else {
        return (raw.trim().to_string(), None);
    };
    let summary = value
        .get("summary")
        .and_then(Value::as_str)
        .map_or_else(|| raw.trim().to_string(), str::to_string);
    let detail = value.get("detail").cloned().or(Some(value));
    (summary, detail)
}
