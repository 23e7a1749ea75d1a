//! Validation judge adapter.
//!
//! Wraps a single [`JudgeService`] call and parses its reply against the
//! verdict contract: a JSON object with `verdict` of exactly `"pass"` or
//! `"fail"`, a finite `confidence` in `[0, 1]`, and a non-empty `reason`.
//! The reply may wrap its JSON in one markdown code fence; stripping
//! that fence is payload extraction, not coercion. Everything else —
//! missing fields, out-of-range confidence, unparseable text — is
//! [`JudgeError::ResponseInvalid`] and is never interpreted as a pass
//! or a fail. Extra fields are ignored.
//!
//! Confidence is advisory: the verdict alone drives the retry machine.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use easel_services::{ImagePayload, JudgeCall, JudgeService};
use easel_utils::error::{EaselError, JudgeError};
use easel_utils::types::{ValidationRecord, Verdict};

/// What the judge is asked to evaluate: an artifact, a description of
/// one, or both, against optional expected content under an optional
/// focus. At least one of `image`/`description` should be set; the
/// orchestrators guarantee that.
#[derive(Debug, Clone, Default)]
pub struct JudgeSubject {
    pub image: Option<ImagePayload>,
    pub description: Option<String>,
    pub expected: Option<String>,
    pub focus: Option<String>,
}

/// One judge call plus strict verdict parsing.
#[derive(Clone)]
pub struct JudgeAdapter {
    service: Arc<dyn JudgeService>,
    timeout: Duration,
}

impl JudgeAdapter {
    #[must_use]
    pub fn new(service: Arc<dyn JudgeService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Call the judge once and parse its verdict into a
    /// [`ValidationRecord`] labelled with `attempt`.
    ///
    /// # Errors
    ///
    /// Propagates [`ServiceError`](easel_utils::error::ServiceError)
    /// from the call itself; returns [`JudgeError::ResponseInvalid`]
    /// when the reply violates the verdict contract.
    pub async fn evaluate(
        &self,
        subject: JudgeSubject,
        attempt: u32,
    ) -> Result<ValidationRecord, EaselError> {
        let call = JudgeCall {
            image: subject.image,
            description: subject.description,
            expected: subject.expected,
            focus: subject.focus,
            timeout: self.timeout,
        };
        let raw = self.service.judge(&call).await.map_err(EaselError::from)?;
        let record = parse_verdict(&raw, attempt)?;
        debug!(
            verdict = %record.verdict,
            confidence = record.confidence,
            attempt,
            "judge verdict"
        );
        Ok(record)
    }
}

/// Parse a raw judge reply against the three-field contract.
fn parse_verdict(raw: &str, attempt: u32) -> Result<ValidationRecord, JudgeError> {
    let payload = strip_code_fence(raw);
    let value: Value =
        serde_json::from_str(payload).map_err(|e| JudgeError::ResponseInvalid {
            reason: format!("not valid JSON: {e}"),
        })?;

    let verdict = match value.get("verdict") {
        None => {
            return Err(JudgeError::ResponseInvalid {
                reason: "missing field 'verdict'".to_string(),
            });
        }
        Some(v) => match v.as_str() {
            Some("pass") => Verdict::Pass,
            Some("fail") => Verdict::Fail,
            _ => {
                return Err(JudgeError::ResponseInvalid {
                    reason: format!("verdict must be \"pass\" or \"fail\", got {v}"),
                });
            }
        },
    };

    let confidence = match value.get("confidence") {
        None => {
            return Err(JudgeError::ResponseInvalid {
                reason: "missing field 'confidence'".to_string(),
            });
        }
        Some(c) => match c.as_f64() {
            Some(n) if n.is_finite() && (0.0..=1.0).contains(&n) => n,
            _ => {
                return Err(JudgeError::ResponseInvalid {
                    reason: format!("confidence must be a number in [0, 1], got {c}"),
                });
            }
        },
    };

    let reason = match value.get("reason").and_then(Value::as_str) {
        Some(r) if !r.trim().is_empty() => r.to_string(),
        Some(_) => {
            return Err(JudgeError::ResponseInvalid {
                reason: "reason must be non-empty text".to_string(),
            });
        }
        None => {
            return Err(JudgeError::ResponseInvalid {
                reason: "missing field 'reason'".to_string(),
            });
        }
    };

    Ok(ValidationRecord::new(verdict, confidence, reason, attempt))
}

/// Strip one surrounding markdown code fence, info string included.
///
/// Anything that is not a complete fence pair is returned unchanged and
/// left to the JSON parser to reject.
pub(crate) fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(newline) = rest.find('\n') else {
        return trimmed;
    };
    let Some(body) = rest[newline + 1..].strip_suffix("```") else {
        return trimmed;
    };
    body.trim()
}
