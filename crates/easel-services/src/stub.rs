//! Offline stub backends, selected by `provider = "stub"`.
//!
//! These are real providers for development and demos, not test
//! doubles: generation renders a deterministic solid-color image in the
//! requested format, description reports what it can see without a
//! model, and the judge accepts everything. No network, no API keys,
//! fully reproducible output for a given request.

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use easel_utils::error::ServiceError;
use easel_utils::types::{AssetRequest, ImageFormat};

use crate::types::{
    DescribeCall, DescriptionService, GeneratedImage, GenerationService, JudgeCall, JudgeService,
};

/// Offline generation backend rendering solid-color placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubGeneration;

/// Offline description backend summarizing artifact metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubDescription;

/// Offline judge backend that accepts every artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubJudge;

#[async_trait]
impl GenerationService for StubGeneration {
    async fn generate(
        &self,
        request: &AssetRequest,
        _timeout: Duration,
    ) -> Result<GeneratedImage, ServiceError> {
        let [r, g, b] = color_from_prompt(&request.prompt);
        let width = request.dimensions.width;
        let height = request.dimensions.height;

        let mut canvas = image::RgbImage::new(width, height);
        for pixel in canvas.pixels_mut() {
            *pixel = image::Rgb([r, g, b]);
        }

        let mut cursor = Cursor::new(Vec::new());
        canvas
            .write_to(&mut cursor, encode_format(request.format))
            .map_err(|e| {
                ServiceError::InvalidResponse(format!("stub image encoding failed: {e}"))
            })?;
        let bytes = cursor.into_inner();

        debug!(
            provider = "stub",
            width,
            height,
            format = %request.format,
            bytes = bytes.len(),
            "rendered placeholder image"
        );

        Ok(GeneratedImage {
            bytes,
            format: request.format,
        })
    }
}

#[async_trait]
impl DescriptionService for StubDescription {
    async fn describe(&self, call: &DescribeCall) -> Result<String, ServiceError> {
        let mut summary = format!(
            "Offline stub description of a {} image ({} bytes).",
            call.image.format,
            call.image.bytes.len()
        );
        if let Some(purpose) = &call.purpose {
            summary.push_str(&format!(" Purpose: {purpose}."));
        }
        if let Some(audience) = &call.audience {
            summary.push_str(&format!(" Audience: {audience}."));
        }

        if call.structure_detail {
            let structured = json!({
                "summary": summary,
                "detail": {
                    "format": call.image.format,
                    "byte_len": call.image.bytes.len(),
                    "source": "stub",
                },
            });
            Ok(structured.to_string())
        } else {
            Ok(summary)
        }
    }
}

#[async_trait]
impl JudgeService for StubJudge {
    async fn judge(&self, _call: &JudgeCall) -> Result<String, ServiceError> {
        let verdict = json!({
            "verdict": "pass",
            "confidence": 0.99,
            "reason": "offline stub judge accepts all artifacts",
        });
        Ok(verdict.to_string())
    }
}

/// Derive a stable fill color from the prompt.
fn color_from_prompt(prompt: &str) -> [u8; 3] {
    let digest = blake3::hash(prompt.as_bytes());
    let bytes = digest.as_bytes();
    [bytes[0], bytes[1], bytes[2]]
}

fn encode_format(format: ImageFormat) -> image::ImageFormat {
    match format {
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Webp => image::ImageFormat::WebP,
    }
}
