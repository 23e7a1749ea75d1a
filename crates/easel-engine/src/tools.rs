//! Tool contracts: the wire-shaped inputs and outputs of the three
//! pipeline operations.
//!
//! These DTOs are the stable surface callers program against; the CLI
//! builds them from arguments and any external dispatcher deserializes
//! them from JSON. Inputs split cleanly in two: identity fields that
//! flow into the [`AssetRequest`] fingerprint, and behavior switches
//! (validation, retries, base64 echo) that must never perturb it.
//! Absent `max_validation_retries` means "use the configured default",
//! resolved by the handle, not here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use easel_utils::types::{
    AssetRequest, Background, Dimensions, ImageFormat, Quality, ValidationRecord,
};

use crate::description::{DescribeOptions, ValidateOptions};
use crate::generation::GenerateOptions;

/// Input of the `generate_image` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateImageInput {
    pub prompt: String,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub background: Background,
    #[serde(default)]
    pub dimensions: Dimensions,
    #[serde(default, rename = "image_format")]
    pub format: ImageFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,
    #[serde(default)]
    pub validate_output: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_focus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_validation_retries: Option<u32>,
    /// Echo the artifact bytes back base64-encoded.
    #[serde(default)]
    pub include_base64: bool,
}

impl GenerateImageInput {
    /// The fingerprint-relevant normalized request.
    #[must_use]
    pub fn asset_request(&self) -> AssetRequest {
        AssetRequest {
            prompt: self.prompt.clone(),
            quality: self.quality,
            background: self.background,
            dimensions: self.dimensions,
            format: self.format,
            style: self.style.clone(),
            acceptance_criteria: self.acceptance_criteria.clone(),
        }
    }

    /// The behavior switches, with the retry bound defaulted from
    /// configuration when the caller left it out.
    #[must_use]
    pub fn generate_options(&self, default_retries: u32) -> GenerateOptions {
        GenerateOptions {
            validate_output: self.validate_output,
            validation_focus: self.validation_focus.clone(),
            max_validation_retries: self.max_validation_retries.unwrap_or(default_retries),
        }
    }
}

/// Output of the `generate_image` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateImageOutput {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRecord>,
    /// True when the fingerprint cache answered without a service call.
    pub cached: bool,
}

/// Input of the `describe_asset` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeAssetInput {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default)]
    pub structure_detail: bool,
    #[serde(default)]
    pub auto_validate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_focus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_validation_retries: Option<u32>,
}

impl DescribeAssetInput {
    #[must_use]
    pub fn describe_options(&self, default_retries: u32) -> DescribeOptions {
        DescribeOptions {
            purpose: self.purpose.clone(),
            audience: self.audience.clone(),
            structure_detail: self.structure_detail,
            auto_validate: self.auto_validate,
            validation_focus: self.validation_focus.clone(),
            max_validation_retries: self.max_validation_retries.unwrap_or(default_retries),
        }
    }
}

/// Output of the `describe_asset` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeAssetOutput {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRecord>,
}

/// Input of the standalone `validate_asset` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateAssetInput {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_description: Option<String>,
    #[serde(default)]
    pub structure_detail: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_focus: Option<String>,
}

impl ValidateAssetInput {
    #[must_use]
    pub fn validate_options(&self) -> ValidateOptions {
        ValidateOptions {
            expected_description: self.expected_description.clone(),
            structure_detail: self.structure_detail,
            evaluation_focus: self.evaluation_focus.clone(),
        }
    }
}

/// Output of the `validate_asset` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateAssetOutput {
    pub validation: ValidationRecord,
}
