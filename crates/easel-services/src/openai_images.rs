//! Image generation over an OpenAI-compatible images endpoint.
//!
//! Sends `POST {endpoint}/images/generations` and decodes the
//! `data[0].b64_json` payload. Any endpoint speaking this dialect works;
//! only the base URL and model come from configuration.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use easel_config::ProviderSettings;
use easel_utils::error::ServiceError;
use easel_utils::types::{AssetRequest, Background, Quality};

use crate::http_client::HttpClient;
use crate::types::{GeneratedImage, GenerationService};

/// Provider label used in logs and error messages.
const PROVIDER: &str = "openai-images";

/// Generation backend for the images endpoint.
#[derive(Clone)]
pub struct OpenAiImagesBackend {
    client: Arc<HttpClient>,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiImagesBackend {
    /// Build the backend from resolved provider settings.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Misconfiguration`] when the API key
    /// environment variable is unset or the HTTP client cannot be
    /// constructed.
    pub fn new(settings: &ProviderSettings) -> Result<Self, ServiceError> {
        let api_key = std::env::var(&settings.api_key_env).map_err(|_| {
            ServiceError::Misconfiguration(format!(
                "generation API key not found in environment variable '{}'. \
                 Set this variable or configure a different api_key_env in [generation].",
                settings.api_key_env
            ))
        })?;

        let client = HttpClient::new()?;

        Ok(Self {
            client: Arc::new(client),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: settings.model.clone(),
        })
    }
}

#[async_trait]
impl GenerationService for OpenAiImagesBackend {
    async fn generate(
        &self,
        request: &AssetRequest,
        timeout: Duration,
    ) -> Result<GeneratedImage, ServiceError> {
        let body = build_request_body(&self.model, request);

        debug!(
            provider = PROVIDER,
            model = %self.model,
            size = %request.dimensions,
            format = %request.format,
            timeout_secs = timeout.as_secs(),
            "requesting image generation"
        );

        let url = format!("{}/images/generations", self.endpoint);
        let http_request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body);

        let response = self
            .client
            .execute_with_retry(http_request, timeout, PROVIDER)
            .await?;

        let parsed: ImagesResponse = response.json().await.map_err(|e| {
            ServiceError::InvalidResponse(format!("failed to parse images response: {e}"))
        })?;

        let datum = parsed.data.into_iter().next().ok_or_else(|| {
            ServiceError::InvalidResponse("images response carried no data entries".to_string())
        })?;
        let b64 = datum.b64_json.ok_or_else(|| {
            ServiceError::InvalidResponse("images response entry missing b64_json".to_string())
        })?;
        let bytes = BASE64.decode(b64.as_bytes()).map_err(|e| {
            ServiceError::InvalidResponse(format!("image payload base64 decode failed: {e}"))
        })?;

        debug!(provider = PROVIDER, bytes = bytes.len(), "image generation completed");

        Ok(GeneratedImage {
            bytes,
            format: request.format,
        })
    }
}

/// Build the wire payload for one generation call.
///
/// `auto` quality and background are the endpoint's own defaults, so
/// they are omitted rather than sent explicitly.
fn build_request_body(model: &str, request: &AssetRequest) -> ImagesRequest {
    ImagesRequest {
        model: model.to_string(),
        prompt: effective_prompt(request),
        n: 1,
        size: request.dimensions.to_string(),
        output_format: request.format.extension().to_string(),
        quality: (request.quality != Quality::Auto).then(|| request.quality.as_str().to_string()),
        background: (request.background != Background::Auto)
            .then(|| request.background.as_str().to_string()),
    }
}

/// Fold style and acceptance criteria into the prompt text.
///
/// The images endpoint has no dedicated fields for either, and both are
/// fingerprint-relevant, so they must reach the provider to matter.
fn effective_prompt(request: &AssetRequest) -> String {
    let mut prompt = request.prompt.clone();
    if let Some(style) = &request.style {
        prompt.push_str("\n\nStyle: ");
        prompt.push_str(style);
    }
    if let Some(criteria) = &request.acceptance_criteria {
        prompt.push_str("\n\nThe image must satisfy: ");
        prompt.push_str(criteria);
    }
    prompt
}

/// Images endpoint request body.
#[derive(Debug, Clone, Serialize)]
struct ImagesRequest {
    model: String,
    prompt: String,
    n: u32,
    size: String,
    output_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    background: Option<String>,
}

/// Images endpoint response body.
#[derive(Debug, Clone, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageDatum>,
}

/// One generated image in the response.
#[derive(Debug, Clone, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}
