//! Description and judging over an OpenAI-compatible chat endpoint.
//!
//! Both roles are one-shot vision calls: a single user message carrying
//! instruction text plus the image as a base64 data URL, answered by
//! `choices[0].message.content`. The same backend type serves the
//! description and judge configurations; each role gets its own
//! instance so models and timeouts can differ.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use easel_config::ProviderSettings;
use easel_utils::error::ServiceError;

use crate::http_client::HttpClient;
use crate::types::{DescribeCall, DescriptionService, ImagePayload, JudgeCall, JudgeService};

/// Provider label used in logs and error messages.
const PROVIDER: &str = "openai-chat";

/// Completion budget for descriptions and verdicts.
const MAX_COMPLETION_TOKENS: u32 = 1024;

/// Vision-capable chat backend.
#[derive(Clone)]
pub struct OpenAiChatBackend {
    client: Arc<HttpClient>,
    endpoint: String,
    api_key: String,
    model: String,
    /// `"description"` or `"judge"`, for logs and error messages.
    role: &'static str,
}

impl OpenAiChatBackend {
    /// Build the backend from resolved provider settings.
    ///
    /// `role` names the configuration section the settings came from.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Misconfiguration`] when the API key
    /// environment variable is unset or the HTTP client cannot be
    /// constructed.
    pub fn new(settings: &ProviderSettings, role: &'static str) -> Result<Self, ServiceError> {
        let api_key = std::env::var(&settings.api_key_env).map_err(|_| {
            ServiceError::Misconfiguration(format!(
                "{role} API key not found in environment variable '{}'. \
                 Set this variable or configure a different api_key_env in [{role}].",
                settings.api_key_env
            ))
        })?;

        let client = HttpClient::new()?;

        Ok(Self {
            client: Arc::new(client),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: settings.model.clone(),
            role,
        })
    }

    /// One chat completion: instruction text plus an optional image.
    async fn request_completion(
        &self,
        prompt: String,
        image: Option<&ImagePayload>,
        timeout: Duration,
    ) -> Result<String, ServiceError> {
        let mut content = vec![ContentPart::Text { text: prompt }];
        if let Some(image) = image {
            content.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: data_url(image),
                },
            });
        }

        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let url = format!("{}/chat/completions", self.endpoint);
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

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            ServiceError::InvalidResponse(format!("failed to parse chat response: {e}"))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                ServiceError::InvalidResponse("chat response missing message content".to_string())
            })
    }
}

#[async_trait]
impl DescriptionService for OpenAiChatBackend {
    async fn describe(&self, call: &DescribeCall) -> Result<String, ServiceError> {
        debug!(
            provider = PROVIDER,
            role = self.role,
            model = %self.model,
            structured = call.structure_detail,
            timeout_secs = call.timeout.as_secs(),
            "requesting description"
        );

        let prompt = build_describe_prompt(call);
        self.request_completion(prompt, Some(&call.image), call.timeout)
            .await
    }
}

#[async_trait]
impl JudgeService for OpenAiChatBackend {
    async fn judge(&self, call: &JudgeCall) -> Result<String, ServiceError> {
        debug!(
            provider = PROVIDER,
            role = self.role,
            model = %self.model,
            has_image = call.image.is_some(),
            has_description = call.description.is_some(),
            timeout_secs = call.timeout.as_secs(),
            "requesting judgement"
        );

        let prompt = build_judge_prompt(call);
        self.request_completion(prompt, call.image.as_ref(), call.timeout)
            .await
    }
}

/// Wrap image bytes in a typed data URL.
fn data_url(image: &ImagePayload) -> String {
    format!(
        "data:{};base64,{}",
        image.format.mime_type(),
        BASE64.encode(&image.bytes)
    )
}

fn build_describe_prompt(call: &DescribeCall) -> String {
    let mut prompt = String::from("Describe the attached image.");
    if let Some(purpose) = &call.purpose {
        prompt.push_str("\nPurpose of the description: ");
        prompt.push_str(purpose);
        prompt.push('.');
    }
    if let Some(audience) = &call.audience {
        prompt.push_str("\nIntended audience: ");
        prompt.push_str(audience);
        prompt.push('.');
    }
    if call.structure_detail {
        prompt.push_str(
            "\nReply with a JSON object containing \"summary\" (a concise paragraph) and \
             \"detail\" (an object breaking down subject, composition, colors, and notable \
             elements).",
        );
    } else {
        prompt.push_str("\nReply with a concise paragraph.");
    }
    prompt
}

fn build_judge_prompt(call: &JudgeCall) -> String {
    let mut prompt = String::from("You are a strict validator.");
    match (&call.image, &call.description) {
        (Some(_), Some(description)) => {
            prompt.push_str(
                "\nEvaluate whether the following description accurately covers the attached \
                 image.\n\nDescription:\n",
            );
            prompt.push_str(description);
        }
        (Some(_), None) => {
            prompt.push_str("\nEvaluate the attached image.");
        }
        (None, Some(description)) => {
            prompt.push_str("\nEvaluate the following description.\n\nDescription:\n");
            prompt.push_str(description);
        }
        (None, None) => {
            prompt.push_str("\nEvaluate the submission.");
        }
    }
    if let Some(expected) = &call.expected {
        prompt.push_str("\n\nExpected content:\n");
        prompt.push_str(expected);
    }
    if let Some(focus) = &call.focus {
        prompt.push_str("\n\nFocus on: ");
        prompt.push_str(focus);
    }
    prompt.push_str(
        "\n\nReply with only a JSON object with exactly these fields: \"verdict\" (\"pass\" or \
         \"fail\"), \"confidence\" (a number between 0 and 1), and \"reason\" (a short \
         explanation).",
    );
    prompt
}

/// Chat endpoint request body.
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

/// One chat message with multimodal content parts.
#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

/// Text or image content part.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
struct ImageUrl {
    url: String,
}

/// Chat endpoint response body.
#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
