//! External service backends for easel.
//!
//! The orchestration engine consumes three capability traits —
//! [`GenerationService`], [`DescriptionService`], and [`JudgeService`] —
//! and never cares which implementation sits behind them. This crate
//! provides the hosted backends (an OpenAI-compatible images endpoint
//! for generation, a vision chat endpoint for description and judging)
//! and the offline stubs, plus the configuration-driven factory that
//! selects between them.

pub(crate) mod http_client;
mod openai_chat;
mod openai_images;
mod stub;
mod types;

use std::sync::Arc;

use easel_config::{Config, ProviderSettings};
use easel_utils::error::ServiceError;

pub use openai_chat::OpenAiChatBackend;
pub use openai_images::OpenAiImagesBackend;
pub use stub::{StubDescription, StubGeneration, StubJudge};
pub use types::{
    DescribeCall, DescriptionService, GeneratedImage, GenerationService, ImagePayload, JudgeCall,
    JudgeService,
};

// Test seam; not part of public API stability guarantees.
#[doc(hidden)]
pub use http_client::redact_error_message_for_testing;

/// The three service handles the engine runs against.
///
/// Built once from configuration and injected at engine construction;
/// backends are never reassigned afterwards. Tests bypass the factory
/// and assemble a `ServiceSet` from doubles directly.
#[derive(Clone)]
pub struct ServiceSet {
    pub generation: Arc<dyn GenerationService>,
    pub description: Arc<dyn DescriptionService>,
    pub judge: Arc<dyn JudgeService>,
}

impl ServiceSet {
    /// Select and construct all three backends from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Misconfiguration`] for an unknown
    /// provider name or a hosted backend missing its API key.
    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        Ok(Self {
            generation: generation_from_settings(&config.generation_settings())?,
            description: description_from_settings(&config.description_settings())?,
            judge: judge_from_settings(&config.judge_settings())?,
        })
    }
}

/// Construct the generation backend named by `settings.provider`.
///
/// # Errors
///
/// Returns [`ServiceError::Misconfiguration`] if the provider is
/// unknown or the backend cannot be constructed.
pub fn generation_from_settings(
    settings: &ProviderSettings,
) -> Result<Arc<dyn GenerationService>, ServiceError> {
    match settings.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiImagesBackend::new(settings)?)),
        "stub" => Ok(Arc::new(StubGeneration)),
        unknown => Err(unknown_provider("generation", unknown)),
    }
}

/// Construct the description backend named by `settings.provider`.
///
/// # Errors
///
/// Returns [`ServiceError::Misconfiguration`] if the provider is
/// unknown or the backend cannot be constructed.
pub fn description_from_settings(
    settings: &ProviderSettings,
) -> Result<Arc<dyn DescriptionService>, ServiceError> {
    match settings.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiChatBackend::new(settings, "description")?)),
        "stub" => Ok(Arc::new(StubDescription)),
        unknown => Err(unknown_provider("description", unknown)),
    }
}

/// Construct the judge backend named by `settings.provider`.
///
/// # Errors
///
/// Returns [`ServiceError::Misconfiguration`] if the provider is
/// unknown or the backend cannot be constructed.
pub fn judge_from_settings(
    settings: &ProviderSettings,
) -> Result<Arc<dyn JudgeService>, ServiceError> {
    match settings.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiChatBackend::new(settings, "judge")?)),
        "stub" => Ok(Arc::new(StubJudge)),
        unknown => Err(unknown_provider("judge", unknown)),
    }
}

fn unknown_provider(role: &str, name: &str) -> ServiceError {
    ServiceError::Misconfiguration(format!(
        "unknown {role} provider '{name}'. Supported providers: openai, stub."
    ))
}
