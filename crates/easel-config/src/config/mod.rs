//! Configuration management for easel
//!
//! This module provides hierarchical configuration with discovery and
//! precedence: CLI > environment > file > defaults. Supports TOML
//! configuration files with `[storage]`, `[cache]`, `[generation]`,
//! `[description]`, `[judge]`, and `[defaults]` sections.

mod builder;
mod cli_args;
mod discovery;
mod model;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use easel_utils::types::ConfigSource;
pub use model::*;

use std::time::Duration;

use camino::Utf8PathBuf;
use easel_utils::paths;

/// Default backend when none is configured.
const DEFAULT_PROVIDER: &str = "openai";
/// Default API base URL for the OpenAI backend.
const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
/// Default environment variable holding the API key.
const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Default image generation model.
const DEFAULT_GENERATION_MODEL: &str = "gpt-image-1";
/// Default vision model for description and judging.
const DEFAULT_VISION_MODEL: &str = "gpt-4o-mini";

const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;
const DEFAULT_DESCRIPTION_TIMEOUT_SECS: u64 = 60;
const DEFAULT_JUDGE_TIMEOUT_SECS: u64 = 60;

impl Config {
    /// Effective asset store root.
    ///
    /// Explicit `[storage].root` wins; otherwise `<EASEL_HOME>/assets`.
    #[must_use]
    pub fn storage_root(&self) -> Utf8PathBuf {
        match &self.storage.root {
            Some(root) => Utf8PathBuf::from(root),
            None => paths::assets_dir(),
        }
    }

    /// Effective durable cache directory.
    ///
    /// Explicit `[cache].dir` wins. When only the storage root is
    /// overridden, the cache moves with it (`<root>/cache`) so one flag
    /// relocates all state; otherwise `<EASEL_HOME>/cache`.
    #[must_use]
    pub fn cache_dir(&self) -> Utf8PathBuf {
        if let Some(dir) = &self.cache.dir {
            return Utf8PathBuf::from(dir);
        }
        match &self.storage.root {
            Some(root) => Utf8PathBuf::from(root).join("cache"),
            None => paths::cache_dir(),
        }
    }

    /// Maximum asset age before eviction.
    #[must_use]
    pub fn storage_ttl(&self) -> Duration {
        Duration::from_secs(self.storage.ttl_secs.unwrap_or(86_400))
    }

    /// Maximum cache entry age before lookups treat it as a miss.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs.unwrap_or(86_400))
    }

    #[must_use]
    pub fn max_assets(&self) -> usize {
        self.storage.max_assets.unwrap_or(256)
    }

    #[must_use]
    pub fn max_total_bytes(&self) -> u64 {
        self.storage.max_total_bytes.unwrap_or(268_435_456)
    }

    #[must_use]
    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity.unwrap_or(128)
    }

    /// Validation retries allowed after the first attempt.
    #[must_use]
    pub fn max_validation_retries(&self) -> u32 {
        self.defaults.max_validation_retries.unwrap_or(1)
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.defaults.verbose.unwrap_or(false)
    }

    /// Resolved settings for the image generation backend.
    #[must_use]
    pub fn generation_settings(&self) -> ProviderSettings {
        resolve_provider(
            &self.generation,
            DEFAULT_GENERATION_MODEL,
            DEFAULT_GENERATION_TIMEOUT_SECS,
        )
    }

    /// Resolved settings for the description backend.
    #[must_use]
    pub fn description_settings(&self) -> ProviderSettings {
        resolve_provider(
            &self.description,
            DEFAULT_VISION_MODEL,
            DEFAULT_DESCRIPTION_TIMEOUT_SECS,
        )
    }

    /// Resolved settings for the validation judge backend.
    #[must_use]
    pub fn judge_settings(&self) -> ProviderSettings {
        resolve_provider(&self.judge, DEFAULT_VISION_MODEL, DEFAULT_JUDGE_TIMEOUT_SECS)
    }
}

fn resolve_provider(
    section: &ProviderConfig,
    default_model: &str,
    default_timeout_secs: u64,
) -> ProviderSettings {
    ProviderSettings {
        provider: section
            .provider
            .clone()
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
        model: section
            .model
            .clone()
            .unwrap_or_else(|| default_model.to_string()),
        endpoint: section
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        api_key_env: section
            .api_key_env
            .clone()
            .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string()),
        timeout: Duration::from_secs(section.timeout_secs.unwrap_or(default_timeout_secs)),
    }
}
