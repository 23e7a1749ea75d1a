use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use easel_utils::types::ConfigSource;

/// Configuration for easel operations.
///
/// `Config` provides hierarchical configuration with discovery and
/// precedence: CLI arguments > environment > config file > built-in
/// defaults.
///
/// # Discovery
///
/// Use [`Config::discover()`] for CLI-like behavior that:
/// - Uses an explicit `--config` path when given
/// - Respects the `EASEL_CONFIG` environment variable
/// - Falls back to `./easel.toml`, then the user config directory
/// - Applies built-in defaults for unspecified values
///
/// # Programmatic Configuration
///
/// For embedding scenarios where you need deterministic behavior
/// independent of the user's environment, use [`Config::builder()`].
/// Builder values are attributed to `ConfigSource::Programmatic`.
///
/// # Source Attribution
///
/// Each configuration value tracks its source (`cli`, `env`, `config`,
/// `programmatic`, or `default`) for debugging and status display.
///
/// # Configuration File Format
///
/// Configuration files use TOML format with these sections:
///
/// ```toml
/// [storage]
/// root = "/var/lib/easel/assets"
/// ttl_secs = 86400
/// max_assets = 256
/// max_total_bytes = 268435456
///
/// [cache]
/// ttl_secs = 86400
/// capacity = 128
///
/// [generation]
/// provider = "openai"
/// model = "gpt-image-1"
/// timeout_secs = 120
///
/// [judge]
/// model = "gpt-4o-mini"
///
/// [defaults]
/// max_validation_retries = 1
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Asset store location and eviction bounds.
    pub storage: StorageConfig,
    /// Fingerprint cache bounds.
    pub cache: CacheConfig,
    /// Image generation backend.
    pub generation: ProviderConfig,
    /// Description backend.
    pub description: ProviderConfig,
    /// Validation judge backend.
    pub judge: ProviderConfig,
    /// Default values for orchestration settings.
    pub defaults: Defaults,
    /// Source attribution for each setting (for status display).
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// Asset store configuration section from easel.toml.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding generated assets. Default:
    /// `<EASEL_HOME>/assets`.
    pub root: Option<String>,
    /// Maximum asset age before the sweeper evicts it.
    pub ttl_secs: Option<u64>,
    /// Maximum number of assets kept in the store.
    pub max_assets: Option<usize>,
    /// Maximum total bytes kept in the store.
    pub max_total_bytes: Option<u64>,
}

/// Fingerprint cache configuration section from easel.toml.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Directory holding durable cache entries. Default:
    /// `<EASEL_HOME>/cache`, or `<storage.root>/cache` when the storage
    /// root is overridden.
    pub dir: Option<String>,
    /// Maximum entry age before lookups treat it as a miss.
    pub ttl_secs: Option<u64>,
    /// Maximum number of live cache entries.
    pub capacity: Option<usize>,
}

/// One external service backend configuration.
///
/// The same shape configures the `[generation]`, `[description]`, and
/// `[judge]` sections; unset fields fall back to per-role defaults (see
/// the resolved accessors on [`Config`]).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Backend name: "openai" or "stub".
    pub provider: Option<String>,
    /// Model identifier sent to the backend.
    pub model: Option<String>,
    /// Base URL of the backend API.
    pub endpoint: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: Option<String>,
    /// Per-call timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Default orchestration values
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    /// Validation retries after the first attempt. Default: 1.
    pub max_validation_retries: Option<u32>,
    pub verbose: Option<bool>,
}

/// Effective settings for one backend after defaults are applied.
///
/// Produced by [`Config::generation_settings()`] and friends; service
/// adapters consume this instead of the raw optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    pub api_key_env: String,
    pub timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: None,
            ttl_secs: Some(86_400),               // 24 hours
            max_assets: Some(256),
            max_total_bytes: Some(268_435_456),   // 256 MiB
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            ttl_secs: Some(86_400), // 24 hours
            capacity: Some(128),
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            max_validation_retries: Some(1),
            verbose: Some(false),
        }
    }
}
