use std::collections::HashMap;
use std::time::Duration;

use easel_utils::error::EaselError;
use easel_utils::types::ConfigSource;

use super::{CacheConfig, Config, Defaults, ProviderConfig, StorageConfig};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// Use this when you need to configure easel programmatically
    /// without relying on environment variables or config files. This is
    /// the recommended approach for embedding easel in other
    /// applications and for tests, which inject scoped directories here
    /// instead of mutating shared state.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use easel_config::Config;
    /// use std::time::Duration;
    ///
    /// let config = Config::builder()
    ///     .storage_root("/custom/assets")
    ///     .max_assets(64)
    ///     .storage_ttl(Duration::from_secs(3600))
    ///     .build()
    ///     .expect("Failed to build config");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for programmatic configuration of easel.
///
/// `ConfigBuilder` provides a fluent API for constructing `Config`
/// instances without touching the process environment. All values set
/// via the builder are attributed to `ConfigSource::Programmatic` in the
/// resulting `Config`'s source attribution map.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    storage_root: Option<String>,
    storage_ttl: Option<Duration>,
    max_assets: Option<usize>,
    max_total_bytes: Option<u64>,
    cache_dir: Option<String>,
    cache_ttl: Option<Duration>,
    cache_capacity: Option<usize>,
    provider: Option<String>,
    generation_model: Option<String>,
    description_model: Option<String>,
    judge_model: Option<String>,
    endpoint: Option<String>,
    api_key_env: Option<String>,
    generation_timeout: Option<Duration>,
    description_timeout: Option<Duration>,
    judge_timeout: Option<Duration>,
    max_validation_retries: Option<u32>,
    verbose: Option<bool>,
}

impl ConfigBuilder {
    /// Create a new `ConfigBuilder` with no values set.
    ///
    /// All configuration values will use their defaults unless
    /// explicitly set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the asset store root directory.
    ///
    /// This overrides the default `<EASEL_HOME>/assets` location.
    #[must_use]
    pub fn storage_root(mut self, root: impl Into<String>) -> Self {
        self.storage_root = Some(root.into());
        self
    }

    /// Set the asset TTL used by lazy eviction and the sweeper.
    ///
    /// Default: 24 hours.
    #[must_use]
    pub fn storage_ttl(mut self, ttl: Duration) -> Self {
        self.storage_ttl = Some(ttl);
        self
    }

    /// Set the maximum number of stored assets.
    ///
    /// Default: 256. Must be greater than 0.
    #[must_use]
    pub fn max_assets(mut self, count: usize) -> Self {
        self.max_assets = Some(count);
        self
    }

    /// Set the maximum total bytes of stored assets.
    ///
    /// Default: 256 MiB. Must be greater than 0.
    #[must_use]
    pub fn max_total_bytes(mut self, bytes: u64) -> Self {
        self.max_total_bytes = Some(bytes);
        self
    }

    /// Set the durable cache entry directory.
    ///
    /// Default: `<EASEL_HOME>/cache`, or `<storage_root>/cache` when the
    /// storage root is overridden.
    #[must_use]
    pub fn cache_dir(mut self, dir: impl Into<String>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Set the cache entry TTL.
    ///
    /// Default: 24 hours.
    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Set the maximum number of live cache entries.
    ///
    /// Default: 128. Must be greater than 0.
    #[must_use]
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// Set the backend for generation, description, and judge alike.
    ///
    /// Valid values: "openai", "stub". Default: "openai".
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Set the image generation model. Default: "gpt-image-1".
    #[must_use]
    pub fn generation_model(mut self, model: impl Into<String>) -> Self {
        self.generation_model = Some(model.into());
        self
    }

    /// Set the description model. Default: "gpt-4o-mini".
    #[must_use]
    pub fn description_model(mut self, model: impl Into<String>) -> Self {
        self.description_model = Some(model.into());
        self
    }

    /// Set the judge model. Default: "gpt-4o-mini".
    #[must_use]
    pub fn judge_model(mut self, model: impl Into<String>) -> Self {
        self.judge_model = Some(model.into());
        self
    }

    /// Set the API base URL for all three backends.
    ///
    /// Default: `https://api.openai.com/v1`.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the environment variable holding the API key for all three
    /// backends. Default: `OPENAI_API_KEY`.
    #[must_use]
    pub fn api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = Some(var.into());
        self
    }

    /// Set the per-call timeout for generation. Default: 120 seconds.
    #[must_use]
    pub fn generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = Some(timeout);
        self
    }

    /// Set the per-call timeout for description. Default: 60 seconds.
    #[must_use]
    pub fn description_timeout(mut self, timeout: Duration) -> Self {
        self.description_timeout = Some(timeout);
        self
    }

    /// Set the per-call timeout for the judge. Default: 60 seconds.
    #[must_use]
    pub fn judge_timeout(mut self, timeout: Duration) -> Self {
        self.judge_timeout = Some(timeout);
        self
    }

    /// Set the validation retry budget after the first attempt.
    ///
    /// Default: 1. Must be at most 10.
    #[must_use]
    pub fn max_validation_retries(mut self, retries: u32) -> Self {
        self.max_validation_retries = Some(retries);
        self
    }

    /// Set verbose output mode. Default: false.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Build the `Config` from the builder values.
    ///
    /// This creates a `Config` using the values set on the builder, with
    /// defaults applied for any unset values. The resulting config is
    /// validated before being returned.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid (e.g.
    /// `max_assets = 0`).
    pub fn build(self) -> Result<Config, EaselError> {
        let mut source_attribution = HashMap::new();

        let mut storage = StorageConfig::default();
        let mut cache = CacheConfig::default();
        let mut generation = ProviderConfig::default();
        let mut description = ProviderConfig::default();
        let mut judge = ProviderConfig::default();
        let mut defaults = Defaults::default();

        for key in [
            "storage_root",
            "storage_ttl_secs",
            "storage_max_assets",
            "storage_max_total_bytes",
            "cache_ttl_secs",
            "cache_capacity",
            "max_validation_retries",
            "verbose",
        ] {
            source_attribution.insert(key.to_string(), ConfigSource::Default);
        }

        if let Some(root) = self.storage_root {
            storage.root = Some(root);
            source_attribution.insert("storage_root".to_string(), ConfigSource::Programmatic);
        }
        if let Some(ttl) = self.storage_ttl {
            storage.ttl_secs = Some(ttl.as_secs());
            source_attribution.insert("storage_ttl_secs".to_string(), ConfigSource::Programmatic);
        }
        if let Some(count) = self.max_assets {
            storage.max_assets = Some(count);
            source_attribution.insert("storage_max_assets".to_string(), ConfigSource::Programmatic);
        }
        if let Some(bytes) = self.max_total_bytes {
            storage.max_total_bytes = Some(bytes);
            source_attribution.insert(
                "storage_max_total_bytes".to_string(),
                ConfigSource::Programmatic,
            );
        }

        if let Some(dir) = self.cache_dir {
            cache.dir = Some(dir);
            source_attribution.insert("cache_dir".to_string(), ConfigSource::Programmatic);
        }
        if let Some(ttl) = self.cache_ttl {
            cache.ttl_secs = Some(ttl.as_secs());
            source_attribution.insert("cache_ttl_secs".to_string(), ConfigSource::Programmatic);
        }
        if let Some(capacity) = self.cache_capacity {
            cache.capacity = Some(capacity);
            source_attribution.insert("cache_capacity".to_string(), ConfigSource::Programmatic);
        }

        if let Some(provider) = self.provider {
            generation.provider = Some(provider.clone());
            description.provider = Some(provider.clone());
            judge.provider = Some(provider);
            for key in ["generation_provider", "description_provider", "judge_provider"] {
                source_attribution.insert(key.to_string(), ConfigSource::Programmatic);
            }
        }
        if let Some(model) = self.generation_model {
            generation.model = Some(model);
            source_attribution.insert("generation_model".to_string(), ConfigSource::Programmatic);
        }
        if let Some(model) = self.description_model {
            description.model = Some(model);
            source_attribution.insert("description_model".to_string(), ConfigSource::Programmatic);
        }
        if let Some(model) = self.judge_model {
            judge.model = Some(model);
            source_attribution.insert("judge_model".to_string(), ConfigSource::Programmatic);
        }
        if let Some(endpoint) = self.endpoint {
            generation.endpoint = Some(endpoint.clone());
            description.endpoint = Some(endpoint.clone());
            judge.endpoint = Some(endpoint);
            for key in ["generation_endpoint", "description_endpoint", "judge_endpoint"] {
                source_attribution.insert(key.to_string(), ConfigSource::Programmatic);
            }
        }
        if let Some(var) = self.api_key_env {
            generation.api_key_env = Some(var.clone());
            description.api_key_env = Some(var.clone());
            judge.api_key_env = Some(var);
            for key in [
                "generation_api_key_env",
                "description_api_key_env",
                "judge_api_key_env",
            ] {
                source_attribution.insert(key.to_string(), ConfigSource::Programmatic);
            }
        }
        if let Some(timeout) = self.generation_timeout {
            generation.timeout_secs = Some(timeout.as_secs());
            source_attribution.insert(
                "generation_timeout_secs".to_string(),
                ConfigSource::Programmatic,
            );
        }
        if let Some(timeout) = self.description_timeout {
            description.timeout_secs = Some(timeout.as_secs());
            source_attribution.insert(
                "description_timeout_secs".to_string(),
                ConfigSource::Programmatic,
            );
        }
        if let Some(timeout) = self.judge_timeout {
            judge.timeout_secs = Some(timeout.as_secs());
            source_attribution.insert("judge_timeout_secs".to_string(), ConfigSource::Programmatic);
        }

        if let Some(retries) = self.max_validation_retries {
            defaults.max_validation_retries = Some(retries);
            source_attribution.insert(
                "max_validation_retries".to_string(),
                ConfigSource::Programmatic,
            );
        }
        if let Some(verbose) = self.verbose {
            defaults.verbose = Some(verbose);
            source_attribution.insert("verbose".to_string(), ConfigSource::Programmatic);
        }

        let config = Config {
            storage,
            cache,
            generation,
            description,
            judge,
            defaults,
            source_attribution,
        };

        // Validate the configuration
        config.validate()?;

        Ok(config)
    }
}
