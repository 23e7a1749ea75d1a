use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use easel_utils::error::{ConfigError, EaselError};
use easel_utils::types::ConfigSource;

use super::{CacheConfig, CliArgs, Config, Defaults, ProviderConfig, StorageConfig};

/// TOML configuration file structure
#[derive(Debug, Deserialize, Serialize)]
struct TomlConfig {
    storage: Option<StorageConfig>,
    cache: Option<CacheConfig>,
    generation: Option<ProviderConfig>,
    description: Option<ProviderConfig>,
    judge: Option<ProviderConfig>,
    defaults: Option<Defaults>,
}

impl Config {
    /// Discover and load configuration with precedence:
    /// CLI > environment > file > defaults.
    ///
    /// Uses the current working directory for config file discovery when
    /// no explicit path is provided in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self, EaselError> {
        let start_dir = std::env::current_dir().map_err(|e| ConfigError::DiscoveryFailed {
            reason: format!("failed to get current directory: {e}"),
        })?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory.
    ///
    /// This is the path-driven variant used by tests to avoid
    /// process-global state. Uses the given directory for config file
    /// discovery when no explicit path is provided in `cli_args`.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self, EaselError> {
        let mut source_attribution = HashMap::new();

        // Start with built-in defaults
        let mut storage = StorageConfig::default();
        let mut cache = CacheConfig::default();
        let mut generation = ProviderConfig::default();
        let mut description = ProviderConfig::default();
        let mut judge = ProviderConfig::default();
        let mut defaults = Defaults::default();

        // Track default sources
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

        // Resolve the config file. An explicit --config path that does
        // not exist is an error; discovered fallbacks are optional.
        let config_path = if let Some(explicit_path) = &cli_args.config_path {
            if !explicit_path.exists() {
                return Err(ConfigError::NotFound {
                    path: explicit_path.display().to_string(),
                }
                .into());
            }
            Some(explicit_path.clone())
        } else {
            Self::discover_config_file_from(start_dir)?
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)?;
            let config_source = ConfigSource::Config;

            if let Some(file_storage) = file_config.storage {
                if file_storage.root.is_some() {
                    storage.root = file_storage.root;
                    source_attribution.insert("storage_root".to_string(), config_source.clone());
                }
                if file_storage.ttl_secs.is_some() {
                    storage.ttl_secs = file_storage.ttl_secs;
                    source_attribution
                        .insert("storage_ttl_secs".to_string(), config_source.clone());
                }
                if file_storage.max_assets.is_some() {
                    storage.max_assets = file_storage.max_assets;
                    source_attribution
                        .insert("storage_max_assets".to_string(), config_source.clone());
                }
                if file_storage.max_total_bytes.is_some() {
                    storage.max_total_bytes = file_storage.max_total_bytes;
                    source_attribution
                        .insert("storage_max_total_bytes".to_string(), config_source.clone());
                }
            }

            if let Some(file_cache) = file_config.cache {
                if file_cache.dir.is_some() {
                    cache.dir = file_cache.dir;
                    source_attribution.insert("cache_dir".to_string(), config_source.clone());
                }
                if file_cache.ttl_secs.is_some() {
                    cache.ttl_secs = file_cache.ttl_secs;
                    source_attribution.insert("cache_ttl_secs".to_string(), config_source.clone());
                }
                if file_cache.capacity.is_some() {
                    cache.capacity = file_cache.capacity;
                    source_attribution.insert("cache_capacity".to_string(), config_source.clone());
                }
            }

            merge_provider_section(
                &mut generation,
                file_config.generation,
                "generation",
                &mut source_attribution,
            );
            merge_provider_section(
                &mut description,
                file_config.description,
                "description",
                &mut source_attribution,
            );
            merge_provider_section(
                &mut judge,
                file_config.judge,
                "judge",
                &mut source_attribution,
            );

            if let Some(file_defaults) = file_config.defaults {
                if file_defaults.max_validation_retries.is_some() {
                    defaults.max_validation_retries = file_defaults.max_validation_retries;
                    source_attribution
                        .insert("max_validation_retries".to_string(), config_source.clone());
                }
                if file_defaults.verbose.is_some() {
                    defaults.verbose = file_defaults.verbose;
                    source_attribution.insert("verbose".to_string(), config_source.clone());
                }
            }
        }

        // Environment override: EASEL_PROVIDER applies to all three
        // backends. CLI flags still win below.
        if let Ok(env_provider) = env::var("EASEL_PROVIDER")
            && !env_provider.is_empty()
        {
            generation.provider = Some(env_provider.clone());
            description.provider = Some(env_provider.clone());
            judge.provider = Some(env_provider);
            for key in ["generation_provider", "description_provider", "judge_provider"] {
                source_attribution.insert(key.to_string(), ConfigSource::Env);
            }
        }

        // Apply CLI overrides (highest priority)
        if let Some(root) = &cli_args.storage_root {
            storage.root = Some(root.clone());
            source_attribution.insert("storage_root".to_string(), ConfigSource::Cli);
        }
        if let Some(provider) = &cli_args.provider {
            generation.provider = Some(provider.clone());
            description.provider = Some(provider.clone());
            judge.provider = Some(provider.clone());
            for key in ["generation_provider", "description_provider", "judge_provider"] {
                source_attribution.insert(key.to_string(), ConfigSource::Cli);
            }
        }
        if let Some(retries) = cli_args.max_validation_retries {
            defaults.max_validation_retries = Some(retries);
            source_attribution.insert("max_validation_retries".to_string(), ConfigSource::Cli);
        }
        if let Some(verbose) = cli_args.verbose {
            defaults.verbose = Some(verbose);
            source_attribution.insert("verbose".to_string(), ConfigSource::Cli);
        }

        let config = Self {
            storage,
            cache,
            generation,
            description,
            judge,
            defaults,
            source_attribution,
        };

        // Validate the final configuration
        config.validate()?;

        Ok(config)
    }

    /// Resolve the config file location without loading it.
    ///
    /// Precedence: `EASEL_CONFIG` environment variable (an error if set
    /// but missing), `easel.toml` in the start directory, then
    /// `easel/easel.toml` under the user config directory. Returns
    /// `None` when no file exists anywhere.
    pub fn discover_config_file_from(start_dir: &Path) -> Result<Option<PathBuf>, EaselError> {
        if let Ok(env_path) = env::var("EASEL_CONFIG")
            && !env_path.is_empty()
        {
            let path = PathBuf::from(env_path);
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            return Ok(Some(path));
        }

        let local = start_dir.join("easel.toml");
        if local.exists() {
            return Ok(Some(local));
        }

        if let Some(user_config_dir) = dirs::config_dir() {
            let user = user_config_dir.join("easel").join("easel.toml");
            if user.exists() {
                return Ok(Some(user));
            }
        }

        Ok(None)
    }

    /// Load configuration from TOML file
    fn load_config_file(path: &Path) -> Result<TomlConfig, EaselError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config: TomlConfig =
                    toml::from_str(&content).map_err(|e| ConfigError::InvalidFile(
                        format!("{}: {e}", path.display()),
                    ))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // The file vanished between discovery and load; behave
                // as if it was never found.
                Ok(TomlConfig {
                    storage: None,
                    cache: None,
                    generation: None,
                    description: None,
                    judge: None,
                    defaults: None,
                })
            }
            Err(e) => Err(ConfigError::DiscoveryFailed {
                reason: format!("failed to read {}: {e}", path.display()),
            }
            .into()),
        }
    }

    /// Discover configuration from environment and filesystem.
    ///
    /// This is the recommended entry point for library consumers who
    /// want CLI-like behavior without constructing `CliArgs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined, a
    /// config file exists but cannot be parsed, or validation fails.
    pub fn discover_from_env_and_fs() -> Result<Self, EaselError> {
        let cli_args = CliArgs::default();
        Self::discover(&cli_args)
    }
}

/// Apply one `[generation]`/`[description]`/`[judge]` file section on
/// top of the in-progress value, field by field.
fn merge_provider_section(
    target: &mut ProviderConfig,
    file_section: Option<ProviderConfig>,
    section: &str,
    source_attribution: &mut HashMap<String, ConfigSource>,
) {
    let Some(file_section) = file_section else {
        return;
    };

    if file_section.provider.is_some() {
        target.provider = file_section.provider;
        source_attribution.insert(format!("{section}_provider"), ConfigSource::Config);
    }
    if file_section.model.is_some() {
        target.model = file_section.model;
        source_attribution.insert(format!("{section}_model"), ConfigSource::Config);
    }
    if file_section.endpoint.is_some() {
        target.endpoint = file_section.endpoint;
        source_attribution.insert(format!("{section}_endpoint"), ConfigSource::Config);
    }
    if file_section.api_key_env.is_some() {
        target.api_key_env = file_section.api_key_env;
        source_attribution.insert(format!("{section}_api_key_env"), ConfigSource::Config);
    }
    if file_section.timeout_secs.is_some() {
        target.timeout_secs = file_section.timeout_secs;
        source_attribution.insert(format!("{section}_timeout_secs"), ConfigSource::Config);
    }
}
