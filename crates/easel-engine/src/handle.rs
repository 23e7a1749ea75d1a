//! The embedding surface: one [`EaselHandle`] owning the wired pipeline.
//!
//! A handle holds the asset store, the fingerprint cache, the three
//! service backends, and the orchestrators built over them. Library
//! embedders construct one from a [`Config`] and call the typed
//! operations; the CLI binary is a thin argument layer over the same
//! handle. Handles are cheap to clone and safe to share across tasks.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;

use easel_cache::{AssetCache, CacheLimits, CacheStats, FlightMap};
use easel_config::{Config, ProviderSettings};
use easel_services::ServiceSet;
use easel_store::{AssetStore, StoreLimits};
use easel_utils::error::EaselError;

use crate::description::DescriptionOrchestrator;
use crate::generation::GenerationOrchestrator;
use crate::judge::JudgeAdapter;
use crate::sweeper::{CleanupSweeper, SweepReport};
use crate::tools::{
    DescribeAssetInput, DescribeAssetOutput, GenerateImageInput, GenerateImageOutput,
    ValidateAssetInput, ValidateAssetOutput,
};

/// Point-in-time pipeline health, as reported by [`EaselHandle::status`].
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub storage: StorageStatus,
    pub cache: CacheStatus,
    pub providers: ProviderStatus,
}

/// Asset store occupancy against its configured limits.
#[derive(Debug, Clone, Serialize)]
pub struct StorageStatus {
    pub root: String,
    pub asset_count: usize,
    pub total_bytes: u64,
    pub max_assets: usize,
    pub max_total_bytes: u64,
}

/// Cache occupancy and lookup counters for this process.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub dir: String,
    pub entries: usize,
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_ratio: f64,
}

/// Which backend serves each pipeline role.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub generation: ProviderInfo,
    pub description: ProviderInfo,
    pub judge: ProviderInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderInfo {
    pub provider: String,
    pub model: String,
}

impl From<ProviderSettings> for ProviderInfo {
    fn from(settings: ProviderSettings) -> Self {
        Self {
            provider: settings.provider,
            model: settings.model,
        }
    }
}

/// Handle over a fully wired generation/description/validation pipeline.
#[derive(Clone)]
pub struct EaselHandle {
    config: Config,
    store: Arc<AssetStore>,
    cache: Arc<AssetCache>,
    generation: GenerationOrchestrator,
    description: DescriptionOrchestrator,
    sweeper: CleanupSweeper,
}

impl std::fmt::Debug for EaselHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EaselHandle").finish_non_exhaustive()
    }
}

impl EaselHandle {
    /// Construct a handle with backends selected by the configuration.
    ///
    /// # Errors
    ///
    /// Fails when a backend is misconfigured (unknown provider, missing
    /// API key) or when the storage root or cache directory cannot be
    /// prepared.
    pub fn from_config(config: Config) -> Result<Self, EaselError> {
        let services = ServiceSet::from_config(&config)?;
        Self::with_services(config, services)
    }

    /// Construct a handle around an explicit [`ServiceSet`].
    ///
    /// This is the seam tests and embedders with custom backends use;
    /// [`from_config`](Self::from_config) goes through it too.
    ///
    /// # Errors
    ///
    /// Fails when the storage root or cache directory cannot be
    /// prepared.
    pub fn with_services(config: Config, services: ServiceSet) -> Result<Self, EaselError> {
        let store = Arc::new(AssetStore::new(
            config.storage_root(),
            StoreLimits {
                max_assets: config.max_assets(),
                max_total_bytes: config.max_total_bytes(),
            },
        )?);
        let cache = Arc::new(AssetCache::new(
            config.cache_dir(),
            CacheLimits {
                ttl: config.cache_ttl(),
                max_entries: config.cache_capacity(),
            },
        )?);
        let sweeper = CleanupSweeper::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            config.storage_ttl(),
        );
        let judge = JudgeAdapter::new(services.judge, config.judge_settings().timeout);
        let generation = GenerationOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            FlightMap::new(),
            services.generation,
            judge.clone(),
            sweeper.clone(),
            config.generation_settings().timeout,
        );
        let description = DescriptionOrchestrator::new(
            Arc::clone(&store),
            services.description,
            judge,
            config.description_settings().timeout,
        );

        Ok(Self {
            config,
            store,
            cache,
            generation,
            description,
            sweeper,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generate an image, deduplicated by request fingerprint.
    ///
    /// # Errors
    ///
    /// Propagates generation, storage, and judge failures; a verdict of
    /// `fail` after the retry budget is a successful return carrying
    /// the failing record, not an error.
    pub async fn generate(
        &self,
        input: &GenerateImageInput,
    ) -> Result<GenerateImageOutput, EaselError> {
        let request = input.asset_request();
        let options = input.generate_options(self.config.max_validation_retries());
        let outcome = self.generation.generate(&request, &options).await?;

        let base64_data = if input.include_base64 {
            let bytes = self.store.get(&outcome.uri)?;
            Some(BASE64.encode(&bytes))
        } else {
            None
        };

        Ok(GenerateImageOutput {
            uri: outcome.uri,
            base64_data,
            validation: outcome.validation,
            cached: outcome.cached,
        })
    }

    /// Describe a stored asset, optionally validating the summary.
    ///
    /// # Errors
    ///
    /// Fails when the asset is missing or a backend call fails.
    pub async fn describe(
        &self,
        input: &DescribeAssetInput,
    ) -> Result<DescribeAssetOutput, EaselError> {
        let options = input.describe_options(self.config.max_validation_retries());
        let result = self.description.describe(&input.uri, &options).await?;

        Ok(DescribeAssetOutput {
            summary: result.summary,
            detail: result.detail,
            validation: result.validation,
        })
    }

    /// Judge a stored asset against an expected description, once.
    ///
    /// # Errors
    ///
    /// Fails when the asset is missing or a backend call fails; a
    /// `fail` verdict is a successful return.
    pub async fn validate(
        &self,
        input: &ValidateAssetInput,
    ) -> Result<ValidateAssetOutput, EaselError> {
        let options = input.validate_options();
        let validation = self.description.validate_asset(&input.uri, &options).await?;
        Ok(ValidateAssetOutput { validation })
    }

    /// Run one cleanup sweep over the asset store.
    ///
    /// # Errors
    ///
    /// Fails only when the store cannot be listed; per-asset delete
    /// failures are carried in the report.
    pub fn sweep(&self) -> Result<SweepReport, EaselError> {
        self.sweeper.sweep()
    }

    /// Snapshot storage occupancy, cache counters, and provider wiring.
    ///
    /// # Errors
    ///
    /// Fails when the store cannot be listed.
    pub fn status(&self) -> Result<StatusReport, EaselError> {
        let usage = self.store.usage()?;
        let limits = self.store.limits();
        let stats = self.cache.stats();

        Ok(StatusReport {
            storage: StorageStatus {
                root: self.store.root().to_string(),
                asset_count: usage.asset_count,
                total_bytes: usage.total_bytes,
                max_assets: limits.max_assets,
                max_total_bytes: limits.max_total_bytes,
            },
            cache: CacheStatus {
                dir: self.cache.cache_dir().to_string(),
                entries: self.cache.entry_count(),
                hit_ratio: stats.hit_ratio(),
                stats,
            },
            providers: ProviderStatus {
                generation: self.config.generation_settings().into(),
                description: self.config.description_settings().into(),
                judge: self.config.judge_settings().into(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use tempfile::TempDir;

    fn stub_config(dir: &TempDir) -> Config {
        let root = dir.path().join("assets");
        let cache = dir.path().join("cache");
        Config::builder()
            .storage_root(root.to_str().unwrap())
            .cache_dir(cache.to_str().unwrap())
            .provider("stub")
            .build()
            .unwrap()
    }

    fn handle_in(dir: &TempDir) -> EaselHandle {
        EaselHandle::from_config(stub_config(dir)).unwrap()
    }

    fn generate_input(prompt: &str) -> GenerateImageInput {
        serde_json::from_value(json!({
            "prompt": prompt,
            "dimensions": [32, 32],
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn the_stub_pipeline_runs_end_to_end() {
        let dir = TempDir::new().unwrap();
        let handle = handle_in(&dir);

        let generated = handle.generate(&generate_input("a green square")).await.unwrap();
        assert!(generated.uri.starts_with("file://"));
        assert!(!generated.cached);

        let describe: DescribeAssetInput =
            serde_json::from_value(json!({ "uri": generated.uri })).unwrap();
        let described = handle.describe(&describe).await.unwrap();
        assert!(described.summary.contains("PNG"));

        let validate: ValidateAssetInput = serde_json::from_value(json!({
            "uri": generated.uri,
            "expected_description": "a solid green placeholder",
        }))
        .unwrap();
        let validated = handle.validate(&validate).await.unwrap();
        assert!(validated.validation.verdict.is_pass());
        assert_eq!(validated.validation.attempt, 1);
    }

    #[tokio::test]
    async fn a_repeat_generation_is_served_from_cache() {
        let dir = TempDir::new().unwrap();
        let handle = handle_in(&dir);

        let first = handle.generate(&generate_input("a lighthouse at dusk")).await.unwrap();
        let second = handle.generate(&generate_input("a lighthouse at dusk")).await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.uri, second.uri);
    }

    #[tokio::test]
    async fn include_base64_round_trips_the_artifact() {
        let dir = TempDir::new().unwrap();
        let handle = handle_in(&dir);

        let input: GenerateImageInput = serde_json::from_value(json!({
            "prompt": "an inline thumbnail",
            "dimensions": [16, 16],
            "include_base64": true,
        }))
        .unwrap();

        let output = handle.generate(&input).await.unwrap();
        let bytes = BASE64.decode(output.base64_data.unwrap()).unwrap();
        // PNG signature.
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[tokio::test]
    async fn validation_rides_along_when_requested() {
        let dir = TempDir::new().unwrap();
        let handle = handle_in(&dir);

        let input: GenerateImageInput = serde_json::from_value(json!({
            "prompt": "a validated render",
            "dimensions": [16, 16],
            "validate_output": true,
        }))
        .unwrap();

        let output = handle.generate(&input).await.unwrap();
        let record = output.validation.expect("validation requested");
        assert!(record.verdict.is_pass());
    }

    #[tokio::test]
    async fn sweep_clears_expired_assets_through_the_handle() {
        let dir = TempDir::new().unwrap();
        let config = Config::builder()
            .storage_root(dir.path().join("assets").to_str().unwrap())
            .cache_dir(dir.path().join("cache").to_str().unwrap())
            .provider("stub")
            .storage_ttl(Duration::ZERO)
            .build()
            .unwrap();
        let handle = EaselHandle::from_config(config).unwrap();

        handle.generate(&generate_input("soon to expire")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let report = handle.sweep().unwrap();
        assert_eq!(report.deleted, 1);
        assert_eq!(report.cache_invalidated, 1);

        // The next identical request regenerates instead of chasing the
        // deleted file.
        let again = handle.generate(&generate_input("soon to expire")).await.unwrap();
        assert!(!again.cached);
    }

    #[tokio::test]
    async fn status_reflects_storage_cache_and_providers() {
        let dir = TempDir::new().unwrap();
        let handle = handle_in(&dir);

        handle.generate(&generate_input("status check")).await.unwrap();
        handle.generate(&generate_input("status check")).await.unwrap();

        let status = handle.status().unwrap();
        assert_eq!(status.storage.asset_count, 1);
        assert!(status.storage.total_bytes > 0);
        assert_eq!(status.storage.max_assets, 256);
        assert_eq!(status.cache.entries, 1);
        assert_eq!(status.cache.stats.hits, 1);
        assert_eq!(status.cache.stats.misses, 1);
        assert!((status.cache.hit_ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(status.providers.generation.provider, "stub");
        assert_eq!(status.providers.judge.provider, "stub");
    }

    #[test]
    fn status_report_serializes_for_json_output() {
        let report = StatusReport {
            storage: StorageStatus {
                root: "/tmp/assets".into(),
                asset_count: 3,
                total_bytes: 4096,
                max_assets: 256,
                max_total_bytes: 268_435_456,
            },
            cache: CacheStatus {
                dir: "/tmp/cache".into(),
                entries: 2,
                stats: CacheStats::default(),
                hit_ratio: 0.0,
            },
            providers: ProviderStatus {
                generation: ProviderInfo {
                    provider: "stub".into(),
                    model: "gpt-image-1".into(),
                },
                description: ProviderInfo {
                    provider: "stub".into(),
                    model: "gpt-4o-mini".into(),
                },
                judge: ProviderInfo {
                    provider: "stub".into(),
                    model: "gpt-4o-mini".into(),
                },
            },
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["storage"]["asset_count"], 3);
        assert_eq!(value["cache"]["hits"], 0);
        assert_eq!(value["providers"]["generation"]["provider"], "stub");
    }
}
