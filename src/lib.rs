//! easel - Image generation pipeline with fingerprint caching and judged validation
//!
//! This crate provides a deterministic orchestration core for AI image workflows:
//! generation requests are normalized and fingerprinted, identical requests are
//! answered from cache or coalesced onto one in-flight call, and an automated
//! judge can validate artifacts and descriptions inside a bounded retry loop.
//!
//! easel can be used in two ways:
//! - **CLI**: Install via `cargo install easel` and run from command line
//! - **Library**: Add as a dependency and drive an [`EaselHandle`] from your application
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Generate an image (served from cache on repeat)
//! easel generate "a lighthouse at dusk"
//!
//! # Generate with judged validation and bounded retries
//! easel generate "a red circle" --validate --focus "shape and color"
//!
//! # Describe and validate stored assets
//! easel describe file:///path/to/asset.png --structured
//! easel validate file:///path/to/asset.png --expected "a red circle on white"
//!
//! # Evict expired assets; inspect the pipeline
//! easel sweep --json
//! easel status --json
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use easel::{Config, EaselHandle, GenerateImageInput};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::builder()
//!         .storage_root("/var/lib/easel/assets")
//!         .provider("stub")
//!         .build()?;
//!     let handle = EaselHandle::from_config(config)?;
//!
//!     let input: GenerateImageInput = serde_json::from_value(serde_json::json!({
//!         "prompt": "a lighthouse at dusk",
//!     }))?;
//!     let output = handle.generate(&input).await?;
//!     println!("{} (cached: {})", output.uri, output.cached);
//!     Ok(())
//! }
//! ```
//!
//! # JSON Contracts
//!
//! easel emits JSON in JCS (RFC 8785) canonical form for deterministic output:
//! the same report always serializes to the same bytes, so `--json` output is
//! stable under diffing and hashing. Use [`canonical_json`] for your own
//! integrations.
//!
//! # Stable Public API
//!
//! The following types are part of the stable public API:
//!
//! - [`EaselHandle`] - The wired pipeline: generate, describe, validate, sweep, status
//! - [`Config`] and [`ConfigBuilder`] - Configuration management
//! - [`EaselError`] - Library error type
//! - [`ExitCode`] - CLI exit codes
//! - The tool DTOs: [`GenerateImageInput`], [`DescribeAssetInput`], [`ValidateAssetInput`]
//!   and their outputs
//! - [`canonical_json`] - JCS canonical JSON emission
//!
//! Internal modules are accessible via module paths but are marked `#[doc(hidden)]`
//! and are not covered by semver stability guarantees.

// ============================================================================
// Stable Public API
// ============================================================================

/// Handle over a fully wired generation/description/validation pipeline.
///
/// Construct one with [`EaselHandle::from_config`] (backends selected by
/// configuration) or [`EaselHandle::with_services`] (explicit backends, the
/// seam tests and custom embedders use). Handles are cheap to clone and safe
/// to share across tasks.
pub use easel_engine::EaselHandle;

/// Inputs and outputs of the three pipeline operations.
///
/// These DTOs are the stable surface callers program against; the CLI builds
/// them from arguments and external dispatchers deserialize them from JSON.
pub use easel_engine::{
    DescribeAssetInput, DescribeAssetOutput, GenerateImageInput, GenerateImageOutput,
    ValidateAssetInput, ValidateAssetOutput,
};

/// Pipeline health as reported by [`EaselHandle::status`].
pub use easel_engine::{CacheStatus, ProviderInfo, ProviderStatus, StatusReport, StorageStatus};

/// Cleanup sweep results as reported by [`EaselHandle::sweep`].
pub use easel_engine::{SweepFailure, SweepReport};

/// Configuration for easel operations.
///
/// `Config` provides hierarchical configuration with discovery and precedence:
/// CLI arguments > environment > config file > built-in defaults.
///
/// Use [`Config::discover()`] for CLI-like behavior or [`Config::builder()`]
/// for programmatic configuration in embedding scenarios.
pub use easel_config::Config;

/// Builder for programmatic configuration.
///
/// `ConfigBuilder` allows constructing a [`Config`] without relying on
/// environment variables or config files, for embedders that need
/// deterministic behavior.
pub use easel_config::ConfigBuilder;

/// CLI argument structure for configuration override.
///
/// Used internally by the CLI and for programmatic configuration via
/// [`Config::discover()`].
pub use easel_config::CliArgs;

/// Library-level error type with rich context.
///
/// `EaselError` provides detailed error information including:
/// - User-friendly messages via [`display_for_user()`](EaselError::display_for_user)
/// - Exit code mapping via [`to_exit_code()`](EaselError::to_exit_code)
///
/// Library code returns `EaselError` and does NOT call `std::process::exit()`.
pub use easel_utils::error::EaselError;

/// Trait for providing user-friendly error reporting.
///
/// Implemented by [`EaselError`] and its component error types.
pub use easel_utils::error::UserFriendlyError;

/// Exit codes matching the documented exit code table.
///
/// `ExitCode` provides type-safe exit code handling. Use named constants
/// (e.g., [`ExitCode::SUCCESS`], [`ExitCode::JUDGE_INVALID`]) or
/// [`as_i32()`](ExitCode::as_i32) to get the numeric value.
pub use easel_utils::exit_codes::ExitCode;

/// JCS (RFC 8785) canonical JSON emission.
///
/// Canonical JSON ensures deterministic output for stable diffs and hash
/// verification; it is also what request fingerprints are computed over.
pub use easel_utils::fingerprint::canonical_json;

/// Content-addressed identity of a normalized generation request.
pub use easel_utils::fingerprint::Fingerprint;

/// Core request and verdict vocabulary shared across the pipeline.
pub use easel_utils::types::{
    AssetRequest, Background, Dimensions, ImageFormat, Quality, ValidationRecord, Verdict,
};

/// Cache lookup counters, embedded in [`CacheStatus`].
pub use easel_cache::CacheStats;

/// The three service handles the engine runs against, and the capability
/// traits behind them.
///
/// Implement the traits to bring your own backends and hand them to
/// [`EaselHandle::with_services`]; [`ServiceSet::from_config`] selects the
/// built-in ones ("openai" or "stub").
pub use easel_services::{DescriptionService, GenerationService, JudgeService, ServiceSet};

// ============================================================================
// Internal modules - accessible but not stable
// ============================================================================

#[doc(hidden)]
pub use easel_utils::{atomic_write, error, exit_codes, fingerprint, logging, paths, types};

#[doc(hidden)]
pub use easel_config as config;

#[doc(hidden)]
pub use easel_store as store;

#[doc(hidden)]
pub use easel_cache as cache;

#[doc(hidden)]
pub use easel_services as services;

#[doc(hidden)]
pub use easel_engine as engine;

// CLI module - internal implementation detail, not part of stable public API
// Exported with #[doc(hidden)] to allow white-box testing of CLI flag parsing
// External consumers should use EaselHandle, not CLI internals
#[doc(hidden)]
pub mod cli;
