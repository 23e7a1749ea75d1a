use std::time::Duration;

use thiserror::Error;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `EaselError` is the primary error type returned by easel library
/// operations. It provides:
/// - Detailed error information for programmatic handling
/// - User-friendly messages with actionable suggestions
/// - Mapping to CLI exit codes for consistent error reporting
///
/// # Error Categories
///
/// | Category | Description |
/// |----------|-------------|
/// | `Config` | Configuration file or value errors |
/// | `Store` | Asset store lookup, write, and capacity errors |
/// | `Cache` | Cache persistence errors |
/// | `Service` | External generation/description/judge call failures |
/// | `Judge` | Judge responses that violate the verdict contract |
///
/// A judge verdict of `fail` is NOT an error: orchestrators return it as
/// a normal result. Errors here mean the pipeline could not produce a
/// result at all.
///
/// # Exit Code Mapping
///
/// Use [`to_exit_code()`](Self::to_exit_code) to map errors to CLI exit
/// codes:
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 3 | Configuration errors, service misconfiguration |
/// | 4 | External service failures (transport, auth, quota, timeout) |
/// | 5 | Asset not found |
/// | 6 | Judge response out of contract |
/// | 1 | Other errors |
///
/// Library code returns `EaselError` and does NOT call
/// `std::process::exit()`.
#[derive(Error, Debug)]
pub enum EaselError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Asset store error: {0}")]
    Store(#[from] StoreError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Judge error: {0}")]
    Judge(#[from] JudgeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fingerprint computation failed: {reason}")]
    FingerprintFailed { reason: String },
}

/// Trait for providing user-friendly error reporting with suggestions.
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::MissingRequired(key) => {
                format!("Required configuration '{key}' is missing")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => {
                format!("Configuration file not found: {path}")
            }
            Self::DiscoveryFailed { reason } => {
                format!("Failed to discover configuration: {reason}")
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax using a TOML validator".to_string(),
                "Compare with the example configuration in the documentation".to_string(),
            ],
            Self::MissingRequired(key) => vec![
                format!("Add '{key}' to easel.toml or pass the matching CLI flag"),
                "Check the documentation for required configuration options".to_string(),
            ],
            Self::InvalidValue { key, value: _ } => match key.as_str() {
                "storage.max_assets" | "storage.max_total_bytes" | "cache.capacity" => vec![
                    "Use a positive integer value".to_string(),
                ],
                "judge.provider" | "generation.provider" | "description.provider" => vec![
                    "Use 'openai' or 'stub' as the provider".to_string(),
                ],
                _ => vec![
                    "Check the documentation for valid values for this option".to_string(),
                    "Remove the option to use the default value".to_string(),
                ],
            },
            Self::NotFound { path: _ } => vec![
                "Create easel.toml in the working directory".to_string(),
                "Point EASEL_CONFIG at an existing configuration file".to_string(),
            ],
            Self::DiscoveryFailed { reason: _ } => vec![
                "Check file permissions on the configuration search paths".to_string(),
                "Pass --config with an explicit path".to_string(),
            ],
        }
    }
}

/// Errors raised by the asset store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Explicit lookup of an asset that is not in the store.
    #[error("Asset not found: {uri}")]
    NotFound { uri: String },

    /// A write was refused because it would exceed configured capacity.
    ///
    /// Orchestrators respond by sweeping and retrying the write once;
    /// callers only see this if the sweep freed nothing.
    #[error(
        "Store capacity exceeded: {asset_count}/{max_assets} assets, {total_bytes}/{max_bytes} bytes"
    )]
    CapacityExceeded {
        asset_count: usize,
        max_assets: usize,
        total_bytes: u64,
        max_bytes: u64,
    },

    #[error("Asset write failed at {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    /// URI with a scheme the store cannot resolve to a local path.
    #[error("Unresolvable asset URI: {uri}")]
    InvalidUri { uri: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UserFriendlyError for StoreError {
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { uri } => format!("Asset not found in store: {uri}"),
            Self::CapacityExceeded {
                asset_count,
                max_assets,
                total_bytes,
                max_bytes,
            } => format!(
                "Asset store is full ({asset_count}/{max_assets} assets, {total_bytes}/{max_bytes} bytes)"
            ),
            Self::WriteFailed { path, reason } => {
                format!("Failed to write asset at {path}: {reason}")
            }
            Self::InvalidUri { uri } => format!("Cannot resolve asset URI: {uri}"),
            Self::Io(err) => format!("Asset store IO error: {err}"),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotFound { uri: _ } => vec![
                "List stored assets with 'easel status'".to_string(),
                "The asset may have been evicted; regenerate it".to_string(),
            ],
            Self::CapacityExceeded { .. } => vec![
                "Run 'easel sweep' to evict expired assets".to_string(),
                "Raise storage.max_assets or storage.max_total_bytes in easel.toml".to_string(),
            ],
            Self::WriteFailed { .. } => vec![
                "Check disk space and permissions on the storage root".to_string(),
            ],
            Self::InvalidUri { uri: _ } => vec![
                "Use a file:// URI or a bare filesystem path".to_string(),
            ],
            Self::Io(_) => vec![
                "Check permissions on the storage root directory".to_string(),
            ],
        }
    }
}

/// Errors raised while persisting or loading durable cache entries.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache entry persist failed at {path}: {reason}")]
    PersistFailed { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during external service calls.
///
/// These cover the generation, description, and judge backends alike.
/// Service errors surface to the caller unchanged; the validation retry
/// loop never retries them.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Transport-level failure (HTTP connectivity, DNS, TLS)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider authentication failure (401, 403, missing API key)
    #[error("Provider authentication error: {0}")]
    Auth(String),

    /// Provider quota/rate limit exceeded (429)
    #[error("Provider quota exceeded: {0}")]
    Quota(String),

    /// Provider service outage (5xx errors)
    #[error("Provider outage: {0}")]
    Outage(String),

    /// Call exceeded its per-call timeout
    #[error("Timeout after {duration:?}")]
    Timeout { duration: Duration },

    /// Provider returned a payload the adapter cannot use
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// Provider configuration error
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),
}

impl UserFriendlyError for ServiceError {
    fn user_message(&self) -> String {
        match self {
            Self::Transport(msg) => format!("Service transport error: {msg}"),
            Self::Auth(msg) => format!("Service authentication failed: {msg}"),
            Self::Quota(msg) => format!("Service quota exceeded: {msg}"),
            Self::Outage(msg) => format!("Service outage: {msg}"),
            Self::Timeout { duration } => {
                format!("Service call timed out after {duration:?}")
            }
            Self::InvalidResponse(msg) => format!("Service returned unusable response: {msg}"),
            Self::Misconfiguration(msg) => format!("Service configuration error: {msg}"),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Transport(_) => vec![
                "Verify network connectivity to the provider endpoint".to_string(),
                "Check proxy and TLS settings".to_string(),
            ],
            Self::Auth(_) => vec![
                "Set the provider API key environment variable".to_string(),
                "Verify the key has access to the configured model".to_string(),
            ],
            Self::Quota(_) => vec![
                "Wait for the rate limit window to reset".to_string(),
                "Check provider usage limits and billing".to_string(),
            ],
            Self::Outage(_) => vec![
                "Retry later; provider outages are usually temporary".to_string(),
                "Check the provider status page".to_string(),
            ],
            Self::Timeout { .. } => vec![
                "Raise the per-call timeout in easel.toml".to_string(),
                "Try a lower quality tier for faster generation".to_string(),
            ],
            Self::InvalidResponse(_) => vec![
                "Verify the configured model supports image output".to_string(),
            ],
            Self::Misconfiguration(_) => vec![
                "Check the provider, model, and endpoint settings in easel.toml".to_string(),
            ],
        }
    }
}

/// Judge responses that violate the verdict contract.
///
/// The contract requires `verdict` of exactly "pass" or "fail",
/// `confidence` in [0.0, 1.0], and a non-empty `reason`. Anything else
/// is reported as-is; it is never coerced into a pass or a fail.
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error("Judge response invalid: {reason}")]
    ResponseInvalid { reason: String },
}

impl UserFriendlyError for JudgeError {
    fn user_message(&self) -> String {
        match self {
            Self::ResponseInvalid { reason } => {
                format!("Judge returned a response outside the verdict contract: {reason}")
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        vec![
            "Check that the judge model reliably emits the JSON verdict format".to_string(),
            "Try a stronger judge model in [judge] of easel.toml".to_string(),
        ]
    }
}

impl EaselError {
    /// Get a user-friendly error message with actionable suggestions.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Error: {}\n", self.user_message()));

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the appropriate CLI exit code.
    ///
    /// This is the single source of truth for exit codes; the CLI only
    /// forwards the value to `std::process::exit()`.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            EaselError::Config(_) => ExitCode::CONFIG,

            EaselError::Store(store_err) => match store_err {
                StoreError::NotFound { .. } => ExitCode::NOT_FOUND,
                _ => ExitCode::INTERNAL,
            },

            EaselError::Service(service_err) => match service_err {
                ServiceError::Misconfiguration(_) => ExitCode::CONFIG,
                _ => ExitCode::SERVICE_FAILURE,
            },

            EaselError::Judge(_) => ExitCode::JUDGE_INVALID,

            EaselError::Cache(_) | EaselError::Io(_) | EaselError::FingerprintFailed { .. } => {
                ExitCode::INTERNAL
            }
        }
    }
}

impl UserFriendlyError for EaselError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Store(err) => err.user_message(),
            Self::Service(err) => err.user_message(),
            Self::Judge(err) => err.user_message(),
            Self::Cache(err) => format!("Cache error: {err}"),
            Self::Io(err) => format!("IO error: {err}"),
            Self::FingerprintFailed { reason } => {
                format!("Fingerprint computation failed: {reason}")
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Store(err) => err.suggestions(),
            Self::Service(err) => err.suggestions(),
            Self::Judge(err) => err.suggestions(),
            Self::Cache(_) => vec![
                "Check permissions on the cache directory".to_string(),
            ],
            Self::Io(_) | Self::FingerprintFailed { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::ExitCode;

    #[test]
    fn not_found_maps_to_not_found_exit_code() {
        let err = EaselError::Store(StoreError::NotFound {
            uri: "file:///tmp/missing.png".to_string(),
        });
        assert_eq!(err.to_exit_code(), ExitCode::NOT_FOUND);
    }

    #[test]
    fn judge_contract_violation_maps_to_judge_invalid() {
        let err = EaselError::Judge(JudgeError::ResponseInvalid {
            reason: "missing field 'verdict'".to_string(),
        });
        assert_eq!(err.to_exit_code(), ExitCode::JUDGE_INVALID);
    }

    #[test]
    fn misconfiguration_maps_to_config_exit_code() {
        let err = EaselError::Service(ServiceError::Misconfiguration(
            "OPENAI_API_KEY is not set".to_string(),
        ));
        assert_eq!(err.to_exit_code(), ExitCode::CONFIG);

        let err = EaselError::Service(ServiceError::Outage("502 Bad Gateway".to_string()));
        assert_eq!(err.to_exit_code(), ExitCode::SERVICE_FAILURE);
    }

    #[test]
    fn display_for_user_includes_suggestions() {
        let err = EaselError::Store(StoreError::CapacityExceeded {
            asset_count: 256,
            max_assets: 256,
            total_bytes: 1024,
            max_bytes: 4096,
        });
        let rendered = err.display_for_user();
        assert!(rendered.starts_with("Error: "));
        assert!(rendered.contains("Suggestions:"));
        assert!(rendered.contains("easel sweep"));
    }

    #[test]
    fn capacity_exceeded_message_names_both_limits() {
        let err = StoreError::CapacityExceeded {
            asset_count: 10,
            max_assets: 256,
            total_bytes: 999,
            max_bytes: 1000,
        };
        let msg = err.to_string();
        assert!(msg.contains("10/256 assets"));
        assert!(msg.contains("999/1000 bytes"));
    }
}
