use easel_utils::error::{ConfigError, EaselError};

use super::Config;

/// Upper bound on the validation retry budget. Each retry is a fresh
/// paid generation call, so the budget is kept small.
const MAX_VALIDATION_RETRIES_LIMIT: u32 = 10;

/// Per-call timeout bounds in seconds.
const MIN_TIMEOUT_SECS: u64 = 1;
const MAX_TIMEOUT_SECS: u64 = 3600;

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), EaselError> {
        if let Some(max_assets) = self.storage.max_assets
            && max_assets == 0
        {
            return Err(EaselError::Config(ConfigError::InvalidValue {
                key: "storage.max_assets".to_string(),
                value: "must be greater than 0".to_string(),
            }));
        }

        if let Some(max_bytes) = self.storage.max_total_bytes
            && max_bytes == 0
        {
            return Err(EaselError::Config(ConfigError::InvalidValue {
                key: "storage.max_total_bytes".to_string(),
                value: "must be greater than 0".to_string(),
            }));
        }

        if let Some(capacity) = self.cache.capacity
            && capacity == 0
        {
            return Err(EaselError::Config(ConfigError::InvalidValue {
                key: "cache.capacity".to_string(),
                value: "must be greater than 0".to_string(),
            }));
        }

        if let Some(retries) = self.defaults.max_validation_retries
            && retries > MAX_VALIDATION_RETRIES_LIMIT
        {
            return Err(EaselError::Config(ConfigError::InvalidValue {
                key: "defaults.max_validation_retries".to_string(),
                value: format!("exceeds maximum limit of {MAX_VALIDATION_RETRIES_LIMIT}"),
            }));
        }

        for (section, provider_config) in [
            ("generation", &self.generation),
            ("description", &self.description),
            ("judge", &self.judge),
        ] {
            if let Some(timeout) = provider_config.timeout_secs {
                if timeout < MIN_TIMEOUT_SECS {
                    return Err(EaselError::Config(ConfigError::InvalidValue {
                        key: format!("{section}.timeout_secs"),
                        value: format!("must be at least {MIN_TIMEOUT_SECS} second"),
                    }));
                }
                if timeout > MAX_TIMEOUT_SECS {
                    return Err(EaselError::Config(ConfigError::InvalidValue {
                        key: format!("{section}.timeout_secs"),
                        value: format!("exceeds maximum limit of {MAX_TIMEOUT_SECS} seconds"),
                    }));
                }
            }

            if let Some(model) = &provider_config.model
                && model.trim().is_empty()
            {
                return Err(EaselError::Config(ConfigError::InvalidValue {
                    key: format!("{section}.model"),
                    value: "must not be empty".to_string(),
                }));
            }
        }

        Ok(())
    }
}
