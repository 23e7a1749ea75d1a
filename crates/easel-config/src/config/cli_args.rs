use std::path::PathBuf;

/// CLI argument overrides applied on top of file configuration.
///
/// The clap layer fills this in from parsed flags; `Config::discover`
/// applies the set fields with highest precedence. An all-`None` value
/// (via `Default`) yields pure file + defaults behavior, which is what
/// library consumers without a CLI should use.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Explicit config file path (`--config`). When set, discovery is
    /// skipped and a missing file is an error.
    pub config_path: Option<PathBuf>,
    /// Asset store root override (`--storage-root`).
    pub storage_root: Option<String>,
    /// Backend override applied to generation, description, and judge
    /// alike (`--provider`).
    pub provider: Option<String>,
    /// Validation retry budget override (`--max-validation-retries`).
    pub max_validation_retries: Option<u32>,
    /// Verbose logging (`--verbose`).
    pub verbose: Option<bool>,
}
