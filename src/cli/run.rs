//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Builds CliArgs and discovers Config
//! - Wires the pipeline handle and the tokio runtime
//! - Dispatches to command handlers
//! - Handles all error output

use anyhow::Result;
use clap::Parser;
use std::str::FromStr;
use tracing::debug;

use super::args::{Cli, Commands};
use super::commands;

// Stable public API imports from crate root
use crate::{
    CliArgs, Config, DescribeAssetInput, EaselError, EaselHandle, ExitCode, GenerateImageInput,
    ValidateAssetInput,
};

// Internal module imports (not part of stable public API)
use easel_utils::error::ConfigError;
use easel_utils::logging::init_tracing;
use easel_utils::types::Dimensions;

/// Main CLI execution function.
///
/// This function handles ALL output including errors. It returns `Result<(), ExitCode>`:
/// - On success: returns `Ok(())` after printing any output
/// - On error: prints the error via [`EaselError::display_for_user`], returns `Err(ExitCode)`
///
/// main.rs only calls `std::process::exit(code.as_i32())` on error - it does NOT print.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    // Build CLI args for the configuration system (wired through build_cli)
    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        storage_root: cli.storage_root.clone(),
        provider: cli.provider.clone(),
        max_validation_retries: cli.max_validation_retries,
        verbose: Some(cli.verbose),
    };

    // Discover and load configuration
    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err.display_for_user());
            return Err(err.to_exit_code());
        }
    };

    // Logging is best-effort; a second init (tests, embedding) must not
    // kill the command.
    if let Err(e) = init_tracing(config.verbose()) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }
    debug!(
        storage_root = %config.storage_root(),
        generation_provider = %config.generation_settings().provider,
        judge_provider = %config.judge_settings().provider,
        "configuration resolved"
    );

    // Wire the pipeline: store, cache, services, orchestrators
    let handle = match EaselHandle::from_config(config) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("{}", err.display_for_user());
            return Err(err.to_exit_code());
        }
    };

    // Create tokio runtime for async operations
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let result = rt.block_on(async {
        match cli.command {
            Commands::Generate {
                prompt,
                quality,
                background,
                width,
                height,
                format,
                style,
                acceptance_criteria,
                validate,
                focus,
                include_base64,
                json,
            } => {
                let input = GenerateImageInput {
                    prompt,
                    quality: parse_field("quality", &quality)?,
                    background: parse_field("background", &background)?,
                    dimensions: Dimensions::new(width, height),
                    format: parse_field("image_format", &format)?,
                    style,
                    acceptance_criteria,
                    validate_output: validate,
                    validation_focus: focus,
                    // The global --max-validation-retries flag flows in
                    // through the configuration instead.
                    max_validation_retries: None,
                    include_base64,
                };
                commands::execute_generate_command(&handle, &input, json).await
            }
            Commands::Describe {
                uri,
                purpose,
                audience,
                structured,
                validate,
                focus,
                json,
            } => {
                let input = DescribeAssetInput {
                    uri,
                    purpose,
                    audience,
                    structure_detail: structured,
                    auto_validate: validate,
                    validation_focus: focus,
                    max_validation_retries: None,
                };
                commands::execute_describe_command(&handle, &input, json).await
            }
            Commands::Validate {
                uri,
                expected,
                structured,
                focus,
                json,
            } => {
                let input = ValidateAssetInput {
                    uri,
                    expected_description: expected,
                    structure_detail: structured,
                    evaluation_focus: focus,
                };
                commands::execute_validate_command(&handle, &input, json).await
            }
            Commands::Sweep { json } => commands::execute_sweep_command(&handle, json),
            Commands::Status { json } => commands::execute_status_command(&handle, json),
        }
    });

    // cli::run() handles ALL output including errors; the exit-code
    // mapping lives on EaselError, not here.
    if let Err(error) = result {
        if let Some(easel_error) = error.downcast_ref::<EaselError>() {
            eprintln!("{}", easel_error.display_for_user());
            return Err(easel_error.to_exit_code());
        }
        // Fallback for other error types; `:#` prints the context chain.
        eprintln!("✗ Unexpected error: {error:#}");
        eprintln!("\n  Run with --verbose for more detailed output");
        return Err(ExitCode::INTERNAL);
    }

    Ok(())
}

/// Parse one whitelisted argument into its typed form.
///
/// clap's `value_parser` whitelists already reject unknown spellings, so
/// a failure here means the whitelist and the type drifted apart; it is
/// reported as a configuration error rather than a panic.
fn parse_field<T>(key: &str, raw: &str) -> Result<T, EaselError>
where
    T: FromStr<Err = String>,
{
    raw.parse().map_err(|e: String| {
        EaselError::Config(ConfigError::InvalidValue {
            key: key.to_string(),
            value: e,
        })
    })
}
