//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and the subcommand enum.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// easel - cached, judge-checked image generation pipeline
#[derive(Parser)]
#[command(name = "easel")]
#[command(about = "Generate, describe, and validate images through a cached, judge-checked pipeline")]
#[command(long_about = r#"
easel orchestrates image generation, description, and validation against
external generative services. A fingerprint cache sits in front of paid
generation calls (identical requests never generate twice), and an
automated judge gates optional validation retries behind them.

EXAMPLES:
  # Generate an image (cached by request fingerprint)
  easel generate "a lighthouse at dusk, oil painting"

  # Generate with validation: regenerate until the judge passes it
  easel generate "a red circle on white" --validate --focus "shape and color"

  # Describe a stored asset
  easel describe file:///path/to/asset-1712345678901-0001.png

  # Judge an asset against an expected description, once
  easel validate file:///path/to/asset.png --expected "a red circle on white"

  # Evict expired and over-budget assets
  easel sweep

  # Show storage occupancy, cache counters, and provider wiring
  easel status --json

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > EASEL_CONFIG env >
  ./easel.toml > user config dir > built-in defaults. Use --config for an
  explicit file, --provider to force a backend (openai or stub) for all
  three pipeline roles at once.

EXIT CODES:
  0 success (a fail verdict is a result, not an error), 1 internal,
  2 usage, 3 configuration, 4 service failure, 5 asset not found,
  6 judge reply out of contract
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Asset store root directory (overrides configuration)
    #[arg(long, global = true)]
    pub storage_root: Option<String>,

    /// Backend for generation, description, and judging alike
    #[arg(long, global = true, value_parser = ["openai", "stub"])]
    pub provider: Option<String>,

    /// Validation retry budget (regenerations after a fail verdict)
    #[arg(long, global = true)]
    pub max_validation_retries: Option<u32>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate an image from a prompt
    ///
    /// Identical requests are answered from the fingerprint cache without
    /// a new generation call. With --validate, an automated judge checks
    /// the artifact against the prompt (plus style and acceptance
    /// criteria) and failed attempts are regenerated up to the retry
    /// budget. An exhausted budget still returns the last artifact with
    /// its fail verdict attached.
    ///
    /// EXAMPLES:
    ///   easel generate "a lighthouse at dusk"
    ///   easel generate "a red circle" --validate --focus "shape and color"
    ///   easel generate "an app icon" --width 256 --height 256 --format WEBP
    ///   easel generate "inline art" --include-base64 --json
    Generate {
        /// Text prompt describing the image
        prompt: String,

        /// Rendering quality tier
        #[arg(long, default_value = "auto", value_parser = ["low", "medium", "high", "auto"])]
        quality: String,

        /// Background treatment
        #[arg(long, default_value = "auto", value_parser = ["opaque", "transparent", "auto"])]
        background: String,

        /// Image width in pixels
        #[arg(long, default_value = "1024")]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value = "1024")]
        height: u32,

        /// Output encoding
        #[arg(long, default_value = "PNG", value_parser = ["PNG", "JPEG", "WEBP"])]
        format: String,

        /// Style directive folded into the request (part of the fingerprint)
        #[arg(long)]
        style: Option<String>,

        /// Acceptance criteria the judge checks the artifact against
        #[arg(long)]
        acceptance_criteria: Option<String>,

        /// Validate the artifact with the judge before returning
        #[arg(long)]
        validate: bool,

        /// Aspect the judge should focus on
        #[arg(long)]
        focus: Option<String>,

        /// Include the artifact bytes as base64 in the output
        #[arg(long)]
        include_base64: bool,

        /// Output the result as canonical JSON
        #[arg(long)]
        json: bool,
    },

    /// Describe a stored asset
    ///
    /// Produces a natural-language summary of an asset already in the
    /// store. With --structured, the backend is asked for a JSON
    /// breakdown alongside the summary. With --validate, the judge checks
    /// the summary against the asset and poor summaries are re-described
    /// up to the retry budget. Descriptions are never cached.
    ///
    /// EXAMPLES:
    ///   easel describe file:///path/to/asset.png
    ///   easel describe /path/to/asset.png --purpose "alt text" --audience "screen readers"
    ///   easel describe file:///path/to/asset.png --structured --validate --json
    Describe {
        /// Asset URI (file:// form or bare path)
        uri: String,

        /// What the description will be used for
        #[arg(long)]
        purpose: Option<String>,

        /// Who the description is written for
        #[arg(long)]
        audience: Option<String>,

        /// Request a structured JSON breakdown alongside the summary
        #[arg(long)]
        structured: bool,

        /// Validate the summary with the judge before returning
        #[arg(long)]
        validate: bool,

        /// Aspect the judge should focus on
        #[arg(long)]
        focus: Option<String>,

        /// Output the result as canonical JSON
        #[arg(long)]
        json: bool,
    },

    /// Judge a stored asset against an expected description
    ///
    /// Obtains one fresh description of the asset and asks the judge to
    /// compare it (and the asset) to the expectation. Always a single
    /// judge call; a fail verdict is reported, never retried. The
    /// process exits 0 either way - read the verdict from the output.
    ///
    /// EXAMPLES:
    ///   easel validate file:///path/to/asset.png --expected "a red circle on white"
    ///   easel validate /path/to/asset.png --expected "corporate logo" --focus "colors" --json
    Validate {
        /// Asset URI (file:// form or bare path)
        uri: String,

        /// Description the asset is expected to match
        #[arg(long)]
        expected: Option<String>,

        /// Ask for a structured breakdown when describing the asset
        #[arg(long)]
        structured: bool,

        /// Aspect the judge should focus on
        #[arg(long)]
        focus: Option<String>,

        /// Output the result as canonical JSON
        #[arg(long)]
        json: bool,
    },

    /// Evict expired and over-budget assets from the store
    ///
    /// Deletes everything past the storage TTL, then the oldest survivors
    /// until the asset-count and byte caps are satisfied. Cache entries
    /// referencing deleted assets are invalidated. Per-asset delete
    /// failures are reported but never abort the sweep.
    ///
    /// EXAMPLES:
    ///   easel sweep
    ///   easel sweep --json
    Sweep {
        /// Output the sweep report as canonical JSON
        #[arg(long)]
        json: bool,
    },

    /// Show storage occupancy, cache counters, and provider wiring
    ///
    /// EXAMPLES:
    ///   easel status
    ///   easel status --json
    Status {
        /// Output the status report as canonical JSON
        #[arg(long)]
        json: bool,
    },
}

/// Build the CLI command structure without parsing arguments
/// This is used for introspection in tests and documentation validation
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
