//! Command-line interface for easel
//!
//! This module provides the CLI commands and argument parsing for the
//! easel binary: generation, description, validation, sweeping, and
//! status over one shared pipeline handle.
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions and parsing structures (clap)
//! - `run`: Main entry point and command dispatch
//! - `commands`: Command implementations and helpers
//! - `tests`: Test module (cfg(test) only)

pub mod args;
mod commands;
mod run;


// Re-export argument types
pub use args::{build_cli, Cli, Commands};

// Re-export run function
pub use run::run;
