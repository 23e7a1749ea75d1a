//! CLI command implementations
//!
//! This module contains the `execute_*` command handlers and their
//! rendering helpers. Each handler drives one subcommand through the
//! shared [`EaselHandle`] and prints either a human-readable summary or
//! canonical JSON.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    DescribeAssetInput, EaselHandle, GenerateImageInput, ValidateAssetInput, ValidationRecord,
    canonical_json,
};

/// Execute the generate command
pub async fn execute_generate_command(
    handle: &EaselHandle,
    input: &GenerateImageInput,
    json: bool,
) -> Result<()> {
    let output = handle.generate(input).await?;

    if json {
        return emit_json(&output, "generate");
    }

    if output.cached {
        println!("✓ Served from cache: {}", output.uri);
    } else {
        println!("✓ Generated: {}", output.uri);
    }
    if let Some(validation) = &output.validation {
        print_validation(validation);
    }
    if let Some(base64_data) = &output.base64_data {
        println!("  base64 payload: {} characters (use --json to capture it)", base64_data.len());
    }
    Ok(())
}

/// Execute the describe command
pub async fn execute_describe_command(
    handle: &EaselHandle,
    input: &DescribeAssetInput,
    json: bool,
) -> Result<()> {
    let output = handle.describe(input).await?;

    if json {
        return emit_json(&output, "describe");
    }

    println!("{}", output.summary);
    if let Some(detail) = &output.detail {
        let pretty =
            serde_json::to_string_pretty(detail).context("Failed to render structured detail")?;
        println!("\nDetail:\n{pretty}");
    }
    if let Some(validation) = &output.validation {
        print_validation(validation);
    }
    Ok(())
}

/// Execute the validate command
pub async fn execute_validate_command(
    handle: &EaselHandle,
    input: &ValidateAssetInput,
    json: bool,
) -> Result<()> {
    let output = handle.validate(input).await?;

    if json {
        return emit_json(&output, "validate");
    }

    print_validation(&output.validation);
    Ok(())
}

/// Execute the sweep command
pub fn execute_sweep_command(handle: &EaselHandle, json: bool) -> Result<()> {
    let report = handle.sweep()?;

    if json {
        return emit_json(&report, "sweep");
    }

    println!(
        "✓ Swept {} assets: {} deleted, {} bytes freed, {} cache entries invalidated",
        report.scanned, report.deleted, report.bytes_freed, report.cache_invalidated
    );
    for failure in &report.failures {
        eprintln!("  ✗ could not delete {}: {}", failure.uri, failure.reason);
    }
    Ok(())
}

/// Execute the status command
pub fn execute_status_command(handle: &EaselHandle, json: bool) -> Result<()> {
    let status = handle.status()?;

    if json {
        return emit_json(&status, "status");
    }

    println!("Storage: {}", status.storage.root);
    println!(
        "  assets: {}/{}  bytes: {}/{}",
        status.storage.asset_count,
        status.storage.max_assets,
        status.storage.total_bytes,
        status.storage.max_total_bytes
    );
    println!("Cache: {}", status.cache.dir);
    println!(
        "  entries: {}  hits: {}  misses: {}  coalesced: {}  hit ratio: {:.2}",
        status.cache.entries,
        status.cache.stats.hits,
        status.cache.stats.misses,
        status.cache.stats.coalesced,
        status.cache.hit_ratio
    );
    println!("Providers:");
    println!(
        "  generation:  {} ({})",
        status.providers.generation.provider, status.providers.generation.model
    );
    println!(
        "  description: {} ({})",
        status.providers.description.provider, status.providers.description.model
    );
    println!(
        "  judge:       {} ({})",
        status.providers.judge.provider, status.providers.judge.model
    );
    Ok(())
}

/// Emit a value as canonical JSON (JCS) for stable diffs and piping.
fn emit_json<T: Serialize>(value: &T, operation: &str) -> Result<()> {
    let canonical =
        canonical_json(value).with_context(|| format!("Failed to emit {operation} JSON"))?;
    println!("{canonical}");
    Ok(())
}

/// Render one validation record in the indented human format.
fn print_validation(record: &ValidationRecord) {
    let glyph = if record.verdict.is_pass() { "✓" } else { "✗" };
    println!(
        "  {glyph} verdict: {} (confidence {:.2}, attempt {})",
        record.verdict, record.confidence, record.attempt
    );
    println!("    {}", record.reason);
}
