//! Description and standalone validation through the public handle.
//!
//! Descriptions are never cached; every describe call reaches the
//! backend. Auto-validation shares the judged-retry machinery with
//! generation, while standalone validation is always a single call.

mod test_support;

use tempfile::TempDir;

use easel::{DescribeAssetInput, EaselError, ExitCode, ValidateAssetInput, Verdict};
use test_support::{FAIL, PASS, generate_input, handle_with_judge, stub_handle};

async fn generated_uri(handle: &easel::EaselHandle, prompt: &str) -> String {
    handle.generate(&generate_input(prompt)).await.unwrap().uri
}

fn describe_input(uri: &str) -> DescribeAssetInput {
    serde_json::from_value(serde_json::json!({ "uri": uri })).unwrap()
}

#[tokio::test]
async fn a_description_summarizes_the_stored_asset() {
    let dir = TempDir::new().unwrap();
    let handle = stub_handle(&dir);
    let uri = generated_uri(&handle, "a describable square").await;

    let input: DescribeAssetInput = serde_json::from_value(serde_json::json!({
        "uri": uri,
        "purpose": "alt text",
        "audience": "screen readers",
    }))
    .unwrap();

    let output = handle.describe(&input).await.unwrap();
    assert!(output.summary.contains("PNG"), "summary: {}", output.summary);
    assert!(output.summary.contains("alt text"));
    assert!(output.summary.contains("screen readers"));
    assert!(output.detail.is_none());
    assert!(output.validation.is_none());
}

#[tokio::test]
async fn structure_detail_yields_a_parsed_breakdown() {
    let dir = TempDir::new().unwrap();
    let handle = stub_handle(&dir);
    let uri = generated_uri(&handle, "a structured subject").await;

    let input: DescribeAssetInput = serde_json::from_value(serde_json::json!({
        "uri": uri,
        "structure_detail": true,
    }))
    .unwrap();

    let output = handle.describe(&input).await.unwrap();
    let detail = output.detail.expect("structured detail requested");
    assert!(detail["byte_len"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn a_bare_path_resolves_like_a_file_uri() {
    let dir = TempDir::new().unwrap();
    let handle = stub_handle(&dir);
    let uri = generated_uri(&handle, "a path-addressed asset").await;
    let path = uri.strip_prefix("file://").unwrap();

    let output = handle.describe(&describe_input(path)).await.unwrap();
    assert!(output.summary.contains("PNG"));
}

#[tokio::test]
async fn auto_validation_attaches_a_verdict_to_the_description() {
    let dir = TempDir::new().unwrap();
    let handle = handle_with_judge(&dir, &[PASS]);
    let uri = generated_uri(&handle, "a validated description").await;

    let input: DescribeAssetInput = serde_json::from_value(serde_json::json!({
        "uri": uri,
        "auto_validate": true,
    }))
    .unwrap();

    let output = handle.describe(&input).await.unwrap();
    let record = output.validation.expect("auto-validation requested");
    assert_eq!(record.verdict, Verdict::Pass);
    assert_eq!(record.attempt, 1);
}

#[tokio::test]
async fn a_rejected_description_is_retried_within_budget() {
    let dir = TempDir::new().unwrap();
    let handle = handle_with_judge(&dir, &[FAIL, PASS]);
    let uri = generated_uri(&handle, "a twice-described asset").await;

    let input: DescribeAssetInput = serde_json::from_value(serde_json::json!({
        "uri": uri,
        "auto_validate": true,
        "max_validation_retries": 1,
    }))
    .unwrap();

    let output = handle.describe(&input).await.unwrap();
    let record = output.validation.unwrap();
    assert_eq!(record.verdict, Verdict::Pass);
    assert_eq!(record.attempt, 2);
}

#[tokio::test]
async fn an_exhausted_description_budget_keeps_the_failing_record() {
    let dir = TempDir::new().unwrap();
    let handle = handle_with_judge(&dir, &[FAIL, FAIL]);
    let uri = generated_uri(&handle, "an unconvincing subject").await;

    let input: DescribeAssetInput = serde_json::from_value(serde_json::json!({
        "uri": uri,
        "auto_validate": true,
        "max_validation_retries": 1,
    }))
    .unwrap();

    let output = handle.describe(&input).await.unwrap();
    let record = output.validation.unwrap();
    assert_eq!(record.verdict, Verdict::Fail);
    assert_eq!(record.attempt, 2);
    // The last summary is still returned alongside the failing record.
    assert!(!output.summary.is_empty());
}

#[tokio::test]
async fn standalone_validation_is_a_single_judge_call() {
    let dir = TempDir::new().unwrap();
    // One reply only: a retry would exhaust the script and panic.
    let handle = handle_with_judge(&dir, &[FAIL]);
    let uri = generated_uri(&handle, "a judged-once asset").await;

    let input: ValidateAssetInput = serde_json::from_value(serde_json::json!({
        "uri": uri,
        "expected_description": "a corporate logo",
    }))
    .unwrap();

    // A fail verdict is a successful return carrying the record.
    let output = handle.validate(&input).await.unwrap();
    assert_eq!(output.validation.verdict, Verdict::Fail);
    assert_eq!(output.validation.attempt, 1);
}

#[tokio::test]
async fn describing_a_missing_asset_is_not_found() {
    let dir = TempDir::new().unwrap();
    let handle = stub_handle(&dir);

    let err = handle
        .describe(&describe_input("file:///nope/asset-1-0000.png"))
        .await
        .unwrap_err();
    assert!(matches!(err, EaselError::Store(_)));
    assert_eq!(err.to_exit_code(), ExitCode::NOT_FOUND);
}

#[tokio::test]
async fn descriptions_are_never_served_from_the_fingerprint_cache() {
    let dir = TempDir::new().unwrap();
    let handle = stub_handle(&dir);
    let uri = generated_uri(&handle, "a twice-read asset").await;

    handle.describe(&describe_input(&uri)).await.unwrap();
    handle.describe(&describe_input(&uri)).await.unwrap();

    // Only the generation touched the cache; describe calls leave its
    // counters alone.
    let status = handle.status().unwrap();
    assert_eq!(status.cache.stats.hits, 0);
    assert_eq!(status.cache.entries, 1);
}
