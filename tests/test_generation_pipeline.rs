//! Generation pipeline integration: fingerprint caching, flight
//! coalescing, and judged retries through the public handle.

mod test_support;

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use easel::{EaselError, ExitCode, Verdict};
use test_support::{
    CountingGeneration, FAIL, FailingGeneration, PASS, ScriptedJudge, generate_input, handle_with,
    stub_handle,
};

#[tokio::test]
async fn a_generated_artifact_lands_on_disk() {
    let dir = TempDir::new().unwrap();
    let handle = stub_handle(&dir);

    let output = handle.generate(&generate_input("a teal square")).await.unwrap();
    assert!(!output.cached);

    let path = output.uri.strip_prefix("file://").expect("file uri");
    let bytes = std::fs::read(path).unwrap();
    // The stub renders a real PNG.
    assert_eq!(&bytes[..4], b"\x89PNG");
}

#[tokio::test]
async fn an_identical_request_never_generates_twice() {
    let dir = TempDir::new().unwrap();
    let generation = CountingGeneration::new();
    let handle = handle_with(&dir, Arc::clone(&generation), ScriptedJudge::new(&[]));

    let first = handle.generate(&generate_input("a lighthouse")).await.unwrap();
    let second = handle.generate(&generate_input("a lighthouse")).await.unwrap();

    assert_eq!(first.uri, second.uri);
    assert!(second.cached);
    assert_eq!(generation.call_count(), 1);
}

#[tokio::test]
async fn the_cache_survives_a_fresh_handle_over_the_same_directories() {
    let dir = TempDir::new().unwrap();

    let first = {
        let handle = stub_handle(&dir);
        handle.generate(&generate_input("a durable entry")).await.unwrap()
    };

    // A brand-new handle over the same storage sees the disk cache and
    // answers without touching the generation service at all.
    let generation = CountingGeneration::new();
    let handle = handle_with(&dir, Arc::clone(&generation), ScriptedJudge::new(&[]));
    let second = handle.generate(&generate_input("a durable entry")).await.unwrap();

    assert!(second.cached);
    assert_eq!(second.uri, first.uri);
    assert_eq!(generation.call_count(), 0);
}

#[tokio::test]
async fn behavior_switches_resolve_to_the_same_cache_entry() {
    let dir = TempDir::new().unwrap();
    let generation = CountingGeneration::new();
    let handle = handle_with(&dir, Arc::clone(&generation), ScriptedJudge::new(&[]));

    let plain = handle.generate(&generate_input("a lake")).await.unwrap();

    let mut with_base64 = generate_input("a lake");
    with_base64.include_base64 = true;
    let echoed = handle.generate(&with_base64).await.unwrap();

    assert!(echoed.cached);
    assert_eq!(echoed.uri, plain.uri);
    assert_eq!(generation.call_count(), 1);
}

#[tokio::test]
async fn a_failed_verdict_regenerates_and_passes_on_the_second_attempt() {
    let dir = TempDir::new().unwrap();
    let generation = CountingGeneration::new();
    let handle = handle_with(
        &dir,
        Arc::clone(&generation),
        ScriptedJudge::new(&[FAIL, PASS]),
    );

    let mut input = generate_input("a red circle");
    input.validate_output = true;
    input.max_validation_retries = Some(1);

    let output = handle.generate(&input).await.unwrap();
    let record = output.validation.unwrap();
    assert_eq!(record.verdict, Verdict::Pass);
    assert_eq!(record.attempt, 2);
    assert_eq!(generation.call_count(), 2);
}

#[tokio::test]
async fn an_exhausted_retry_budget_returns_the_failing_record() {
    let dir = TempDir::new().unwrap();
    let generation = CountingGeneration::new();
    let handle = handle_with(
        &dir,
        Arc::clone(&generation),
        ScriptedJudge::new(&[FAIL, FAIL]),
    );

    let mut input = generate_input("an impossible render");
    input.validate_output = true;
    input.max_validation_retries = Some(1);

    // Exhaustion is a completed call, not an error.
    let output = handle.generate(&input).await.unwrap();
    let record = output.validation.unwrap();
    assert_eq!(record.verdict, Verdict::Fail);
    assert_eq!(record.attempt, 2);
    assert_eq!(generation.call_count(), 2);

    // The failing record is cached; a later hit reports it unchanged.
    let hit = handle.generate(&input).await.unwrap();
    assert!(hit.cached);
    assert_eq!(hit.validation.unwrap().verdict, Verdict::Fail);
    assert_eq!(generation.call_count(), 2);
}

#[tokio::test]
async fn a_zero_retry_budget_judges_exactly_once() {
    let dir = TempDir::new().unwrap();
    let generation = CountingGeneration::new();
    let handle = handle_with(
        &dir,
        Arc::clone(&generation),
        ScriptedJudge::new(&[FAIL]),
    );

    let mut input = generate_input("one shot");
    input.validate_output = true;
    input.max_validation_retries = Some(0);

    let output = handle.generate(&input).await.unwrap();
    let record = output.validation.unwrap();
    assert_eq!(record.verdict, Verdict::Fail);
    assert_eq!(record.attempt, 1);
    assert_eq!(generation.call_count(), 1);
}

#[tokio::test]
async fn concurrent_identical_requests_share_one_generation_call() {
    let dir = TempDir::new().unwrap();
    let generation = CountingGeneration::slow(Duration::from_millis(50));
    let handle = handle_with(&dir, Arc::clone(&generation), ScriptedJudge::new(&[]));

    let input = generate_input("a shared sunrise");
    let (a, b, c) = tokio::join!(
        handle.generate(&input),
        handle.generate(&input),
        handle.generate(&input),
    );
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

    assert_eq!(generation.call_count(), 1);
    assert_eq!(a.uri, b.uri);
    assert_eq!(b.uri, c.uri);
}

#[tokio::test]
async fn distinct_prompts_generate_independently() {
    let dir = TempDir::new().unwrap();
    let generation = CountingGeneration::new();
    let handle = handle_with(&dir, Arc::clone(&generation), ScriptedJudge::new(&[]));

    let a = handle.generate(&generate_input("a green square")).await.unwrap();
    let b = handle.generate(&generate_input("a red circle")).await.unwrap();

    assert_ne!(a.uri, b.uri);
    assert_eq!(generation.call_count(), 2);
}

#[tokio::test]
async fn include_base64_echoes_the_exact_stored_bytes() {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;

    let dir = TempDir::new().unwrap();
    let handle = stub_handle(&dir);

    let mut input = generate_input("an inline thumbnail");
    input.include_base64 = true;

    let output = handle.generate(&input).await.unwrap();
    let echoed = BASE64.decode(output.base64_data.unwrap()).unwrap();
    let path = output.uri.strip_prefix("file://").unwrap();
    assert_eq!(echoed, std::fs::read(path).unwrap());
}

#[tokio::test]
async fn a_service_outage_maps_to_the_service_failure_exit_code() {
    let dir = TempDir::new().unwrap();
    let handle = handle_with(&dir, Arc::new(FailingGeneration), ScriptedJudge::new(&[]));

    let err = handle.generate(&generate_input("doomed")).await.unwrap_err();
    assert!(matches!(err, EaselError::Service(_)));
    assert_eq!(err.to_exit_code(), ExitCode::SERVICE_FAILURE);

    // Nothing is cached for the failed fingerprint; a working service
    // would be consulted again.
    let status = handle.status().unwrap();
    assert_eq!(status.cache.entries, 0);
    assert_eq!(status.storage.asset_count, 0);
}

#[tokio::test]
async fn an_unknown_provider_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let config = easel::Config::builder()
        .storage_root(dir.path().join("assets").to_str().unwrap())
        .provider("dalle-local")
        .build()
        .unwrap();

    let err = easel::EaselHandle::from_config(config).unwrap_err();
    assert_eq!(err.to_exit_code(), ExitCode::CONFIG);
}

#[tokio::test]
async fn the_configured_retry_default_applies_when_the_input_has_none() {
    let dir = TempDir::new().unwrap();
    let config = easel::Config::builder()
        .storage_root(dir.path().join("assets").to_str().unwrap())
        .cache_dir(dir.path().join("cache").to_str().unwrap())
        .provider("stub")
        .max_validation_retries(2)
        .build()
        .unwrap();
    let services = easel::ServiceSet {
        generation: Arc::new(easel::services::StubGeneration),
        description: Arc::new(easel::services::StubDescription),
        judge: ScriptedJudge::new(&[FAIL, FAIL, PASS]),
    };
    let handle = easel::EaselHandle::with_services(config, services).unwrap();

    let mut input = generate_input("a stubborn render");
    input.validate_output = true;
    // No per-call budget; the configured default of 2 retries applies.
    assert!(input.max_validation_retries.is_none());

    let output = handle.generate(&input).await.unwrap();
    let record = output.validation.unwrap();
    assert_eq!(record.verdict, Verdict::Pass);
    assert_eq!(record.attempt, 3);
}
