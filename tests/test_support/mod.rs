//! Shared fixtures for the integration suite: scripted service doubles
//! and pipeline handles wired over temporary storage.
//!
//! Each test binary builds an [`EaselHandle`] from these helpers instead
//! of touching the orchestrators directly, so the suite exercises the
//! same construction path embedders use.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use easel::error::ServiceError;
use easel::services::{GeneratedImage, JudgeCall, StubDescription, StubGeneration};
use easel::{
    AssetRequest, Config, EaselHandle, GenerateImageInput, GenerationService, ImageFormat,
    JudgeService, ServiceSet,
};

pub const PASS: &str = r#"{"verdict":"pass","confidence":0.9,"reason":"matches the expectation"}"#;
pub const FAIL: &str = r#"{"verdict":"fail","confidence":0.8,"reason":"does not match"}"#;

/// Generation double emitting distinct bytes per call and counting them.
/// An optional delay keeps the call in flight long enough for another
/// caller to pile onto the same fingerprint.
pub struct CountingGeneration {
    pub calls: AtomicUsize,
    delay: Duration,
}

impl CountingGeneration {
    pub fn new() -> Arc<Self> {
        Self::slow(Duration::ZERO)
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationService for CountingGeneration {
    async fn generate(
        &self,
        _request: &AssetRequest,
        _timeout: Duration,
    ) -> Result<GeneratedImage, ServiceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(GeneratedImage {
            bytes: format!("artifact-{n}").into_bytes(),
            format: ImageFormat::Png,
        })
    }
}

/// Generation double that always fails with a service outage.
pub struct FailingGeneration;

#[async_trait]
impl GenerationService for FailingGeneration {
    async fn generate(
        &self,
        _request: &AssetRequest,
        _timeout: Duration,
    ) -> Result<GeneratedImage, ServiceError> {
        Err(ServiceError::Outage("502 Bad Gateway".to_string()))
    }
}

/// Judge double that replays a fixed script, one reply per call.
pub struct ScriptedJudge {
    replies: Mutex<Vec<String>>,
}

impl ScriptedJudge {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        // Stored reversed so pop() plays the script in order.
        Arc::new(Self {
            replies: Mutex::new(replies.iter().rev().map(|s| (*s).to_string()).collect()),
        })
    }
}

#[async_trait]
impl JudgeService for ScriptedJudge {
    async fn judge(&self, _call: &JudgeCall) -> Result<String, ServiceError> {
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop()
            .expect("judge script exhausted"))
    }
}

/// Stub-backed configuration over the given temporary directory.
pub fn stub_config(dir: &TempDir) -> Config {
    Config::builder()
        .storage_root(dir.path().join("assets").to_str().unwrap())
        .cache_dir(dir.path().join("cache").to_str().unwrap())
        .provider("stub")
        .build()
        .unwrap()
}

/// A handle running entirely on the offline stub backends.
pub fn stub_handle(dir: &TempDir) -> EaselHandle {
    EaselHandle::from_config(stub_config(dir)).unwrap()
}

/// A handle with explicit generation and judge doubles; description
/// stays on the stub backend.
pub fn handle_with<G, J>(dir: &TempDir, generation: Arc<G>, judge: Arc<J>) -> EaselHandle
where
    G: GenerationService + 'static,
    J: JudgeService + 'static,
{
    let services = ServiceSet {
        generation,
        description: Arc::new(StubDescription),
        judge,
    };
    EaselHandle::with_services(stub_config(dir), services).unwrap()
}

/// A stub-generation handle whose judge replays `replies`.
pub fn handle_with_judge(dir: &TempDir, replies: &[&str]) -> EaselHandle {
    handle_with(dir, Arc::new(StubGeneration), ScriptedJudge::new(replies))
}

/// A small generate input; tiny dimensions keep stub rendering fast.
pub fn generate_input(prompt: &str) -> GenerateImageInput {
    serde_json::from_value(serde_json::json!({
        "prompt": prompt,
        "dimensions": [16, 16],
    }))
    .unwrap()
}
