//! Generation orchestration: fingerprint cache, single flight, judged
//! retries.
//!
//! A call first consults the cache; a hit returns the stored uri and
//! validation record with no external call. A miss joins the
//! fingerprint's flight: the leader calls the generation service once,
//! persists the bytes, and publishes the artifact to every caller that
//! parked on the same fingerprint meanwhile. Validation, when
//! requested, runs after the flight settles, so a slow judge never
//! blocks coalescing; failed verdicts regenerate through direct service
//! calls bounded by `max_validation_retries`.
//!
//! Every attempt writes a new asset. Only the final attempt's asset
//! lands in the cache; superseded ones stay in the store until a sweep
//! removes them. Exhausting retries is a normal completion carrying the
//! failing record, not an error.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{Instrument, debug, warn};

use easel_cache::{AssetCache, CacheEntry, FlightGuard, FlightMap, FlightOutcome, FlightRole};
use easel_services::{GeneratedImage, GenerationService, ImagePayload};
use easel_store::{AssetMeta, AssetStore};
use easel_utils::error::{EaselError, StoreError};
use easel_utils::fingerprint::Fingerprint;
use easel_utils::logging;
use easel_utils::types::{AssetRequest, ImageFormat, ValidationRecord};

use crate::judge::{JudgeAdapter, JudgeSubject};
use crate::retry::{AttemptState, RetryState};
use crate::sweeper::CleanupSweeper;

/// Caller-side switches for one generate call.
///
/// Deliberately separate from [`AssetRequest`]: nothing here may enter
/// the fingerprint, so validating or not validating never changes which
/// cache entry a request resolves to.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub validate_output: bool,
    pub validation_focus: Option<String>,
    pub max_validation_retries: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            validate_output: false,
            validation_focus: None,
            max_validation_retries: 1,
        }
    }
}

/// What a generate call resolved to.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub uri: String,
    pub byte_len: u64,
    pub format: ImageFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRecord>,
    /// True when the fingerprint cache answered without a service call.
    pub cached: bool,
}

/// An artifact some attempt produced and persisted, bytes still in hand
/// for the judge.
struct ProducedArtifact {
    bytes: Vec<u8>,
    uri: String,
    byte_len: u64,
    format: ImageFormat,
}

impl ProducedArtifact {
    fn from_meta(bytes: Vec<u8>, meta: &AssetMeta) -> Self {
        Self {
            bytes,
            uri: meta.uri.clone(),
            byte_len: meta.byte_len,
            format: meta.format,
        }
    }

    fn into_outcome(self, validation: Option<ValidationRecord>) -> GenerationOutcome {
        GenerationOutcome {
            uri: self.uri,
            byte_len: self.byte_len,
            format: self.format,
            validation,
            cached: false,
        }
    }
}

/// Drives generate calls end to end. Shared by cloning; every clone
/// sees the same store, cache, and flight registry.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    store: Arc<AssetStore>,
    cache: Arc<AssetCache>,
    flights: FlightMap,
    service: Arc<dyn GenerationService>,
    judge: JudgeAdapter,
    sweeper: CleanupSweeper,
    timeout: Duration,
}

impl GenerationOrchestrator {
    #[must_use]
    pub fn new(
        store: Arc<AssetStore>,
        cache: Arc<AssetCache>,
        flights: FlightMap,
        service: Arc<dyn GenerationService>,
        judge: JudgeAdapter,
        sweeper: CleanupSweeper,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            flights,
            service,
            judge,
            sweeper,
            timeout,
        }
    }

    /// Generate (or look up) the asset for `request`.
    ///
    /// # Errors
    ///
    /// Service failures, judge contract violations, and store errors
    /// abort the call. A failing verdict does not: retries exhausted is
    /// an `Ok` outcome carrying the last record with verdict `fail`.
    pub async fn generate(
        &self,
        request: &AssetRequest,
        options: &GenerateOptions,
    ) -> Result<GenerationOutcome, EaselError> {
        let fingerprint = Fingerprint::of(request)?;
        let span = logging::operation_span("generate_image", fingerprint.as_str());
        self.generate_keyed(request, options, &fingerprint)
            .instrument(span)
            .await
    }

    async fn generate_keyed(
        &self,
        request: &AssetRequest,
        options: &GenerateOptions,
        fingerprint: &Fingerprint,
    ) -> Result<GenerationOutcome, EaselError> {
        if let Some(entry) = self.cache.get(fingerprint) {
            match self.store.metadata(&entry.uri) {
                Ok(meta) => {
                    debug!(uri = %entry.uri, "fingerprint hit; no external call");
                    return Ok(GenerationOutcome {
                        uri: entry.uri,
                        byte_len: meta.byte_len,
                        format: meta.format,
                        validation: entry.validation,
                        cached: true,
                    });
                }
                Err(StoreError::NotFound { .. }) => {
                    // The asset went away out of band. Drop the entry
                    // and regenerate rather than hand out a dead uri.
                    warn!(uri = %entry.uri, "cached asset missing from store; regenerating");
                    self.cache.invalidate_uri(&entry.uri);
                }
                Err(e) => return Err(e.into()),
            }
        }

        match self.flights.join(fingerprint.as_str()).await {
            FlightRole::Leader(guard) => self.lead(request, options, fingerprint, guard).await,
            FlightRole::Follower(shared) => {
                self.cache.note_coalesced();
                self.absorb(request, options, fingerprint, shared).await
            }
        }
    }

    /// This caller owns the flight: one service call, persist, publish.
    async fn lead(
        &self,
        request: &AssetRequest,
        options: &GenerateOptions,
        fingerprint: &Fingerprint,
        guard: FlightGuard,
    ) -> Result<GenerationOutcome, EaselError> {
        let mut retry = RetryState::new(options.max_validation_retries);

        // A failed call drops the guard unpublished, which promotes the
        // next waiter to leader instead of feeding it a dead outcome.
        let image = self.service.generate(request, self.timeout).await?;
        let meta = self.store_with_pressure_relief(&image)?;
        retry.produced();
        guard.publish(FlightOutcome {
            uri: meta.uri.clone(),
            byte_len: meta.byte_len,
            format: meta.format,
        });

        let produced = ProducedArtifact::from_meta(image.bytes, &meta);
        if !options.validate_output {
            retry.skip_validation();
            self.cache
                .put(CacheEntry::new(fingerprint.clone(), produced.uri.clone()))?;
            debug!(uri = %produced.uri, "generated without validation");
            return Ok(produced.into_outcome(None));
        }
        self.validate_and_cache(request, options, fingerprint, retry, produced)
            .await
    }

    /// Another caller generated while this one waited; share its
    /// artifact as this call's first attempt.
    async fn absorb(
        &self,
        request: &AssetRequest,
        options: &GenerateOptions,
        fingerprint: &Fingerprint,
        shared: FlightOutcome,
    ) -> Result<GenerationOutcome, EaselError> {
        debug!(uri = %shared.uri, "joined in-flight generation; sharing its artifact");
        if !options.validate_output {
            // The leader writes the cache entry; a second write here
            // would only race it with identical content.
            return Ok(GenerationOutcome {
                uri: shared.uri,
                byte_len: shared.byte_len,
                format: shared.format,
                validation: None,
                cached: false,
            });
        }

        let bytes = self.store.get(&shared.uri)?;
        let mut retry = RetryState::new(options.max_validation_retries);
        retry.produced();
        let produced = ProducedArtifact {
            bytes,
            uri: shared.uri,
            byte_len: shared.byte_len,
            format: shared.format,
        };
        self.validate_and_cache(request, options, fingerprint, retry, produced)
            .await
    }

    /// Judge the artifact in hand; regenerate on failed verdicts until
    /// a terminal state, then cache and return the last attempt.
    async fn validate_and_cache(
        &self,
        request: &AssetRequest,
        options: &GenerateOptions,
        fingerprint: &Fingerprint,
        mut retry: RetryState,
        mut produced: ProducedArtifact,
    ) -> Result<GenerationOutcome, EaselError> {
        let expected = expected_content(request);
        loop {
            retry.begin_validation();
            let subject = JudgeSubject {
                image: Some(ImagePayload::new(produced.bytes.clone(), produced.format)),
                expected: Some(expected.clone()),
                focus: options.validation_focus.clone(),
                ..JudgeSubject::default()
            };
            let record = self.judge.evaluate(subject, retry.attempts_made()).await?;
            let observed = retry.record_verdict(record.clone());

            if observed == AttemptState::FailRetry {
                warn!(
                    attempt = record.attempt,
                    max_attempts = retry.max_attempts(),
                    reason = %record.reason,
                    "validation failed; generating a fresh artifact"
                );
                // Retries call the service directly; the flight covered
                // only the first production and is already settled. The
                // superseded asset stays behind for the sweeper.
                let image = self.service.generate(request, self.timeout).await?;
                let meta = self.store_with_pressure_relief(&image)?;
                retry.produced();
                produced = ProducedArtifact::from_meta(image.bytes, &meta);
                continue;
            }

            if observed == AttemptState::FailExhausted {
                warn!(
                    attempts = retry.attempts_made(),
                    "validation retries exhausted; returning the last artifact with its failing verdict"
                );
            }
            // Pass and exhaustion both cache the last attempt, record
            // included, so a later hit reports the same verdict.
            self.cache.put(
                CacheEntry::new(fingerprint.clone(), produced.uri.clone())
                    .with_validation(record.clone()),
            )?;
            return Ok(produced.into_outcome(Some(record)));
        }
    }

    /// Persist bytes, relieving capacity pressure once inline.
    ///
    /// A `CapacityExceeded` rejection triggers one sweep and a single
    /// retry of the write; the error surfaces only when the sweep could
    /// not free enough space.
    fn store_with_pressure_relief(&self, image: &GeneratedImage) -> Result<AssetMeta, EaselError> {
        match self.store.put(&image.bytes, image.format) {
            Ok(meta) => Ok(meta),
            Err(StoreError::CapacityExceeded {
                asset_count,
                total_bytes,
                ..
            }) => {
                debug!(
                    asset_count,
                    total_bytes, "store at capacity; sweeping before the write"
                );
                self.sweeper.sweep()?;
                Ok(self.store.put(&image.bytes, image.format)?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// The content the judge checks a generated artifact against: the
/// prompt plus whatever style and acceptance criteria rode along.
fn expected_content(request: &AssetRequest) -> String {
    let mut expected = request.prompt.clone();
    if let Some(style) = &request.style {
        expected.push_str("\n\nStyle: ");
        expected.push_str(style);
    }
    if let Some(criteria) = &request.acceptance_criteria {
        expected.push_str("\n\nAcceptance criteria: ");
        expected.push_str(criteria);
    }
    expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use camino::Utf8PathBuf;
    use easel_cache::CacheLimits;
    use easel_services::{JudgeCall, JudgeService};
    use easel_store::StoreLimits;
    use easel_utils::error::ServiceError;
    use easel_utils::types::Verdict;
    use tempfile::TempDir;

    const PASS: &str = r#"{"verdict":"pass","confidence":0.9,"reason":"matches the prompt"}"#;
    const FAIL: &str = r#"{"verdict":"fail","confidence":0.8,"reason":"wrong color"}"#;

    #[derive(Default)]
    struct CountingGeneration {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GenerationService for CountingGeneration {
        async fn generate(
            &self,
            _request: &AssetRequest,
            _timeout: Duration,
        ) -> Result<GeneratedImage, ServiceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(GeneratedImage {
                bytes: format!("artifact-{n}").into_bytes(),
                format: ImageFormat::Png,
            })
        }
    }

    struct FailingGeneration;

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

    struct ScriptedJudge {
        replies: Mutex<Vec<String>>,
    }

    impl ScriptedJudge {
        fn new(replies: &[&str]) -> Arc<Self> {
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

    struct Rig {
        orchestrator: GenerationOrchestrator,
        store: Arc<AssetStore>,
        cache: Arc<AssetCache>,
        service: Arc<CountingGeneration>,
    }

    fn rig(dir: &TempDir, judge_replies: &[&str]) -> Rig {
        rig_with(
            dir,
            judge_replies,
            StoreLimits::default(),
            Duration::from_secs(3600),
        )
    }

    fn rig_with(
        dir: &TempDir,
        judge_replies: &[&str],
        limits: StoreLimits,
        sweep_ttl: Duration,
    ) -> Rig {
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let store = Arc::new(AssetStore::new(root.join("assets"), limits).unwrap());
        let cache =
            Arc::new(AssetCache::new(root.join("cache"), CacheLimits::default()).unwrap());
        let service = Arc::new(CountingGeneration::default());
        let orchestrator = GenerationOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            FlightMap::new(),
            Arc::clone(&service) as Arc<dyn GenerationService>,
            JudgeAdapter::new(ScriptedJudge::new(judge_replies), Duration::from_secs(5)),
            CleanupSweeper::new(Arc::clone(&store), Arc::clone(&cache), sweep_ttl),
            Duration::from_secs(30),
        );
        Rig {
            orchestrator,
            store,
            cache,
            service,
        }
    }

    fn request(prompt: &str) -> AssetRequest {
        AssetRequest {
            prompt: prompt.to_string(),
            quality: Default::default(),
            background: Default::default(),
            dimensions: Default::default(),
            format: ImageFormat::Png,
            style: None,
            acceptance_criteria: None,
        }
    }

    fn validated(retries: u32) -> GenerateOptions {
        GenerateOptions {
            validate_output: true,
            validation_focus: None,
            max_validation_retries: retries,
        }
    }

    #[tokio::test]
    async fn a_miss_generates_stores_and_caches() {
        let dir = TempDir::new().unwrap();
        let rig = rig(&dir, &[]);
        let request = request("a green square");

        let outcome = rig
            .orchestrator
            .generate(&request, &GenerateOptions::default())
            .await
            .unwrap();

        assert!(!outcome.cached);
        assert!(outcome.validation.is_none());
        assert_eq!(rig.service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(rig.store.get(&outcome.uri).unwrap(), b"artifact-0");
        assert_eq!(rig.cache.entry_count(), 1);
    }

    #[tokio::test]
    async fn a_second_identical_call_is_answered_from_the_cache() {
        let dir = TempDir::new().unwrap();
        let rig = rig(&dir, &[]);
        let request = request("a green square");
        let options = GenerateOptions::default();

        let first = rig.orchestrator.generate(&request, &options).await.unwrap();
        let second = rig.orchestrator.generate(&request, &options).await.unwrap();

        assert_eq!(second.uri, first.uri);
        assert!(second.cached);
        assert_eq!(rig.service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(rig.cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn a_dangling_cache_entry_regenerates() {
        let dir = TempDir::new().unwrap();
        let rig = rig(&dir, &[]);
        let request = request("a green square");
        let options = GenerateOptions::default();

        let first = rig.orchestrator.generate(&request, &options).await.unwrap();
        // The asset disappears out of band; the cache still points at it.
        rig.store.delete(&first.uri).unwrap();

        let second = rig.orchestrator.generate(&request, &options).await.unwrap();
        assert_ne!(second.uri, first.uri);
        assert!(!second.cached);
        assert_eq!(rig.service.calls.load(Ordering::SeqCst), 2);
        assert!(rig.store.get(&second.uri).is_ok());
    }

    #[tokio::test]
    async fn a_pass_verdict_is_cached_with_its_record() {
        let dir = TempDir::new().unwrap();
        let rig = rig(&dir, &[PASS]);
        let request = request("a green square");

        let outcome = rig
            .orchestrator
            .generate(&request, &validated(1))
            .await
            .unwrap();

        let record = outcome.validation.unwrap();
        assert_eq!(record.verdict, Verdict::Pass);
        assert_eq!(record.attempt, 1);

        let cached = rig
            .cache
            .get(&Fingerprint::of(&request).unwrap())
            .unwrap();
        assert_eq!(cached.validation.unwrap().verdict, Verdict::Pass);
    }

    #[tokio::test]
    async fn a_failed_verdict_regenerates_with_a_fresh_call() {
        let dir = TempDir::new().unwrap();
        let rig = rig(&dir, &[FAIL, PASS]);
        let request = request("a green square");

        let outcome = rig
            .orchestrator
            .generate(&request, &validated(1))
            .await
            .unwrap();

        let record = outcome.validation.unwrap();
        assert_eq!(record.verdict, Verdict::Pass);
        assert_eq!(record.attempt, 2);
        assert_eq!(rig.service.calls.load(Ordering::SeqCst), 2);
        // The rejected first attempt stays in storage for the sweeper.
        assert_eq!(rig.store.list().unwrap().len(), 2);
        assert_eq!(rig.store.get(&outcome.uri).unwrap(), b"artifact-1");
    }

    #[tokio::test]
    async fn exhausted_retries_complete_with_the_failing_record() {
        let dir = TempDir::new().unwrap();
        let rig = rig(&dir, &[FAIL, FAIL]);
        let request = request("a green square");

        let outcome = rig
            .orchestrator
            .generate(&request, &validated(1))
            .await
            .unwrap();

        let record = outcome.validation.unwrap();
        assert_eq!(record.verdict, Verdict::Fail);
        assert_eq!(record.attempt, 2);
        assert_eq!(rig.service.calls.load(Ordering::SeqCst), 2);

        // The failing verdict is cached too; a later hit reports it.
        let hit = rig
            .orchestrator
            .generate(&request, &validated(1))
            .await
            .unwrap();
        assert!(hit.cached);
        assert_eq!(hit.validation.unwrap().verdict, Verdict::Fail);
        assert_eq!(rig.service.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn a_service_failure_is_terminal_and_uncached() {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let store =
            Arc::new(AssetStore::new(root.join("assets"), StoreLimits::default()).unwrap());
        let cache =
            Arc::new(AssetCache::new(root.join("cache"), CacheLimits::default()).unwrap());
        let orchestrator = GenerationOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            FlightMap::new(),
            Arc::new(FailingGeneration),
            JudgeAdapter::new(ScriptedJudge::new(&[]), Duration::from_secs(5)),
            CleanupSweeper::new(Arc::clone(&store), Arc::clone(&cache), Duration::from_secs(3600)),
            Duration::from_secs(30),
        );

        let err = orchestrator
            .generate(&request("doomed"), &validated(3))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EaselError::Service(ServiceError::Outage(_))
        ));
        assert_eq!(cache.entry_count(), 0);
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn capacity_pressure_sweeps_inline_and_retries_the_write() {
        let dir = TempDir::new().unwrap();
        // One-asset store whose sweep expires everything on sight.
        let rig = rig_with(
            &dir,
            &[],
            StoreLimits {
                max_assets: 1,
                max_total_bytes: 1024 * 1024,
            },
            Duration::ZERO,
        );
        let stale = rig.store.put(b"previous artifact", ImageFormat::Png).unwrap();
        std::thread::sleep(Duration::from_millis(20));

        let outcome = rig
            .orchestrator
            .generate(&request("fresh"), &GenerateOptions::default())
            .await
            .unwrap();

        let remaining = rig.store.list().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].uri, outcome.uri);
        assert_ne!(outcome.uri, stale.uri);
    }

    #[tokio::test]
    async fn unrelieved_capacity_pressure_surfaces_the_store_error() {
        let dir = TempDir::new().unwrap();
        // Nothing is expired and nothing is over the retained bounds,
        // so the inline sweep cannot free space for the new write.
        let rig = rig_with(
            &dir,
            &[],
            StoreLimits {
                max_assets: 1,
                max_total_bytes: 1024 * 1024,
            },
            Duration::from_secs(3600),
        );
        rig.store.put(b"occupant", ImageFormat::Png).unwrap();

        let err = rig
            .orchestrator
            .generate(&request("fresh"), &GenerateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EaselError::Store(StoreError::CapacityExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_identical_calls_share_one_generation() {
        struct SlowGeneration {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl GenerationService for SlowGeneration {
            async fn generate(
                &self,
                _request: &AssetRequest,
                _timeout: Duration,
            ) -> Result<GeneratedImage, ServiceError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(GeneratedImage {
                    bytes: b"shared artifact".to_vec(),
                    format: ImageFormat::Png,
                })
            }
        }

        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let store =
            Arc::new(AssetStore::new(root.join("assets"), StoreLimits::default()).unwrap());
        let cache =
            Arc::new(AssetCache::new(root.join("cache"), CacheLimits::default()).unwrap());
        let service = Arc::new(SlowGeneration {
            calls: AtomicUsize::new(0),
        });
        let orchestrator = GenerationOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            FlightMap::new(),
            Arc::clone(&service) as Arc<dyn GenerationService>,
            JudgeAdapter::new(ScriptedJudge::new(&[]), Duration::from_secs(5)),
            CleanupSweeper::new(Arc::clone(&store), Arc::clone(&cache), Duration::from_secs(3600)),
            Duration::from_secs(30),
        );

        let request = request("a green square");
        let options = GenerateOptions::default();
        let (a, b) = tokio::join!(
            orchestrator.generate(&request, &options),
            orchestrator.generate(&request, &options),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.uri, b.uri);
        assert_eq!(cache.stats().coalesced, 1);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn distinct_prompts_never_share_artifacts() {
        let dir = TempDir::new().unwrap();
        let rig = rig(&dir, &[]);
        let options = GenerateOptions::default();

        let a = rig
            .orchestrator
            .generate(&request("a green square"), &options)
            .await
            .unwrap();
        let b = rig
            .orchestrator
            .generate(&request("a red circle"), &options)
            .await
            .unwrap();

        assert_ne!(a.uri, b.uri);
        assert_eq!(rig.service.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn expected_content_folds_in_style_and_criteria() {
        let mut request = request("a lighthouse at dusk");
        assert_eq!(expected_content(&request), "a lighthouse at dusk");

        request.style = Some("watercolor".to_string());
        request.acceptance_criteria = Some("the light must be lit".to_string());
        let expected = expected_content(&request);
        assert!(expected.starts_with("a lighthouse at dusk"));
        assert!(expected.contains("Style: watercolor"));
        assert!(expected.contains("Acceptance criteria: the light must be lit"));
    }
}
