//! Single-flight registry coalescing duplicate generation calls.
//!
//! At most one in-flight external generation call may exist per
//! fingerprint. The first caller to [`FlightMap::join`] becomes the
//! leader and holds the flight slot across its generation call and
//! store write; everyone else joining the same key parks on the slot
//! and, once the leader publishes, receives the produced asset instead
//! of issuing a duplicate call.
//!
//! The slot is an async mutex over an `Option<FlightOutcome>`, so a
//! leader can hold it across awaits. Publication fills the option,
//! removes the key from the registry, and releases the slot in one
//! step; validation always runs after release, outside the flight. A
//! leader that errors out or is cancelled drops its guard with the slot
//! still empty, and the next waiter promotes itself to leader rather
//! than waiting forever.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use easel_utils::types::ImageFormat;

type FlightSlot = Arc<AsyncMutex<Option<FlightOutcome>>>;
type Registry = Arc<StdMutex<HashMap<String, FlightSlot>>>;

const POISONED: &str = "flight registry poisoned";

/// What a leader hands to the callers it absorbed: where the generated
/// bytes landed. Validation state is deliberately absent; each caller
/// validates on its own terms after the flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightOutcome {
    pub uri: String,
    pub byte_len: u64,
    pub format: ImageFormat,
}

/// How a call to [`FlightMap::join`] resolved.
#[derive(Debug)]
pub enum FlightRole {
    /// This caller runs the generation; it must publish or abandon.
    Leader(FlightGuard),
    /// Another caller generated; here is its outcome.
    Follower(FlightOutcome),
}

/// Registry of in-flight generations, keyed by fingerprint.
///
/// Clones share one registry, so the map can be handed to each
/// orchestration without further wrapping.
#[derive(Debug, Clone, Default)]
pub struct FlightMap {
    registry: Registry,
}

impl FlightMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the flight for `key`, creating it if absent.
    ///
    /// Resolves immediately to [`FlightRole::Leader`] when no flight is
    /// active. Otherwise parks until the active leader publishes (then
    /// resolves to [`FlightRole::Follower`]) or abandons (then this
    /// caller is promoted to leader).
    pub async fn join(&self, key: &str) -> FlightRole {
        let slot = {
            let mut registry = self.registry.lock().expect(POISONED);
            Arc::clone(
                registry
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(None))),
            )
        };

        let guard = slot.lock_owned().await;
        match guard.as_ref() {
            Some(outcome) => FlightRole::Follower(outcome.clone()),
            None => FlightRole::Leader(FlightGuard {
                key: key.to_string(),
                registry: Arc::clone(&self.registry),
                slot: guard,
            }),
        }
    }

    /// Number of registered flights (active or abandoned-awaiting-reuse).
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.registry.lock().expect(POISONED).len()
    }
}

/// Exclusive hold on one flight, issued to its leader.
///
/// Dropping the guard without publishing abandons the flight: the
/// registry entry stays so the next joiner is promoted and retries the
/// work. Publishing consumes the guard.
#[derive(Debug)]
pub struct FlightGuard {
    key: String,
    registry: Registry,
    slot: OwnedMutexGuard<Option<FlightOutcome>>,
}

impl FlightGuard {
    /// Publish the produced asset to every parked follower and retire
    /// the flight.
    ///
    /// The key leaves the registry before the slot is released, so
    /// callers arriving after publication start a fresh flight instead
    /// of reading a settled one.
    pub fn publish(mut self, outcome: FlightOutcome) {
        *self.slot = Some(outcome);
        self.registry.lock().expect(POISONED).remove(&self.key);
        // Guard drops here, waking the followers.
    }
}
