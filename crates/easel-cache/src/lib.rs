//! Fingerprint-keyed result cache for easel.
//!
//! Maps a request [`Fingerprint`] to the asset it produced, plus the
//! validation record of the accepted attempt. Entries live in two tiers:
//! an in-memory map consulted first, and one `{fingerprint}.json` file
//! per entry under the cache directory so results survive a process
//! restart. A disk hit repopulates the memory tier; a corrupted disk
//! entry is removed on sight and reported as a miss.
//!
//! Lookups never trigger external calls. Expiry is lazy: an entry past
//! its TTL, or ranked past the capacity bound oldest-first, is a miss
//! and its disk file is removed. Active space reclamation belongs to the
//! cleanup sweeper, which calls [`AssetCache::invalidate_uri`] after
//! each asset deletion so no entry dangles.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::Mutex;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use easel_utils::atomic_write;
use easel_utils::error::CacheError;
use easel_utils::fingerprint::Fingerprint;
use easel_utils::paths::ensure_dir_all;
use easel_utils::types::ValidationRecord;

mod flight;

pub use flight::{FlightGuard, FlightMap, FlightOutcome, FlightRole};

const POISONED: &str = "cache mutex poisoned";

/// Retention bounds applied lazily on lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLimits {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(86_400),
            max_entries: 128,
        }
    }
}

/// One cached result: fingerprint of the request that produced it, the
/// asset it resolved to, and the validation record of the accepted
/// attempt (absent when validation was not requested).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRecord>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub hit_count: u64,
}

impl CacheEntry {
    #[must_use]
    pub fn new(fingerprint: Fingerprint, uri: impl Into<String>) -> Self {
        Self {
            fingerprint,
            uri: uri.into(),
            validation: None,
            created_at: Utc::now(),
            hit_count: 0,
        }
    }

    #[must_use]
    pub fn with_validation(mut self, record: ValidationRecord) -> Self {
        self.validation = Some(record);
        self
    }

    /// True once the entry's age is strictly past `ttl`.
    #[must_use]
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        (now - self.created_at).to_std().unwrap_or_default() > ttl
    }
}

/// Statistics for cache performance tracking.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    /// Lookups that waited on another caller's in-flight generation and
    /// shared its result instead of issuing their own call.
    pub coalesced: usize,
    pub writes: usize,
    pub invalidations: usize,
}

impl CacheStats {
    /// Hits over total lookups; zero when nothing was looked up yet.
    #[must_use]
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Two-tier fingerprint cache shared across concurrent orchestrations.
///
/// All methods take `&self`; the memory tier and statistics sit behind
/// mutexes so one instance can be shared via `Arc` between tasks.
#[derive(Debug)]
pub struct AssetCache {
    cache_dir: Utf8PathBuf,
    limits: CacheLimits,
    memory: Mutex<HashMap<String, CacheEntry>>,
    stats: Mutex<CacheStats>,
}

impl AssetCache {
    /// Open (creating if necessary) the cache rooted at `cache_dir`.
    pub fn new(cache_dir: impl Into<Utf8PathBuf>, limits: CacheLimits) -> Result<Self, CacheError> {
        let cache_dir = cache_dir.into();
        ensure_dir_all(&cache_dir)?;
        Ok(Self {
            cache_dir,
            limits,
            memory: Mutex::new(HashMap::new()),
            stats: Mutex::new(CacheStats::default()),
        })
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Utf8Path {
        &self.cache_dir
    }

    #[must_use]
    pub fn limits(&self) -> CacheLimits {
        self.limits
    }

    /// Snapshot of the lookup statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        *self.stats.lock().expect(POISONED)
    }

    /// Record that a lookup was answered by coalescing onto an in-flight
    /// generation rather than by the cache itself.
    pub fn note_coalesced(&self) {
        self.stats.lock().expect(POISONED).coalesced += 1;
    }

    /// Look up a fingerprint. Never triggers an external call.
    ///
    /// A hit bumps the entry's `hit_count` in the memory tier. Expired
    /// or capacity-ranked-out entries are removed from both tiers and
    /// reported as misses.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        let now = Utc::now();
        let key = fingerprint.as_str();

        let in_memory = self.memory.lock().expect(POISONED).get(key).cloned();
        let from_memory = in_memory.is_some();
        let Some(entry) = in_memory.or_else(|| self.load_disk_entry(key)) else {
            self.stats.lock().expect(POISONED).misses += 1;
            debug!(fingerprint = %short(key), "cache miss");
            return None;
        };

        if entry.is_expired(self.limits.ttl, now) {
            self.evict(key);
            let mut stats = self.stats.lock().expect(POISONED);
            stats.invalidations += 1;
            stats.misses += 1;
            debug!(fingerprint = %short(key), "cache entry expired");
            return None;
        }

        if self.ranked_out(key) {
            self.evict(key);
            let mut stats = self.stats.lock().expect(POISONED);
            stats.invalidations += 1;
            stats.misses += 1;
            debug!(fingerprint = %short(key), "cache entry past capacity bound");
            return None;
        }

        let entry = {
            let mut memory = self.memory.lock().expect(POISONED);
            let slot = memory.entry(key.to_string()).or_insert(entry);
            slot.hit_count += 1;
            slot.clone()
        };
        self.stats.lock().expect(POISONED).hits += 1;
        debug!(
            fingerprint = %short(key),
            tier = if from_memory { "memory" } else { "disk" },
            uri = %entry.uri,
            "cache hit"
        );
        Some(entry)
    }

    /// Insert or atomically overwrite the entry for its fingerprint.
    ///
    /// The disk tier is written first (temp file + rename); the memory
    /// tier only follows once the entry is durable.
    pub fn put(&self, entry: CacheEntry) -> Result<(), CacheError> {
        ensure_dir_all(&self.cache_dir)?;
        let path = self.entry_path(entry.fingerprint.as_str());
        let json = serde_json::to_string_pretty(&entry).map_err(|e| CacheError::PersistFailed {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        atomic_write::write_text_atomic(&path, &json).map_err(|e| CacheError::PersistFailed {
            path: path.to_string(),
            reason: format!("{e:#}"),
        })?;

        debug!(fingerprint = %short(entry.fingerprint.as_str()), uri = %entry.uri, "cached result");
        self.memory
            .lock()
            .expect(POISONED)
            .insert(entry.fingerprint.as_str().to_string(), entry);
        self.stats.lock().expect(POISONED).writes += 1;
        Ok(())
    }

    /// Drop every entry referencing `uri` from both tiers.
    ///
    /// Called by the sweeper after deleting an asset, so later lookups
    /// miss instead of resolving to bytes that no longer exist. Returns
    /// the number of entries removed.
    pub fn invalidate_uri(&self, uri: &str) -> usize {
        let mut removed: HashSet<String> = HashSet::new();

        {
            let mut memory = self.memory.lock().expect(POISONED);
            let stale: Vec<String> = memory
                .iter()
                .filter(|(_, entry)| entry.uri == uri)
                .map(|(key, _)| key.clone())
                .collect();
            for key in stale {
                memory.remove(&key);
                removed.insert(key);
            }
        }

        for key in self.disk_keys() {
            if removed.contains(&key) {
                let _ = fs::remove_file(self.entry_path(&key).as_std_path());
                continue;
            }
            if let Some(entry) = self.load_disk_entry(&key)
                && entry.uri == uri
            {
                let _ = fs::remove_file(self.entry_path(&key).as_std_path());
                removed.insert(key);
            }
        }

        if !removed.is_empty() {
            self.stats.lock().expect(POISONED).invalidations += removed.len();
            debug!(uri = %uri, entries = removed.len(), "invalidated cache entries");
        }
        removed.len()
    }

    /// Number of distinct live entries across both tiers.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        let mut keys: HashSet<String> = self
            .memory
            .lock()
            .expect(POISONED)
            .keys()
            .cloned()
            .collect();
        keys.extend(self.disk_keys());
        keys.len()
    }

    fn entry_path(&self, key: &str) -> Utf8PathBuf {
        self.cache_dir.join(format!("{key}.json"))
    }

    /// Read one entry from the disk tier. Corrupted files are removed on
    /// sight and treated as absent.
    fn load_disk_entry(&self, key: &str) -> Option<CacheEntry> {
        let path = self.entry_path(key);
        let raw = match fs::read_to_string(path.as_std_path()) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                debug!(fingerprint = %short(key), error = %e, "cache entry unreadable");
                return None;
            }
        };
        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                let _ = fs::remove_file(path.as_std_path());
                debug!(fingerprint = %short(key), error = %e, "removed corrupted cache entry");
                None
            }
        }
    }

    fn evict(&self, key: &str) {
        self.memory.lock().expect(POISONED).remove(key);
        let _ = fs::remove_file(self.entry_path(key).as_std_path());
    }

    /// Fingerprints present in the disk tier (file stems of `*.json`).
    fn disk_keys(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.cache_dir.as_std_path()) else {
            return Vec::new();
        };
        entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name();
                let name = name.to_str()?;
                name.strip_suffix(".json").map(str::to_string)
            })
            .collect()
    }

    /// Whether `key` ranks past the capacity bound, counting newest
    /// entries first. Cheap while the cache is within bounds: the rank
    /// scan only runs once the distinct-entry count exceeds capacity.
    fn ranked_out(&self, key: &str) -> bool {
        let mut stamped: HashMap<String, DateTime<Utc>> = self
            .memory
            .lock()
            .expect(POISONED)
            .iter()
            .map(|(k, entry)| (k.clone(), entry.created_at))
            .collect();
        let disk_keys = self.disk_keys();

        let distinct = {
            let mut keys: HashSet<&str> = stamped.keys().map(String::as_str).collect();
            keys.extend(disk_keys.iter().map(String::as_str));
            keys.len()
        };
        if distinct <= self.limits.max_entries {
            return false;
        }

        for disk_key in disk_keys {
            if !stamped.contains_key(&disk_key)
                && let Some(entry) = self.load_disk_entry(&disk_key)
            {
                stamped.insert(disk_key, entry.created_at);
            }
        }

        let mut ranked: Vec<(String, DateTime<Utc>)> = stamped.into_iter().collect();
        // Newest first; key breaks creation-time ties so the rank is stable.
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
            .iter()
            .position(|(k, _)| k == key)
            .is_some_and(|rank| rank >= self.limits.max_entries)
    }
}

fn short(fingerprint: &str) -> &str {
    &fingerprint[..fingerprint.len().min(8)]
}
