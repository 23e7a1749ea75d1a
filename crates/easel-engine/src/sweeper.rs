//! Store cleanup: TTL expiry first, then capacity pressure.
//!
//! A sweep makes two passes over one listing. The TTL pass deletes
//! every asset older than its lifetime. The capacity pass then deletes
//! survivors oldest-first until the store fits its count and byte
//! limits again. Cache references to deleted assets are invalidated in
//! the same step so the cache never outlives the bytes it points at.
//!
//! A failed per-asset delete is recorded and skipped, never fatal;
//! only failure to enumerate the store aborts the sweep. Count and
//! byte counters move only when a delete actually succeeds, so a
//! locked file cannot make the pass stop early.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use easel_cache::AssetCache;
use easel_store::{AssetMeta, AssetStore};
use easel_utils::error::EaselError;

/// What one sweep did, suitable for JSON output.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    /// Assets present when the sweep started.
    pub scanned: usize,
    /// Assets actually removed.
    pub deleted: usize,
    pub bytes_freed: u64,
    /// Cache entries dropped because their asset went away.
    pub cache_invalidated: usize,
    /// Per-asset deletes that failed; the sweep continued past them.
    pub failures: Vec<SweepFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepFailure {
    pub uri: String,
    pub reason: String,
}

/// Removes expired and over-capacity assets from the store, keeping
/// the fingerprint cache consistent as it goes.
#[derive(Clone)]
pub struct CleanupSweeper {
    store: Arc<AssetStore>,
    cache: Arc<AssetCache>,
    ttl: Duration,
}

impl CleanupSweeper {
    #[must_use]
    pub fn new(store: Arc<AssetStore>, cache: Arc<AssetCache>, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    /// Run one sweep and report what it removed.
    ///
    /// # Errors
    ///
    /// Fails only when the store cannot be enumerated at all;
    /// individual delete failures land in the report instead.
    pub fn sweep(&self) -> Result<SweepReport, EaselError> {
        let assets = self.store.list()?;
        let mut report = SweepReport {
            scanned: assets.len(),
            ..SweepReport::default()
        };

        // Counters for the capacity check; they follow successful
        // deletes only, so an asset that would not delete still counts
        // against the limits it is actually occupying.
        let mut count = assets.len();
        let mut bytes: u64 = assets.iter().map(|a| a.byte_len).sum();

        let now = Utc::now();
        let mut survivors = Vec::with_capacity(assets.len());
        for asset in &assets {
            if asset.age(now) > self.ttl {
                if self.delete_one(asset, &mut report) {
                    count -= 1;
                    bytes = bytes.saturating_sub(asset.byte_len);
                }
            } else {
                survivors.push(asset);
            }
        }

        // list() is oldest-first, so walking survivors in order evicts
        // the oldest assets until the store fits again.
        let limits = self.store.limits();
        let mut oldest = survivors.into_iter();
        while count > limits.max_assets || bytes > limits.max_total_bytes {
            let Some(asset) = oldest.next() else {
                break;
            };
            if self.delete_one(asset, &mut report) {
                count -= 1;
                bytes = bytes.saturating_sub(asset.byte_len);
            }
        }

        debug!(
            scanned = report.scanned,
            deleted = report.deleted,
            bytes_freed = report.bytes_freed,
            cache_invalidated = report.cache_invalidated,
            failures = report.failures.len(),
            "sweep complete"
        );
        Ok(report)
    }

    fn delete_one(&self, asset: &AssetMeta, report: &mut SweepReport) -> bool {
        match self.store.delete(&asset.uri) {
            Ok(meta) => {
                report.deleted += 1;
                report.bytes_freed += meta.byte_len;
                report.cache_invalidated += self.cache.invalidate_uri(&meta.uri);
                true
            }
            Err(e) => {
                warn!(uri = %asset.uri, error = %e, "sweep could not delete asset");
                report.failures.push(SweepFailure {
                    uri: asset.uri.clone(),
                    reason: e.to_string(),
                });
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use camino::Utf8PathBuf;
    use easel_cache::{AssetCache, CacheEntry, CacheLimits};
    use easel_store::StoreLimits;
    use easel_utils::fingerprint::Fingerprint;
    use easel_utils::types::ImageFormat;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    fn store_with(dir: &TempDir, limits: StoreLimits) -> Arc<AssetStore> {
        Arc::new(AssetStore::new(utf8(dir).join("assets"), limits).unwrap())
    }

    fn cache_in(dir: &TempDir) -> Arc<AssetCache> {
        Arc::new(AssetCache::new(utf8(dir).join("cache"), CacheLimits::default()).unwrap())
    }

    fn fingerprint(tag: &str) -> Fingerprint {
        Fingerprint::of(&serde_json::json!({ "tag": tag })).unwrap()
    }

    #[test]
    fn fresh_assets_survive_a_sweep() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, StoreLimits::default());
        let sweeper = CleanupSweeper::new(
            Arc::clone(&store),
            cache_in(&dir),
            Duration::from_secs(3600),
        );

        store.put(b"one", ImageFormat::Png).unwrap();
        store.put(b"two", ImageFormat::Png).unwrap();

        let report = sweeper.sweep().unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.deleted, 0);
        assert!(report.failures.is_empty());
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn expired_assets_are_deleted_and_uncached() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, StoreLimits::default());
        let cache = cache_in(&dir);
        let sweeper = CleanupSweeper::new(Arc::clone(&store), Arc::clone(&cache), Duration::ZERO);

        let meta = store.put(b"stale bytes", ImageFormat::Png).unwrap();
        cache
            .put(CacheEntry::new(fingerprint("stale"), meta.uri.clone()))
            .unwrap();

        // Everything is older than a zero TTL once a beat has passed.
        std::thread::sleep(Duration::from_millis(20));

        let report = sweeper.sweep().unwrap();
        assert_eq!(report.deleted, 1);
        assert_eq!(report.bytes_freed, meta.byte_len);
        assert_eq!(report.cache_invalidated, 1);
        assert!(store.list().unwrap().is_empty());
        assert!(cache.get(&fingerprint("stale")).is_none());
    }

    #[test]
    fn capacity_pass_evicts_oldest_first() {
        let dir = TempDir::new().unwrap();
        let store = store_with(
            &dir,
            StoreLimits {
                max_assets: 2,
                max_total_bytes: 1024,
            },
        );
        let sweeper = CleanupSweeper::new(
            Arc::clone(&store),
            cache_in(&dir),
            Duration::from_secs(3600),
        );

        // Write past the sweeper's limits through a handle with roomier
        // ones; both views share the same directory.
        let roomy = AssetStore::new(store.root().to_owned(), StoreLimits::default()).unwrap();
        let first = roomy.put(b"first", ImageFormat::Png).unwrap();
        let second = roomy.put(b"second", ImageFormat::Png).unwrap();
        let third = roomy.put(b"third", ImageFormat::Png).unwrap();

        let report = sweeper.sweep().unwrap();
        assert_eq!(report.deleted, 1);

        let remaining: Vec<String> =
            store.list().unwrap().into_iter().map(|a| a.uri).collect();
        assert!(!remaining.contains(&first.uri));
        assert!(remaining.contains(&second.uri));
        assert!(remaining.contains(&third.uri));
    }

    #[test]
    fn byte_limit_drives_eviction_too() {
        let dir = TempDir::new().unwrap();
        let store = store_with(
            &dir,
            StoreLimits {
                max_assets: 100,
                max_total_bytes: 10,
            },
        );
        let sweeper = CleanupSweeper::new(
            Arc::clone(&store),
            cache_in(&dir),
            Duration::from_secs(3600),
        );

        let roomy = AssetStore::new(store.root().to_owned(), StoreLimits::default()).unwrap();
        roomy.put(&[0u8; 6], ImageFormat::Png).unwrap();
        roomy.put(&[0u8; 6], ImageFormat::Png).unwrap();

        let report = sweeper.sweep().unwrap();
        assert_eq!(report.deleted, 1);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn a_failed_delete_is_recorded_not_raised() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, StoreLimits::default());
        let sweeper =
            CleanupSweeper::new(Arc::clone(&store), cache_in(&dir), Duration::from_secs(3600));

        // Stale metadata, as when an asset disappears between the
        // sweep's listing and its delete.
        let gone = store.put(b"gone", ImageFormat::Png).unwrap();
        std::fs::remove_file(gone.path().as_std_path()).unwrap();

        let mut report = SweepReport::default();
        assert!(!sweeper.delete_one(&gone, &mut report));
        assert_eq!(report.deleted, 0);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].uri, gone.uri);

        // The sweeper itself is still usable afterwards.
        assert!(sweeper.sweep().unwrap().failures.is_empty());
    }

    #[test]
    fn sweep_report_serializes_for_json_output() {
        let report = SweepReport {
            scanned: 3,
            deleted: 1,
            bytes_freed: 42,
            cache_invalidated: 1,
            failures: vec![SweepFailure {
                uri: "file:///tmp/x.png".to_string(),
                reason: "locked".to_string(),
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["deleted"], 1);
        assert_eq!(json["failures"][0]["reason"], "locked");
    }
}
