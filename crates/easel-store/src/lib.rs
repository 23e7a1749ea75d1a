//! Filesystem asset store for easel artifacts.
//!
//! Each generated image is written exactly once under the store root as
//! `asset-<millis>-<seq>.<ext>` and addressed by a `file://` URI from
//! then on. Assets are immutable: the store never rewrites bytes, only
//! creates and deletes files. Metadata (size, format, creation time) is
//! recovered from the filesystem, so the store has no index to corrupt
//! and the cache layer can always be rebuilt from a directory scan.
//!
//! Writes go through the atomic temp-file path, so readers and the
//! sweeper never observe a half-written asset. Capacity limits are
//! enforced on `put`; the sweeper reacts to `CapacityExceeded` by
//! evicting oldest-first.

use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use easel_utils::atomic_write;
use easel_utils::error::StoreError;
use easel_utils::paths::ensure_dir_all;
use easel_utils::types::ImageFormat;

/// Filename prefix for stored assets. Files without it (and any
/// subdirectories, e.g. a co-located cache dir) are ignored by scans.
const ASSET_PREFIX: &str = "asset-";

/// URI scheme prefix for store handles.
const FILE_SCHEME: &str = "file://";

/// Capacity bounds enforced on writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    pub max_assets: usize,
    pub max_total_bytes: u64,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_assets: 256,
            max_total_bytes: 268_435_456, // 256 MiB
        }
    }
}

/// Metadata for one stored asset, recovered from the filesystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMeta {
    pub uri: String,
    pub byte_len: u64,
    pub format: ImageFormat,
    pub created_at: DateTime<Utc>,
}

impl AssetMeta {
    /// Local filesystem path behind the URI.
    #[must_use]
    pub fn path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(self.uri.strip_prefix(FILE_SCHEME).unwrap_or(&self.uri))
    }

    /// Age relative to `now`. Clock skew yields zero, never negative.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.created_at).to_std().unwrap_or_default()
    }
}

/// Aggregate store usage, for capacity checks and status output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreUsage {
    pub asset_count: usize,
    pub total_bytes: u64,
}

/// Store for generated image artifacts.
///
/// Construct one per storage root with explicit limits; nothing here
/// reads process-global settings. Assets are plain files, so concurrent
/// readers need no coordination; the monotonic sequence counter keeps
/// writers in one process from colliding on a filename within the same
/// millisecond.
#[derive(Debug)]
pub struct AssetStore {
    root: Utf8PathBuf,
    limits: StoreLimits,
    seq: AtomicU64,
}

impl AssetStore {
    /// Open (creating if necessary) the store rooted at `root`.
    pub fn new(root: impl Into<Utf8PathBuf>, limits: StoreLimits) -> Result<Self, StoreError> {
        let root = root.into();
        ensure_dir_all(&root)?;
        Ok(Self {
            root,
            limits,
            seq: AtomicU64::new(0),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    #[must_use]
    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    /// Write asset bytes once and return their metadata.
    ///
    /// Fails with [`StoreError::CapacityExceeded`] when the write would
    /// push the store past its count or byte limit; callers sweep and
    /// retry once before surfacing that.
    pub fn put(&self, bytes: &[u8], format: ImageFormat) -> Result<AssetMeta, StoreError> {
        ensure_dir_all(&self.root)?;

        let usage = self.usage()?;
        let incoming_bytes = bytes.len() as u64;
        if usage.asset_count + 1 > self.limits.max_assets
            || usage.total_bytes + incoming_bytes > self.limits.max_total_bytes
        {
            return Err(StoreError::CapacityExceeded {
                asset_count: usage.asset_count,
                max_assets: self.limits.max_assets,
                total_bytes: usage.total_bytes,
                max_bytes: self.limits.max_total_bytes,
            });
        }

        let name = self.next_asset_name(format);
        let path = self.root.join(&name);
        atomic_write::write_bytes_atomic(&path, bytes).map_err(|e| StoreError::WriteFailed {
            path: path.to_string(),
            reason: format!("{e:#}"),
        })?;

        let created_at: DateTime<Utc> = fs::metadata(path.as_std_path())?.modified()?.into();
        let meta = AssetMeta {
            uri: file_uri(&path),
            byte_len: incoming_bytes,
            format,
            created_at,
        };
        debug!(uri = %meta.uri, bytes = incoming_bytes, format = %format, "stored asset");
        Ok(meta)
    }

    /// Read asset bytes back.
    pub fn get(&self, uri: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(uri)?;
        match fs::read(path.as_std_path()) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
                uri: uri.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Metadata for one asset.
    pub fn metadata(&self, uri: &str) -> Result<AssetMeta, StoreError> {
        let path = self.resolve(uri)?;
        let md = match fs::metadata(path.as_std_path()) {
            Ok(md) => md,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    uri: uri.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let format = path
            .extension()
            .and_then(ImageFormat::from_extension)
            .unwrap_or_default();
        Ok(AssetMeta {
            uri: file_uri(&path),
            byte_len: md.len(),
            format,
            created_at: md.modified()?.into(),
        })
    }

    /// Enumerate stored assets, oldest first.
    ///
    /// Only regular files carrying the asset prefix and a known image
    /// extension count; anything else under the root is left alone.
    pub fn list(&self) -> Result<Vec<AssetMeta>, StoreError> {
        let entries = match fs::read_dir(self.root.as_std_path()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut assets = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !name.starts_with(ASSET_PREFIX) {
                continue;
            }
            let Some(format) = name
                .rsplit_once('.')
                .and_then(|(_, ext)| ImageFormat::from_extension(ext))
            else {
                continue;
            };

            let md = entry.metadata()?;
            let path = self.root.join(name);
            assets.push(AssetMeta {
                uri: file_uri(&path),
                byte_len: md.len(),
                format,
                created_at: md.modified()?.into(),
            });
        }

        // Oldest first; URI breaks mtime ties so sweeps are stable.
        assets.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.uri.cmp(&b.uri))
        });
        Ok(assets)
    }

    /// Aggregate usage across all stored assets.
    pub fn usage(&self) -> Result<StoreUsage, StoreError> {
        let assets = self.list()?;
        Ok(StoreUsage {
            asset_count: assets.len(),
            total_bytes: assets.iter().map(|a| a.byte_len).sum(),
        })
    }

    /// Remove one asset, returning the metadata it had.
    pub fn delete(&self, uri: &str) -> Result<AssetMeta, StoreError> {
        let meta = self.metadata(uri)?;
        match fs::remove_file(meta.path().as_std_path()) {
            Ok(()) => {
                debug!(uri = %meta.uri, bytes = meta.byte_len, "deleted asset");
                Ok(meta)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
                uri: uri.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a handle to a local path.
    ///
    /// Accepts `file://` URIs and bare filesystem paths; callers pass
    /// both interchangeably. Any other scheme is an error.
    pub fn resolve(&self, uri: &str) -> Result<Utf8PathBuf, StoreError> {
        if let Some(raw) = uri.strip_prefix(FILE_SCHEME) {
            return Ok(Utf8PathBuf::from(raw));
        }
        if uri.contains("://") {
            return Err(StoreError::InvalidUri {
                uri: uri.to_string(),
            });
        }
        Ok(Utf8PathBuf::from(uri))
    }

    fn next_asset_name(&self, format: ImageFormat) -> String {
        let stamp = Utc::now().timestamp_millis();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{ASSET_PREFIX}{stamp}-{seq:04}.{}", format.extension())
    }
}

/// Wrap a local path in the store's URI scheme.
#[must_use]
pub fn file_uri(path: &Utf8Path) -> String {
    format!("{FILE_SCHEME}{path}")
}
