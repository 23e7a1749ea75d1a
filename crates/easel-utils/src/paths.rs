//! Directory layout for easel state.
//!
//! All durable state lives under a single home directory:
//!
//! ```text
//! <EASEL_HOME>/
//!   assets/    generated image files
//!   cache/     durable fingerprint -> asset cache entries
//! ```
//!
//! The home resolves from the `EASEL_HOME` environment variable, falling
//! back to `.easel` in the working directory. Configuration can override
//! the asset and cache directories individually.

use camino::Utf8PathBuf;

/// Resolve the easel home directory.
///
/// `EASEL_HOME` wins when set; otherwise `.easel` relative to the
/// working directory.
#[must_use]
pub fn easel_home() -> Utf8PathBuf {
    if let Ok(p) = std::env::var("EASEL_HOME") {
        return Utf8PathBuf::from(p);
    }
    Utf8PathBuf::from(".easel")
}

/// Returns `<EASEL_HOME>/assets`
#[must_use]
pub fn assets_dir() -> Utf8PathBuf {
    easel_home().join("assets")
}

/// Returns `<EASEL_HOME>/cache`
#[must_use]
pub fn cache_dir() -> Utf8PathBuf {
    easel_home().join("cache")
}

/// mkdir -p; treat `AlreadyExists` as success (removes TOCTTOU races)
pub fn ensure_dir_all<P: AsRef<std::path::Path>>(p: P) -> std::io::Result<()> {
    match std::fs::create_dir_all(&p) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdirectories_hang_off_the_home() {
        assert!(assets_dir().as_str().ends_with("assets"));
        assert!(cache_dir().as_str().ends_with("cache"));
    }

    #[test]
    fn ensure_dir_all_is_idempotent() {
        let td = tempfile::TempDir::new().unwrap();
        let nested = td.path().join("a").join("b");
        ensure_dir_all(&nested).unwrap();
        ensure_dir_all(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
