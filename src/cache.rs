//! Conversion cache for incremental builds.
//!
//! HEIC transcoding is the bottleneck of the build pipeline — decoding an
//! AV1-coded still and re-encoding it as JPEG can take seconds per photo.
//! This module lets the convert stage skip transcoding when the source file
//! and the encoding quality haven't changed since the last build.
//!
//! # Design
//!
//! The cache targets only the transcode itself. Everything else — scanning,
//! classification, sidecar metadata — always runs, so caption and tag edits
//! are picked up immediately without a cache bust.
//!
//! ## Cache keys
//!
//! The cache is **content-addressed**: lookups are by the combination of
//! `source_hash` and `params_hash`, not by output file path. Folder renames
//! and file moves do not invalidate the cache — only actual source bytes or
//! quality changes do.
//!
//! - **`source_hash`**: SHA-256 of the source file contents. Content-based
//!   rather than mtime-based so it survives `git checkout` (which resets
//!   modification times).
//!
//! - **`params_hash`**: SHA-256 of the conversion parameters — currently the
//!   JPEG quality. Change the quality in `gallery.toml` and every heic asset
//!   is re-transcoded.
//!
//! A cache hit requires:
//! 1. An entry with matching `source_hash` and `params_hash` exists
//! 2. The previously-written output file still exists on disk
//!
//! When a hit is found but the output path has changed (e.g. folder
//! renamed), the cached file is copied to the new location instead of
//! re-transcoded.
//!
//! ## Storage
//!
//! The cache manifest is a JSON file at `<converted_dir>/.cache-manifest.json`.
//! It lives alongside the converted JPEGs so it travels with the temp
//! directory when cached in CI.
//!
//! ## Bypassing the cache
//!
//! Pass `--no-cache` to the `build` or `convert` command to force a full
//! re-transcode. This loads an empty manifest, so every heic asset runs
//! through the codec again. Old output files are overwritten naturally.
//!
//! Only successful conversions are recorded. A failed asset (unsupported
//! payload, unreadable file) is re-attempted on the next run — the file may
//! have been fixed in the meantime — while within a single run the
//! [`Converter`](crate::heic::Converter) slot table guarantees it is tried
//! exactly once.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;

/// Name of the cache manifest file within the converted directory.
const MANIFEST_FILENAME: &str = ".cache-manifest.json";

/// Version of the cache manifest format. Bump this to invalidate all
/// existing caches when the format or key computation changes.
const MANIFEST_VERSION: u32 = 1;

/// A single cached output file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
}

/// On-disk cache manifest mapping output paths to their cache entries.
///
/// Lookups go through a runtime `content_index` that maps
/// `"{source_hash}:{params_hash}"` to the stored output path, making the
/// cache resilient to folder renames and file moves.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
    /// Runtime reverse index: `"{source_hash}:{params_hash}"` → output_path.
    /// Built at load time, maintained on insert. Never serialized.
    #[serde(skip)]
    content_index: HashMap<String, String>,
}

impl CacheManifest {
    /// Create an empty manifest (used for `--no-cache` or first build).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
            content_index: HashMap::new(),
        }
    }

    /// Load from the converted directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(converted_dir: &Path) -> Self {
        let path = converted_dir.join(MANIFEST_FILENAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let mut manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => return Self::empty(),
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest.content_index = build_content_index(&manifest.entries);
        manifest
    }

    /// Save to the converted directory.
    pub fn save(&self, converted_dir: &Path) -> io::Result<()> {
        let path = converted_dir.join(MANIFEST_FILENAME);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Look up a cached output file by content hashes.
    ///
    /// Returns `Some(stored_output_path)` if an entry with matching
    /// `source_hash` and `params_hash` exists **and** the file is still on
    /// disk. The returned path may differ from the caller's expected output
    /// path (e.g. after a folder rename); the caller is responsible for
    /// copying the file to the new location if needed.
    pub fn find_cached(
        &self,
        source_hash: &str,
        params_hash: &str,
        converted_dir: &Path,
    ) -> Option<String> {
        let content_key = format!("{}:{}", source_hash, params_hash);
        let stored_path = self.content_index.get(&content_key)?;
        if converted_dir.join(stored_path).exists() {
            Some(stored_path.clone())
        } else {
            None
        }
    }

    /// Record a cache entry for an output file.
    ///
    /// If an entry with the same content (source_hash + params_hash) already
    /// exists under a different output path, the old entry is removed to keep
    /// the manifest clean when assets move (e.g. folder rename).
    pub fn insert(&mut self, output_path: String, source_hash: String, params_hash: String) {
        let content_key = format!("{}:{}", source_hash, params_hash);

        // Remove stale entry if content moved to a new path
        if let Some(old_path) = self.content_index.get(&content_key)
            && *old_path != output_path
        {
            self.entries.remove(old_path.as_str());
        }

        self.content_index.insert(content_key, output_path.clone());
        self.entries.insert(
            output_path,
            CacheEntry {
                source_hash,
                params_hash,
            },
        );
    }
}

/// Build the content_index reverse map from the entries map.
fn build_content_index(entries: &HashMap<String, CacheEntry>) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(output_path, entry)| {
            let content_key = format!("{}:{}", entry.source_hash, entry.params_hash);
            (content_key, output_path.clone())
        })
        .collect()
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// SHA-256 hash of the conversion parameters.
///
/// Currently the JPEG quality is the only knob. If it changes, every
/// previously cached output is invalid.
pub fn hash_convert_params(quality: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"convert\0");
    hasher.update(quality.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

/// Summary of cache performance for a convert run.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: u32,
    pub copies: u32,
    pub misses: u32,
    pub failures: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn copy(&mut self) {
        self.copies += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn fail(&mut self) {
        self.failures += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.copies + self.misses + self.failures
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 || self.copies > 0 || self.failures > 0 {
            let mut parts = Vec::new();
            if self.hits > 0 {
                parts.push(format!("{} cached", self.hits));
            }
            if self.copies > 0 {
                parts.push(format!("{} copied", self.copies));
            }
            parts.push(format!("{} converted", self.misses));
            if self.failures > 0 {
                parts.push(format!("{} failed", self.failures));
            }
            write!(f, "{} ({} total)", parts.join(", "), self.total())
        } else {
            write!(f, "{} converted", self.misses)
        }
    }
}
