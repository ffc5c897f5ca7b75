//! Sidecar metadata for media files.
//!
//! Each media file can carry a caption and tags from a JSON sidecar with the
//! same stem: `dance-floor.jpg` is described by `dance-floor.json` in the
//! same directory. The sidecar is a plain JSON object:
//!
//! ```json
//! { "caption": "First dance", "tags": ["ceremony", "evening"] }
//! ```
//!
//! Both fields are optional and an absent sidecar is the common case —
//! assets without one get an empty caption and no tags. Unknown extra fields
//! are tolerated (sidecars are hand-written). A sidecar that exists but does
//! not parse is an error, surfaced with the offending path: scan time is the
//! one moment the user can fix it.
//!
//! ## Normalization
//!
//! Captions are trimmed; a whitespace-only caption counts as absent. Tags
//! behave as an ordered set: each tag is trimmed, empty tags are dropped,
//! and duplicates keep their first occurrence.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to read sidecar {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid sidecar JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Parsed, normalized sidecar contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Sidecar {
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Whether `path` is in the sidecar namespace (any `.json` file). The
/// importer skips these when enumerating media.
pub fn is_sidecar_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Read the sidecar for a media file, if one exists.
///
/// Given `content/gala/dance-floor.jpg`, looks for
/// `content/gala/dance-floor.json`. A missing sidecar is `Ok(None)`;
/// unreadable or malformed sidecars are errors.
pub fn read_sidecar(media_path: &Path) -> Result<Option<Sidecar>, MetadataError> {
    let sidecar_path = media_path.with_extension("json");
    if !sidecar_path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&sidecar_path).map_err(|source| MetadataError::Read {
        path: sidecar_path.clone(),
        source,
    })?;
    let parsed: Sidecar = serde_json::from_str(&raw).map_err(|source| MetadataError::Parse {
        path: sidecar_path,
        source,
    })?;
    Ok(Some(normalize(parsed)))
}

fn normalize(mut sidecar: Sidecar) -> Sidecar {
    sidecar.caption = sidecar
        .caption
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from);
    sidecar.tags = normalize_tags(&sidecar.tags);
    sidecar
}

/// Trim, drop empties, dedup keeping the first occurrence.
pub fn normalize_tags(raw: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
