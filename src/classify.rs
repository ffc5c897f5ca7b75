//! Media kind classification from filenames.
//!
//! Every file the importer sees gets exactly one [`MediaKind`], decided by a
//! fixed match table over the filename. The table is order-sensitive and
//! first-match-wins, so the same name always classifies the same way:
//!
//! 1. extension `mp4`, or the name contains `video/` → [`MediaKind::Video`]
//! 2. extension `heic`, or the name contains `image/heic` → [`MediaKind::Heic`]
//! 3. extension in the raster set (`jpg`, `jpeg`, `png`, `gif`, `webp`,
//!    `bmp`, `svg`) → [`MediaKind::Image`]
//! 4. anything else → [`MediaKind::Unknown`]
//!
//! All checks are case-insensitive. The substring rules exist because asset
//! paths sourced from bundlers can carry a content-type hint (`video/`,
//! `image/heic`) in the path itself rather than in the extension.
//!
//! ## Logos
//!
//! A filename is logo-shaped when it contains the literal `logo.` or ends in
//! `logo.png`/`logo.jpg` (case-insensitive). The classifier only answers the
//! per-name question; picking *the* logo of a folder (first match in import
//! order) is the importer's job.
//!
//! `Unknown` is a rendering category, not an error: unclassifiable files stay
//! in the folder's asset list and display as a labeled placeholder.

use serde::{Deserialize, Serialize};

/// Raster extensions that classify as plain images.
const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];

/// What a media file is, decided once at import time from its filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Heic,
    Unknown,
}

/// Result of classifying a single filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: MediaKind,
    /// Name matches the logo pattern. Whether it *becomes* a folder's logo
    /// depends on import order (first match wins); see the importer.
    pub is_logo: bool,
}

/// Classify a filename. Pure and total: never errors, never panics.
pub fn classify(file_name: &str) -> Classification {
    let lower = file_name.to_lowercase();
    let ext = extension_of(&lower);

    let kind = if ext == Some("mp4") || lower.contains("video/") {
        MediaKind::Video
    } else if ext == Some("heic") || lower.contains("image/heic") {
        MediaKind::Heic
    } else if ext.is_some_and(|e| RASTER_EXTENSIONS.contains(&e)) {
        MediaKind::Image
    } else {
        MediaKind::Unknown
    };

    Classification {
        kind,
        is_logo: is_logo_name(&lower),
    }
}

/// Extension of an already-lowercased name, without the dot.
///
/// `"a.b.HEIC"` (lowercased) → `Some("heic")`; a name with no dot, or
/// nothing after the last dot, has no extension.
fn extension_of(lower: &str) -> Option<&str> {
    let dot = lower.rfind('.')?;
    let ext = &lower[dot + 1..];
    // A trailing slash after the dot means the "extension" is a path segment
    if ext.is_empty() || ext.contains('/') {
        None
    } else {
        Some(ext)
    }
}

fn is_logo_name(lower: &str) -> bool {
    lower.contains("logo.") || lower.ends_with("logo.png") || lower.ends_with("logo.jpg")
}
