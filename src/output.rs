//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (folder, asset) is its semantic identity — label and
//! positional index — with filesystem paths shown as secondary context via
//! indented `Source:` lines. This makes the output readable as a content
//! inventory while still letting users trace data back to specific files.
//!
//! # Entity Display Contract
//!
//! Every entity follows a consistent two-level pattern across all stages:
//!
//! 1. **Header line**: positional index + label (+ optional detail like kind counts)
//! 2. **Context lines**: indented `Source:`, `Caption:`, conversion status, etc.
//!
//! Shared helpers ([`entity_header`], [`format_index`]) enforce this pattern
//! so scan, convert, and generate output look consistent for the same
//! entities.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Folders
//! 001 spring gala (1 image, 1 video, 1 heic)
//!     Source: spring-gala/
//!     Logo: logo.png
//!     A night to remember
//!     001 dance.jpg (image)
//!         Caption: First dance
//!         Tags: ceremony, dancing
//!     002 highlights.mp4 (video)
//!     003 toast.heic (heic)
//!
//! Tags
//!     all, ceremony, dancing
//!
//! Config
//!     gallery.toml (jpeg quality 85)
//! ```
//!
//! ## Convert
//!
//! ```text
//! spring gala (1 heic asset)
//!     001 toast.heic
//!         Source: spring-gala/toast.heic
//!         jpeg: converted
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html
//! 001 spring gala → index.html#spring-gala
//!     001 dance.jpg → spring-gala/1.html
//!
//! Tags
//!     001 ceremony → tags/ceremony/index.html
//!
//! Generated 1 folder, 1 slide page, 1 tag page
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::classify::MediaKind;
use crate::config;
use crate::convert::{ConvertEvent, ConvertStatus};
use crate::generate;
use crate::types::{Catalog, Folder};
use crate::view;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + label, with optional detail.
///
/// Used for folders (with kind counts) and tags (without).
///
/// ```text
/// 001 spring gala (2 images, 1 heic)
/// 001 ceremony
/// ```
fn entity_header(index: usize, label: &str, detail: Option<&str>) -> String {
    match detail {
        Some(detail) => format!("{} {} ({})", format_index(index), label, detail),
        None => format!("{} {}", format_index(index), label),
    }
}

/// `1 folder` / `3 folders`.
fn count_noun(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
/// Counts chars, not bytes, so multi-byte descriptions never split.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

/// Per-kind asset counts: `"2 images, 1 heic"`. A folder holding only a
/// logo reports `"no assets"`.
fn kind_summary(folder: &Folder) -> String {
    let mut images = 0;
    let mut videos = 0;
    let mut heic = 0;
    let mut unknown = 0;
    for asset in &folder.assets {
        match asset.kind {
            MediaKind::Image => images += 1,
            MediaKind::Video => videos += 1,
            MediaKind::Heic => heic += 1,
            MediaKind::Unknown => unknown += 1,
        }
    }

    let mut parts = Vec::new();
    if images > 0 {
        parts.push(count_noun(images, "image", "images"));
    }
    if videos > 0 {
        parts.push(count_noun(videos, "video", "videos"));
    }
    if heic > 0 {
        parts.push(format!("{heic} heic"));
    }
    if unknown > 0 {
        parts.push(format!("{unknown} other"));
    }

    if parts.is_empty() {
        "no assets".to_string()
    } else {
        parts.join(", ")
    }
}

fn kind_label(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image",
        MediaKind::Video => "video",
        MediaKind::Heic => "heic",
        MediaKind::Unknown => "unknown",
    }
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan stage output showing the discovered gallery structure.
///
/// Information-first: each folder leads with its positional index and label.
/// Source paths, logos, and sidecar metadata show as indented context lines.
pub fn format_scan_output(catalog: &Catalog, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Folders".to_string());
    if catalog.folders.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, folder) in catalog.folders.iter().enumerate() {
        format_folder(&mut lines, i + 1, folder);
    }

    // Tag universe, "all" included, exactly as the filter bar will show it
    let tags = view::tag_universe(catalog);
    if tags.len() > 1 {
        lines.push(String::new());
        lines.push("Tags".to_string());
        lines.push(format!("{}{}", indent(1), tags.join(", ")));
    }

    if source_root.join(config::CONFIG_FILE).is_file() {
        lines.push(String::new());
        lines.push("Config".to_string());
        lines.push(format!(
            "{}{} (jpeg quality {})",
            indent(1),
            config::CONFIG_FILE,
            catalog.config.conversion.jpeg_quality
        ));
    }

    lines
}

fn format_folder(lines: &mut Vec<String>, index: usize, folder: &Folder) {
    lines.push(entity_header(index, &folder.label, Some(&kind_summary(folder))));
    lines.push(format!("{}Source: {}/", indent(1), folder.name));

    if let Some(logo) = &folder.logo {
        lines.push(format!("{}Logo: {}", indent(1), logo.file_name));
    }

    // Description preview: first non-blank line, heading markers stripped
    if let Some(description) = &folder.description
        && let Some(line) = description.lines().find(|l| !l.trim().is_empty())
    {
        let preview = line.trim_start_matches('#').trim();
        if !preview.is_empty() {
            lines.push(format!("{}{}", indent(1), truncate_desc(preview, 60)));
        }
    }

    for (i, asset) in folder.assets.iter().enumerate() {
        lines.push(format!(
            "{}{} {} ({})",
            indent(1),
            format_index(i + 1),
            asset.file_name,
            kind_label(asset.kind)
        ));
        if let Some(caption) = &asset.caption {
            lines.push(format!("{}Caption: {}", indent(2), caption));
        }
        if !asset.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(2), asset.tags.join(", ")));
        }
    }
}

/// Print scan output to stdout.
pub fn print_scan_output(catalog: &Catalog, source_root: &Path) {
    for line in format_scan_output(catalog, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Convert output
// ============================================================================

/// Format a single convert progress event as display lines.
///
/// Information-first: each asset leads with its positional index and
/// filename. Source path and cache status are shown as indented context.
pub fn format_convert_event(event: &ConvertEvent) -> Vec<String> {
    match event {
        ConvertEvent::FolderStarted { label, heic_count } => {
            vec![format!(
                "{} ({})",
                label,
                count_noun(*heic_count, "heic asset", "heic assets")
            )]
        }
        ConvertEvent::AssetConverted {
            index,
            path,
            status,
        } => {
            let filename = path.rsplit('/').next().unwrap_or(path);
            let status_str = match status {
                ConvertStatus::Converted => "converted".to_string(),
                ConvertStatus::Cached => "cached".to_string(),
                ConvertStatus::Copied => "copied".to_string(),
                ConvertStatus::Failed(reason) => format!("failed ({reason})"),
            };
            vec![
                format!("{}{} {}", indent(1), format_index(*index), filename),
                format!("{}Source: {}", indent(2), path),
                format!("{}jpeg: {}", indent(2), status_str),
            ]
        }
    }
}

// ============================================================================
// Stage 3: Generate output
// ============================================================================

/// Format generate stage output showing generated HTML files.
///
/// Information-first: each entity leads with its positional index and label,
/// followed by `→` and the output path.
pub fn format_generate_output(catalog: &Catalog) -> Vec<String> {
    let mut lines = Vec::new();
    let mut slide_pages = 0;

    // Home page
    lines.push("Home \u{2192} index.html".to_string());

    for (i, folder) in catalog.folders.iter().enumerate() {
        lines.push(format!(
            "{} \u{2192} index.html#{}",
            entity_header(i + 1, &folder.label, None),
            folder.name
        ));
        for (j, asset) in folder.assets.iter().enumerate() {
            lines.push(format!(
                "{}{} {} \u{2192} {}/{}.html",
                indent(1),
                format_index(j + 1),
                asset.file_name,
                folder.name,
                j + 1
            ));
            slide_pages += 1;
        }
    }

    // Tag pages ("all" is the index itself, so it is skipped here)
    let tags: Vec<String> = view::tag_universe(catalog).into_iter().skip(1).collect();
    if !tags.is_empty() {
        lines.push(String::new());
        lines.push("Tags".to_string());
        for (i, tag) in tags.iter().enumerate() {
            lines.push(format!(
                "{}{} {} \u{2192} tags/{}/index.html",
                indent(1),
                format_index(i + 1),
                tag,
                generate::tag_slug(tag)
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}",
        count_noun(catalog.folders.len(), "folder", "folders"),
        count_noun(slide_pages, "slide page", "slide pages"),
        count_noun(tags.len(), "tag page", "tag pages")
    ));

    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(catalog: &Catalog) {
    for line in format_generate_output(catalog) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
