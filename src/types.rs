//! Shared types used across all pipeline stages.
//!
//! These types are serialized to JSON between stages (scan → convert →
//! generate) and must be identical across all three modules.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::classify::MediaKind;
use crate::config::GalleryConfig;

/// Manifest filename used by every stage: `<temp>/catalog.json` after scan,
/// `<temp>/converted/catalog.json` after convert.
pub const CATALOG_FILENAME: &str = "catalog.json";

/// One media file tracked by the gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Source-relative locator: `<folder>/.../<file>`.
    pub path: PathBuf,
    /// Original filename, the input the classifier saw.
    pub file_name: String,
    /// Computed once at scan time; re-deriving from the same name always
    /// yields the same kind.
    pub kind: MediaKind,
    /// Caption from the sidecar, if one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Ordered, deduplicated tags from the sidecar.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Filled in by the convert stage, heic assets only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion: Option<ConversionRecord>,
}

/// Durable outcome of transcoding one heic asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ConversionRecord {
    /// JPEG written at `output`, relative to the converted directory.
    Ready { output: PathBuf },
    /// Transcode failed; the asset renders as a failure placeholder and is
    /// not retried automatically.
    Failed { reason: String },
}

/// A named grouping of assets: one event directory under the source root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    /// Unique key: the directory name.
    pub name: String,
    /// Humanized display label (`spring-gala` → `spring gala`).
    pub label: String,
    /// Raw Markdown from `description.md`, if the folder has one. Rendered
    /// to HTML by the generate stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// First logo-pattern match in import order. Never also present in
    /// `assets`; a folder without one renders an initial-letter badge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<Asset>,
    /// Assets in import order, logo excluded.
    pub assets: Vec<Asset>,
}

/// Scan manifest root: every folder plus the effective config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub config: GalleryConfig,
}

impl Catalog {
    /// Look up a folder by its unique name.
    pub fn folder(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.name == name)
    }
}
