//! Shared test utilities for the mixed-gal test suite.
//!
//! Provides in-memory catalog builders, on-disk fixture writers, and lookup
//! helpers that panic with a clear message on miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let content = tmp.path().join("content");
//! write_file(&content, "gala/dance.jpg", b"jpeg bytes");
//!
//! let catalog = crate::scan::scan(&content).unwrap();
//! let folder = find_folder(&catalog, "gala");
//! let asset = find_asset(folder, "dance.jpg");
//! assert_eq!(asset.kind, MediaKind::Image);
//! ```

use std::path::{Path, PathBuf};

use crate::classify;
use crate::config::GalleryConfig;
use crate::naming;
use crate::types::{Asset, CATALOG_FILENAME, Catalog, Folder};

// =========================================================================
// In-memory catalog builders
// =========================================================================

/// Build a bare asset of the kind its filename classifies to.
pub fn media_asset(folder: &str, name: &str) -> Asset {
    Asset {
        path: PathBuf::from(folder).join(name),
        file_name: name.to_string(),
        kind: classify::classify(name).kind,
        caption: None,
        tags: Vec::new(),
        conversion: None,
    }
}

/// Build an asset carrying sidecar tags.
pub fn tagged_asset(folder: &str, name: &str, tags: &[&str]) -> Asset {
    let mut asset = media_asset(folder, name);
    asset.tags = tags.iter().map(|t| t.to_string()).collect();
    asset
}

/// Build a folder with the label the scanner would derive from its name.
pub fn folder_with(name: &str, assets: Vec<Asset>) -> Folder {
    Folder {
        name: name.to_string(),
        label: naming::folder_label(name),
        description: None,
        logo: None,
        assets,
    }
}

/// Build a catalog with default config.
pub fn catalog_with(folders: Vec<Folder>) -> Catalog {
    Catalog {
        folders,
        config: GalleryConfig::default(),
    }
}

// =========================================================================
// On-disk fixtures
// =========================================================================

/// Write `bytes` at `root/rel`, creating parent directories as needed.
pub fn write_file(root: &Path, rel: &str, bytes: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Scan `root` and write the resulting catalog to `temp/catalog.json`.
pub fn scan_to_manifest(root: &Path, temp: &Path) -> PathBuf {
    let catalog = crate::scan::scan(root).unwrap();
    write_manifest(&catalog, temp)
}

/// Serialize a catalog to `temp/catalog.json`. Returns the manifest path.
pub fn write_manifest(catalog: &Catalog, temp: &Path) -> PathBuf {
    std::fs::create_dir_all(temp).unwrap();
    let path = temp.join(CATALOG_FILENAME);
    let json = serde_json::to_string_pretty(catalog).unwrap();
    std::fs::write(&path, json).unwrap();
    path
}

// =========================================================================
// Catalog lookups — panics with a clear message on miss
// =========================================================================

/// Find a folder by name. Panics if not found.
pub fn find_folder<'a>(catalog: &'a Catalog, name: &str) -> &'a Folder {
    catalog.folder(name).unwrap_or_else(|| {
        let names: Vec<&str> = catalog.folders.iter().map(|f| f.name.as_str()).collect();
        panic!("folder '{name}' not found. Available: {names:?}")
    })
}

/// Find an asset by filename within a folder. Panics if not found.
pub fn find_asset<'a>(folder: &'a Folder, file_name: &str) -> &'a Asset {
    folder
        .assets
        .iter()
        .find(|a| a.file_name == file_name)
        .unwrap_or_else(|| {
            let names: Vec<&str> = folder.assets.iter().map(|a| a.file_name.as_str()).collect();
            panic!(
                "asset '{file_name}' not found in folder '{}'. Available: {names:?}",
                folder.name
            )
        })
}
