//! Filesystem scanning and catalog generation.
//!
//! Stage 1 of the build pipeline. Walks the source tree once, classifies
//! every media file, picks folder logos, attaches sidecar metadata, and
//! produces the [`Catalog`] manifest that the convert and generate stages
//! consume.
//!
//! ## Directory Structure
//!
//! Each immediate subdirectory of the source root is one folder (an event or
//! album). Files nested deeper roll up to that folder, keeping their
//! relative paths:
//!
//! ```text
//! content/                         # Source root
//! ├── gallery.toml                 # Gallery configuration (optional)
//! ├── spring-gala/                 # Folder
//! │   ├── description.md           # Folder description (optional, Markdown)
//! │   ├── logo.png                 # Folder logo (first logo match wins)
//! │   ├── dance-floor.jpg
//! │   ├── dance-floor.json         # Sidecar: caption + tags
//! │   ├── toast.heic
//! │   └── highlights.mp4
//! └── graduation_2024/
//!     ├── stage/walk.jpg           # Rolls up to graduation_2024
//!     └── slideshow.mp4
//! ```
//!
//! ## Import order
//!
//! Within a folder, files are imported depth-first, name-sorted at each
//! level. That order is the folder's asset order and the tie-break for logo
//! selection: the *first* file matching the logo pattern becomes the
//! folder's logo and is removed from the asset list; later logo-shaped files
//! stay ordinary assets.
//!
//! ## Reserved names
//!
//! Not imported as assets: hidden entries (leading dot), `*.json` (the
//! sidecar namespace), `description.md`, and `gallery.toml`. Everything
//! else becomes an asset — files the classifier cannot place are kept as
//! `unknown` and render as labeled placeholders, they never silently
//! disappear from a folder's count.
//!
//! Loose files directly in the source root belong to no folder and are
//! skipped. Folders with no assets and no logo are skipped entirely.

use crate::classify::{self, MediaKind};
use crate::config::{self, GalleryConfig};
use crate::metadata::{self, MetadataError};
use crate::naming;
use crate::types::{Asset, Catalog, Folder};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Sidecar error: {0}")]
    Metadata(#[from] MetadataError),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Source directory not found: {0}")]
    MissingRoot(PathBuf),
}

/// File names that never become assets.
const DESCRIPTION_FILE: &str = "description.md";

pub fn scan(root: &Path) -> Result<Catalog, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }

    let config = config::load_config(root)?;

    let mut folder_dirs: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir() && !is_hidden_name(p))
        .collect();
    folder_dirs.sort();

    let mut folders = Vec::new();
    for dir in &folder_dirs {
        if let Some(folder) = build_folder(dir, root)? {
            folders.push(folder);
        }
    }

    Ok(Catalog { folders, config })
}

/// Build one folder from its directory, or `None` if there is nothing to
/// show (no media, no logo).
fn build_folder(dir: &Path, root: &Path) -> Result<Option<Folder>, ScanError> {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut logo: Option<Asset> = None;
    let mut assets: Vec<Asset> = Vec::new();

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden_name(e.path()))
    {
        let entry = entry?;
        if !entry.file_type().is_file() || is_reserved(entry.path()) {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        let classification = classify::classify(&file_name);
        let sidecar = metadata::read_sidecar(entry.path())?.unwrap_or_default();

        let asset = Asset {
            path: entry
                .path()
                .strip_prefix(root)
                .expect("walked path is under root")
                .to_path_buf(),
            file_name,
            kind: classification.kind,
            caption: sidecar.caption,
            tags: sidecar.tags,
            conversion: None,
        };

        // First logo match in import order wins; later matches stay assets.
        if classification.is_logo && logo.is_none() {
            logo = Some(asset);
        } else {
            assets.push(asset);
        }
    }

    if assets.is_empty() && logo.is_none() {
        return Ok(None);
    }

    let description = read_description(dir)?;

    Ok(Some(Folder {
        label: naming::folder_label(&name),
        name,
        description,
        logo,
        assets,
    }))
}

/// Raw Markdown from the folder's `description.md`, if present and
/// non-empty.
fn read_description(dir: &Path) -> Result<Option<String>, ScanError> {
    let path = dir.join(DESCRIPTION_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let trimmed = content.trim();
    Ok(if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    })
}

fn is_hidden_name(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn is_reserved(path: &Path) -> bool {
    if metadata::is_sidecar_file(path) {
        return true;
    }
    path.file_name()
        .map(|n| n == DESCRIPTION_FILE || n == config::CONFIG_FILE)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConversionRecord;
    use std::fs;
    use tempfile::TempDir;

    fn folder_dir(tmp: &TempDir, name: &str) -> PathBuf {
        let dir = tmp.path().join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    // =========================================================================
    // Folder discovery
    // =========================================================================

    #[test]
    fn scan_finds_folders_sorted_by_name() {
        let tmp = TempDir::new().unwrap();
        for name in ["winter-ball", "alumni", "spring-gala"] {
            let dir = folder_dir(&tmp, name);
            fs::write(dir.join("a.jpg"), b"fake image").unwrap();
        }

        let catalog = scan(tmp.path()).unwrap();
        let names: Vec<&str> = catalog.folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["alumni", "spring-gala", "winter-ball"]);
    }

    #[test]
    fn folder_labels_are_humanized() {
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "staff_party_2024");
        fs::write(dir.join("a.jpg"), b"fake image").unwrap();

        let catalog = scan(tmp.path()).unwrap();
        assert_eq!(catalog.folders[0].label, "staff party 2024");
    }

    #[test]
    fn loose_root_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("stray.jpg"), b"fake image").unwrap();
        let dir = folder_dir(&tmp, "gala");
        fs::write(dir.join("a.jpg"), b"fake image").unwrap();

        let catalog = scan(tmp.path()).unwrap();
        assert_eq!(catalog.folders.len(), 1);
        assert_eq!(catalog.folders[0].assets.len(), 1);
    }

    #[test]
    fn empty_folder_is_skipped() {
        let tmp = TempDir::new().unwrap();
        folder_dir(&tmp, "empty");
        let dir = folder_dir(&tmp, "gala");
        fs::write(dir.join("a.jpg"), b"fake image").unwrap();

        let catalog = scan(tmp.path()).unwrap();
        assert_eq!(catalog.folders.len(), 1);
        assert_eq!(catalog.folders[0].name, "gala");
    }

    #[test]
    fn hidden_entries_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "gala");
        fs::write(dir.join("a.jpg"), b"fake image").unwrap();
        fs::write(dir.join(".DS_Store"), b"junk").unwrap();
        fs::create_dir_all(tmp.path().join(".git")).unwrap();

        let catalog = scan(tmp.path()).unwrap();
        assert_eq!(catalog.folders.len(), 1);
        assert_eq!(catalog.folders[0].assets.len(), 1);
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(scan(&missing), Err(ScanError::MissingRoot(_))));
    }

    #[test]
    fn empty_source_yields_empty_catalog() {
        let tmp = TempDir::new().unwrap();
        let catalog = scan(tmp.path()).unwrap();
        assert!(catalog.folders.is_empty());
    }

    // =========================================================================
    // Classification and import order
    // =========================================================================

    #[test]
    fn spring_gala_scenario() {
        // [a.jpg, b.mp4, logo.png, c.heic] → logo out, three assets in order
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "spring-gala");
        fs::write(dir.join("a.jpg"), b"fake image").unwrap();
        fs::write(dir.join("b.mp4"), b"fake video").unwrap();
        fs::write(dir.join("logo.png"), b"fake image").unwrap();
        fs::write(dir.join("c.heic"), b"fake heic").unwrap();

        let catalog = scan(tmp.path()).unwrap();
        let folder = catalog.folder("spring-gala").unwrap();

        assert_eq!(folder.logo.as_ref().unwrap().file_name, "logo.png");
        let listing: Vec<(&str, MediaKind)> = folder
            .assets
            .iter()
            .map(|a| (a.file_name.as_str(), a.kind))
            .collect();
        assert_eq!(
            listing,
            vec![
                ("a.jpg", MediaKind::Image),
                ("b.mp4", MediaKind::Video),
                ("c.heic", MediaKind::Heic),
            ]
        );
    }

    #[test]
    fn folder_without_logo_keeps_every_file() {
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "gala");
        fs::write(dir.join("a.jpg"), b"fake image").unwrap();
        fs::write(dir.join("b.png"), b"fake image").unwrap();

        let catalog = scan(tmp.path()).unwrap();
        let folder = &catalog.folders[0];
        assert!(folder.logo.is_none());
        assert_eq!(folder.assets.len(), 2);
    }

    #[test]
    fn first_logo_in_import_order_wins() {
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "gala");
        fs::write(dir.join("a-logo.png"), b"fake image").unwrap();
        fs::write(dir.join("b.jpg"), b"fake image").unwrap();
        fs::write(dir.join("z-logo.jpg"), b"fake image").unwrap();

        let catalog = scan(tmp.path()).unwrap();
        let folder = &catalog.folders[0];

        // a-logo.png sorts first, so it is the logo; z-logo.jpg stays an
        // ordinary asset in position
        assert_eq!(folder.logo.as_ref().unwrap().file_name, "a-logo.png");
        let names: Vec<&str> = folder.assets.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(names, vec!["b.jpg", "z-logo.jpg"]);
    }

    #[test]
    fn folder_with_only_a_logo_is_kept() {
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "gala");
        fs::write(dir.join("logo.png"), b"fake image").unwrap();

        let catalog = scan(tmp.path()).unwrap();
        let folder = &catalog.folders[0];
        assert!(folder.logo.is_some());
        assert!(folder.assets.is_empty());
    }

    #[test]
    fn unknown_files_are_kept_as_assets() {
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "gala");
        fs::write(dir.join("a.jpg"), b"fake image").unwrap();
        fs::write(dir.join("notes.txt"), b"not media").unwrap();

        let catalog = scan(tmp.path()).unwrap();
        let folder = &catalog.folders[0];
        assert_eq!(folder.assets.len(), 2);
        let unknown = folder
            .assets
            .iter()
            .find(|a| a.file_name == "notes.txt")
            .unwrap();
        assert_eq!(unknown.kind, MediaKind::Unknown);
    }

    #[test]
    fn nested_files_roll_up_to_the_folder() {
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "graduation");
        fs::create_dir_all(dir.join("stage")).unwrap();
        fs::write(dir.join("slideshow.mp4"), b"fake video").unwrap();
        fs::write(dir.join("stage").join("walk.jpg"), b"fake image").unwrap();

        let catalog = scan(tmp.path()).unwrap();
        assert_eq!(catalog.folders.len(), 1);
        let folder = &catalog.folders[0];
        assert_eq!(folder.assets.len(), 2);

        let nested = folder
            .assets
            .iter()
            .find(|a| a.file_name == "walk.jpg")
            .unwrap();
        assert_eq!(nested.path, PathBuf::from("graduation/stage/walk.jpg"));
    }

    #[test]
    fn import_order_is_depth_first_name_sorted() {
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "gala");
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("b.jpg"), b"fake image").unwrap();
        fs::write(dir.join("sub").join("a.jpg"), b"fake image").unwrap();
        fs::write(dir.join("z.jpg"), b"fake image").unwrap();

        let catalog = scan(tmp.path()).unwrap();
        let names: Vec<&str> = catalog.folders[0]
            .assets
            .iter()
            .map(|a| a.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["b.jpg", "a.jpg", "z.jpg"]);
    }

    // =========================================================================
    // Sidecars and descriptions
    // =========================================================================

    #[test]
    fn sidecar_metadata_lands_on_the_right_asset() {
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "gala");
        fs::write(dir.join("a.jpg"), b"fake image").unwrap();
        fs::write(
            dir.join("a.json"),
            r#"{"caption": "First dance", "tags": ["ceremony"]}"#,
        )
        .unwrap();
        fs::write(dir.join("b.jpg"), b"fake image").unwrap();

        let catalog = scan(tmp.path()).unwrap();
        let folder = &catalog.folders[0];
        let a = folder.assets.iter().find(|x| x.file_name == "a.jpg").unwrap();
        let b = folder.assets.iter().find(|x| x.file_name == "b.jpg").unwrap();

        assert_eq!(a.caption.as_deref(), Some("First dance"));
        assert_eq!(a.tags, vec!["ceremony"]);
        assert_eq!(b.caption, None);
        assert!(b.tags.is_empty());
    }

    #[test]
    fn sidecar_files_are_not_assets() {
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "gala");
        fs::write(dir.join("a.jpg"), b"fake image").unwrap();
        fs::write(dir.join("a.json"), r#"{"caption": "x"}"#).unwrap();
        fs::write(dir.join("orphan.json"), r#"{"caption": "y"}"#).unwrap();

        let catalog = scan(tmp.path()).unwrap();
        assert_eq!(catalog.folders[0].assets.len(), 1);
    }

    #[test]
    fn malformed_sidecar_fails_the_scan_with_its_path() {
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "gala");
        fs::write(dir.join("a.jpg"), b"fake image").unwrap();
        fs::write(dir.join("a.json"), "{broken").unwrap();

        let err = scan(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("a.json"));
    }

    #[test]
    fn description_md_is_read_raw_and_not_imported() {
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "gala");
        fs::write(dir.join("a.jpg"), b"fake image").unwrap();
        fs::write(dir.join("description.md"), "# The Gala\n\nA *night*.\n").unwrap();

        let catalog = scan(tmp.path()).unwrap();
        let folder = &catalog.folders[0];
        assert_eq!(folder.assets.len(), 1);
        assert_eq!(
            folder.description.as_deref(),
            Some("# The Gala\n\nA *night*.")
        );
    }

    #[test]
    fn empty_description_counts_as_absent() {
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "gala");
        fs::write(dir.join("a.jpg"), b"fake image").unwrap();
        fs::write(dir.join("description.md"), "  \n ").unwrap();

        let catalog = scan(tmp.path()).unwrap();
        assert_eq!(catalog.folders[0].description, None);
    }

    #[test]
    fn nested_config_file_is_not_an_asset() {
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "gala");
        fs::write(dir.join("a.jpg"), b"fake image").unwrap();
        fs::write(dir.join("gallery.toml"), "title = \"x\"").unwrap();

        let catalog = scan(tmp.path()).unwrap();
        assert_eq!(catalog.folders[0].assets.len(), 1);
    }

    // =========================================================================
    // Manifest round-trip
    // =========================================================================

    #[test]
    fn catalog_survives_a_json_round_trip() {
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "spring-gala");
        fs::write(dir.join("a.jpg"), b"fake image").unwrap();
        fs::write(dir.join("a.json"), r#"{"tags": ["ceremony"]}"#).unwrap();
        fs::write(dir.join("c.heic"), b"fake heic").unwrap();
        fs::write(dir.join("logo.png"), b"fake image").unwrap();

        let catalog = scan(tmp.path()).unwrap();
        let json = serde_json::to_string_pretty(&catalog).unwrap();
        let back: Catalog = serde_json::from_str(&json).unwrap();

        assert_eq!(back.folders.len(), 1);
        let folder = &back.folders[0];
        assert_eq!(folder.name, "spring-gala");
        assert_eq!(folder.logo.as_ref().unwrap().file_name, "logo.png");
        assert_eq!(folder.assets.len(), 2);
        assert_eq!(folder.assets[0].tags, vec!["ceremony"]);
        assert_eq!(folder.assets[1].kind, MediaKind::Heic);
        assert_eq!(folder.assets[1].conversion, None::<ConversionRecord>);
    }

    #[test]
    fn scanned_assets_start_without_conversion_records() {
        let tmp = TempDir::new().unwrap();
        let dir = folder_dir(&tmp, "gala");
        fs::write(dir.join("c.heic"), b"fake heic").unwrap();

        let catalog = scan(tmp.path()).unwrap();
        assert!(catalog.folders[0].assets[0].conversion.is_none());
    }
}
