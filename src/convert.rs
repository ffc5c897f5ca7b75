//! HEIC conversion.
//!
//! Stage 2 of the build pipeline. Reads the catalog manifest produced by the
//! scan stage, transcodes every heic asset to JPEG, and writes the converted
//! files plus an updated manifest recording each asset's outcome.
//!
//! ## Output structure
//!
//! ```text
//! converted/                       # <temp>/converted/
//! ├── catalog.json                 # Input manifest + per-asset conversion records
//! ├── .cache-manifest.json         # Skip-cache, content-addressed
//! └── spring-gala/
//!     └── toast.heic.jpg           # Source-relative path with .jpg appended
//! ```
//!
//! Output names append `.jpg` to the full source file name rather than
//! replacing the extension, so `c.heic` can never collide with a sibling
//! `c.jpg` that already owns that name.
//!
//! ## Parallelism
//!
//! Folders run sequentially; the heic assets within a folder run on the
//! rayon pool. Each parallel batch produces plain outcome values, and a
//! serial pass applies them to the catalog, the cache, and the progress
//! channel. Pool size comes from `max_processes` in `gallery.toml` (see
//! [`config::effective_threads`](crate::config::effective_threads)).
//!
//! ## Failure handling
//!
//! A heic file the codec cannot handle — HEVC-coded payloads most commonly —
//! gets a [`ConversionRecord::Failed`] with the reason, and the stage keeps
//! going. One bad iPhone photo never takes down the build; the generate
//! stage renders a visible placeholder for it instead.

use crate::cache::{self, CacheManifest, CacheStats};
use crate::classify::MediaKind;
use crate::heic::{Av1HeifCodec, Conversion, Converter, HeicCodec, JpegQuality};
use crate::types::{Asset, CATALOG_FILENAME, Catalog, ConversionRecord};
use rayon::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Progress event streamed to the caller while the stage runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertEvent {
    /// A folder with at least one heic asset is about to convert.
    FolderStarted { label: String, heic_count: usize },
    /// One heic asset finished. `index` is 1-based within the folder's heic
    /// assets, in import order.
    AssetConverted {
        index: usize,
        path: String,
        status: ConvertStatus,
    },
}

/// How one asset's conversion was satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertStatus {
    /// Freshly transcoded this run.
    Converted,
    /// Skip-cache hit; the output was already on disk at the right path.
    Cached,
    /// Skip-cache hit under an old path; the file was copied forward.
    Copied,
    /// Transcode failed; the reason is recorded in the catalog.
    Failed(String),
}

/// Everything the stage produced: the updated catalog (also written to
/// `manifest_path`) and the cache performance summary.
pub struct ConvertOutcome {
    pub catalog: Catalog,
    pub manifest_path: PathBuf,
    pub cache_stats: CacheStats,
}

/// Run the convert stage with the production AV1 codec.
///
/// `catalog_path` is the scan-stage manifest; `source_root` is the content
/// directory its asset paths are relative to. Converted JPEGs and the
/// updated manifest land under `converted_dir`. Pass `use_cache = false` to
/// force a full re-transcode.
pub fn convert(
    catalog_path: &Path,
    source_root: &Path,
    converted_dir: &Path,
    use_cache: bool,
    events: Option<Sender<ConvertEvent>>,
) -> Result<ConvertOutcome, ConvertError> {
    let codec = Av1HeifCodec::new();
    convert_with_codec(&codec, catalog_path, source_root, converted_dir, use_cache, events)
}

/// Run the convert stage with a specific codec (tests use a mock).
pub fn convert_with_codec<C: HeicCodec + ?Sized>(
    codec: &C,
    catalog_path: &Path,
    source_root: &Path,
    converted_dir: &Path,
    use_cache: bool,
    events: Option<Sender<ConvertEvent>>,
) -> Result<ConvertOutcome, ConvertError> {
    let manifest_content = std::fs::read_to_string(catalog_path)?;
    let mut catalog: Catalog = serde_json::from_str(&manifest_content)?;

    std::fs::create_dir_all(converted_dir)?;

    let mut cache = if use_cache {
        CacheManifest::load(converted_dir)
    } else {
        CacheManifest::empty()
    };
    let mut stats = CacheStats::default();

    let quality = JpegQuality::new(catalog.config.conversion.jpeg_quality);
    let params_hash = cache::hash_convert_params(quality.value());
    let converter = Converter::new(codec, quality);

    for folder in &mut catalog.folders {
        let heic: Vec<usize> = folder
            .assets
            .iter()
            .enumerate()
            .filter(|(_, asset)| asset.kind == MediaKind::Heic)
            .map(|(i, _)| i)
            .collect();
        if heic.is_empty() {
            continue;
        }

        if let Some(tx) = &events {
            let _ = tx.send(ConvertEvent::FolderStarted {
                label: folder.label.clone(),
                heic_count: heic.len(),
            });
        }

        // The codec runs on the rayon pool; outcomes are applied serially so
        // the catalog, cache, and stats never need locks.
        let outcomes: Vec<(usize, AssetOutcome)> = {
            let assets = &folder.assets;
            heic.par_iter()
                .map(|&i| {
                    let outcome = convert_asset(
                        &assets[i],
                        source_root,
                        converted_dir,
                        &converter,
                        &cache,
                        &params_hash,
                    );
                    (i, outcome)
                })
                .collect()
        };

        for (position, (i, outcome)) in outcomes.into_iter().enumerate() {
            match &outcome.status {
                ConvertStatus::Converted => stats.miss(),
                ConvertStatus::Cached => stats.hit(),
                ConvertStatus::Copied => stats.copy(),
                ConvertStatus::Failed(_) => stats.fail(),
            }
            if let Some((output_path, source_hash)) = outcome.cache_entry {
                cache.insert(output_path, source_hash, params_hash.clone());
            }
            if let Some(tx) = &events {
                let _ = tx.send(ConvertEvent::AssetConverted {
                    index: position + 1,
                    path: rel_str(&folder.assets[i].path),
                    status: outcome.status,
                });
            }
            folder.assets[i].conversion = Some(outcome.record);
        }
    }

    if use_cache {
        cache.save(converted_dir)?;
    }

    let manifest_path = converted_dir.join(CATALOG_FILENAME);
    let json = serde_json::to_string_pretty(&catalog)?;
    std::fs::write(&manifest_path, json)?;

    Ok(ConvertOutcome {
        catalog,
        manifest_path,
        cache_stats: stats,
    })
}

/// Result of converting one asset, before it is applied to the catalog.
struct AssetOutcome {
    record: ConversionRecord,
    status: ConvertStatus,
    /// `(output path, source hash)` to record in the skip-cache.
    cache_entry: Option<(String, String)>,
}

fn convert_asset<C: HeicCodec + ?Sized>(
    asset: &Asset,
    source_root: &Path,
    converted_dir: &Path,
    converter: &Converter<'_, C>,
    cache: &CacheManifest,
    params_hash: &str,
) -> AssetOutcome {
    let source = source_root.join(&asset.path);
    let output_rel = converted_rel(&asset.path);
    let output_key = rel_str(&output_rel);
    let output_abs = converted_dir.join(&output_rel);

    // An unreadable source fails identically inside the converter below, so
    // a hash error just falls through to the transcode path.
    let source_hash = cache::hash_file(&source).ok();

    if let Some(hash) = &source_hash
        && let Some(stored) = cache.find_cached(hash, params_hash, converted_dir)
    {
        if stored == output_key {
            return AssetOutcome {
                record: ConversionRecord::Ready { output: output_rel },
                status: ConvertStatus::Cached,
                cache_entry: None,
            };
        }
        // Same content under an old path (folder renamed): copy it forward.
        if copy_cached(converted_dir, &stored, &output_abs).is_ok() {
            return AssetOutcome {
                record: ConversionRecord::Ready { output: output_rel },
                status: ConvertStatus::Copied,
                cache_entry: Some((output_key, hash.clone())),
            };
        }
    }

    match converter.convert(&source) {
        Conversion::Ready(jpeg) => match write_output(&output_abs, &jpeg) {
            Ok(()) => AssetOutcome {
                record: ConversionRecord::Ready { output: output_rel },
                status: ConvertStatus::Converted,
                cache_entry: source_hash.map(|hash| (output_key, hash)),
            },
            Err(e) => {
                let reason = format!("write failed: {e}");
                AssetOutcome {
                    record: ConversionRecord::Failed {
                        reason: reason.clone(),
                    },
                    status: ConvertStatus::Failed(reason),
                    cache_entry: None,
                }
            }
        },
        Conversion::Failed(reason) => AssetOutcome {
            record: ConversionRecord::Failed {
                reason: reason.clone(),
            },
            status: ConvertStatus::Failed(reason),
            cache_entry: None,
        },
    }
}

/// Converted output path for a heic asset: the source-relative path with
/// `.jpg` appended (`spring-gala/toast.heic` → `spring-gala/toast.heic.jpg`).
fn converted_rel(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".jpg");
    PathBuf::from(name)
}

/// Slash-joined form of a relative path, as stored in manifests and cache
/// keys.
fn rel_str(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn write_output(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)
}

fn copy_cached(converted_dir: &Path, stored: &str, output_abs: &Path) -> io::Result<()> {
    if let Some(parent) = output_abs.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(converted_dir.join(stored), output_abs).map(|_| ())
}
