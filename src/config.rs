//! Gallery configuration.
//!
//! Loads and validates `gallery.toml` from the source root. There is exactly
//! one config file per gallery; every field has a stock default, so the file
//! is optional and may be partial:
//!
//! ```toml
//! title = "School Events"
//!
//! [conversion]
//! jpeg_quality = 85      # Quality for transcoded HEIC assets (1-100)
//!
//! [display]
//! show_captions = true   # Sidecar captions under thumbnails and slides
//!
//! [processing]
//! max_processes = 4      # Max parallel conversions (omit for CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file name, expected at the source root.
pub const CONFIG_FILE: &str = "gallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `gallery.toml`.
///
/// All fields have defaults; user files only specify overrides. Unknown keys
/// are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Gallery title shown on the index page.
    pub title: String,
    /// HEIC transcoding settings.
    pub conversion: ConversionConfig,
    /// Presentation settings.
    pub display: DisplayConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            title: "Gallery".to_string(),
            conversion: ConversionConfig::default(),
            display: DisplayConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.conversion.jpeg_quality == 0 || self.conversion.jpeg_quality > 100 {
            return Err(ConfigError::Validation(
                "conversion.jpeg_quality must be 1-100".into(),
            ));
        }
        Ok(())
    }
}

/// HEIC transcoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionConfig {
    /// JPEG quality for transcoded HEIC assets (1 = worst, 100 = best).
    /// One fixed setting for the whole gallery.
    pub jpeg_quality: u32,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self { jpeg_quality: 85 }
    }
}

/// Presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Show sidecar captions under thumbnails and on slide pages.
    pub show_captions: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_captions: true,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel conversion workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Load config from `gallery.toml` in the source root.
///
/// A missing file means stock defaults. Partial files keep defaults for
/// everything they leave out; unknown keys and out-of-range values are
/// errors.
pub fn load_config(root: &Path) -> Result<GalleryConfig, ConfigError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(GalleryConfig::default());
    }
    let content = fs::read_to_string(&path)?;
    let config: GalleryConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `gallery.toml` with all keys documented.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r#"# Gallery Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at the source root, next to your event folders:
#   content/gallery.toml
#
# Unknown keys will cause an error.

# Gallery title shown on the index page.
title = "Gallery"

# ---------------------------------------------------------------------------
# HEIC transcoding
# ---------------------------------------------------------------------------
[conversion]
# JPEG quality for transcoded HEIC assets (1 = worst, 100 = best).
# One fixed setting for the whole gallery.
jpeg_quality = 85

# ---------------------------------------------------------------------------
# Presentation
# ---------------------------------------------------------------------------
[display]
# Show sidecar captions under thumbnails and on slide pages.
show_captions = true

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel conversion workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = GalleryConfig::default();
        assert_eq!(config.title, "Gallery");
        assert_eq!(config.conversion.jpeg_quality, 85);
        assert!(config.display.show_captions);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn parse_partial_config_keeps_defaults() {
        let toml = r#"
title = "School Events"
"#;
        let config: GalleryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.title, "School Events");
        assert_eq!(config.conversion.jpeg_quality, 85);
        assert!(config.display.show_captions);
    }

    #[test]
    fn parse_nested_sections() {
        let toml = r#"
[conversion]
jpeg_quality = 70

[display]
show_captions = false
"#;
        let config: GalleryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.conversion.jpeg_quality, 70);
        assert!(!config.display.show_captions);
        // Unspecified defaults preserved
        assert_eq!(config.title, "Gallery");
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.title, "Gallery");
        assert_eq!(config.conversion.jpeg_quality, 85);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("gallery.toml"),
            r#"
title = "Reunion Photos"

[conversion]
jpeg_quality = 92
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.title, "Reunion Photos");
        assert_eq!(config.conversion.jpeg_quality, 92);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("gallery.toml"), "not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("gallery.toml"),
            r#"
[conversion]
jpeg_quality = 200
"#,
        )
        .unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[conversion]
jpg_quality = 85
"#;
        let result: Result<GalleryConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let toml_str = r#"
[converzion]
jpeg_quality = 85
"#;
        let result: Result<GalleryConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_quality_boundaries() {
        let mut config = GalleryConfig::default();
        config.conversion.jpeg_quality = 1;
        assert!(config.validate().is_ok());
        config.conversion.jpeg_quality = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_quality_out_of_range() {
        let mut config = GalleryConfig::default();
        config.conversion.jpeg_quality = 0;
        assert!(config.validate().is_err());
        config.conversion.jpeg_quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jpeg_quality"));
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(GalleryConfig::default().validate().is_ok());
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig {
            max_processes: None,
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_is_valid_toml() {
        let content = stock_config_toml();
        let _: toml::Value = toml::from_str(content).expect("stock config must be valid TOML");
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let content = stock_config_toml();
        let config: GalleryConfig = toml::from_str(content).unwrap();
        assert_eq!(config.title, "Gallery");
        assert_eq!(config.conversion.jpeg_quality, 85);
        assert!(config.display.show_captions);
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[conversion]"));
        assert!(content.contains("[display]"));
        assert!(content.contains("[processing]"));
    }

    #[test]
    fn catalog_default_round_trip() {
        // Catalog uses #[serde(default)] for config; a config-less manifest
        // must deserialize to stock defaults
        let config: GalleryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.conversion.jpeg_quality, 85);
    }
}
