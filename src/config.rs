//! Gallery configuration.
//!
//! Every path, threshold, and dimension the pipeline uses lives in
//! [`GalleryConfig`]. Values are resolved in three layers, each overriding the
//! one below it:
//!
//! ```text
//! stock defaults  →  khgallery.toml (or --config <file>)  →  CLI flags
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! source_dir = "gallery"        # Flat directory of .jpg files
//! thumbnails_dir = "thumbnails" # Relative to source_dir
//! output_path = "gallery.md"    # Rendered gallery document
//! format = "markdown"           # "markdown" or "json"
//!
//! [thumbnails]
//! regular_width = 500           # Thumbnail width for regular photos
//! panorama_width = 2000         # Thumbnail width for panoramas
//! panorama_ratio = 5            # width / height >= ratio → panorama
//! quality = 75                  # JPEG quality (1-100)
//!
//! [gallery]
//! name = "Gallery"
//! deploy_href = "/images/gallery/"
//!
//! [processing]
//! max_workers = 4               # Omit for auto = CPU cores
//! seed = 42                     # Omit for a fresh random order each run
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "khgallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Output document flavor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown page with front matter and an HTML photo grid.
    #[default]
    Markdown,
    /// The finalized manifest as JSON.
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Flat directory containing the source photographs.
    pub source_dir: PathBuf,
    /// Thumbnail directory, relative to `source_dir`.
    pub thumbnails_dir: String,
    /// Where the rendered document is written.
    pub output_path: PathBuf,
    pub format: OutputFormat,
    pub thumbnails: ThumbnailsConfig,
    pub gallery: GallerySection,
    pub processing: ProcessingConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("gallery"),
            thumbnails_dir: "thumbnails".to_string(),
            output_path: PathBuf::from("gallery.md"),
            format: OutputFormat::default(),
            thumbnails: ThumbnailsConfig::default(),
            gallery: GallerySection::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Absolute-or-relative path of the thumbnails directory.
    pub fn thumbnails_path(&self) -> PathBuf {
        self.source_dir.join(&self.thumbnails_dir)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thumbnails;
        if t.regular_width == 0 || t.panorama_width == 0 {
            return Err(ConfigError::Validation(
                "thumbnails widths must be non-zero".into(),
            ));
        }
        if t.panorama_ratio == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.panorama_ratio must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&t.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        if self.processing.max_workers == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_workers must be at least 1".into(),
            ));
        }
        if self.thumbnails_dir.trim().is_empty() || Path::new(&self.thumbnails_dir).is_absolute()
        {
            return Err(ConfigError::Validation(
                "thumbnails_dir must be a non-empty relative path".into(),
            ));
        }
        let components: Vec<Component<'_>> =
            Path::new(&self.thumbnails_dir).components().collect();
        if components.iter().all(|c| matches!(c, Component::CurDir)) {
            return Err(ConfigError::Validation(
                "thumbnails_dir must not be the source directory itself".into(),
            ));
        }
        if components.contains(&Component::ParentDir) {
            return Err(ConfigError::Validation(
                "thumbnails_dir must stay inside source_dir (no '..')".into(),
            ));
        }
        Ok(())
    }
}

/// Thumbnail geometry and encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    pub regular_width: u32,
    pub panorama_width: u32,
    /// Truncating `width / height` at or above this marks a panorama.
    pub panorama_ratio: u32,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u8,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            regular_width: 500,
            panorama_width: 2000,
            panorama_ratio: 5,
            quality: 75,
        }
    }
}

/// Presentation settings handed to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GallerySection {
    pub name: String,
    /// URL prefix under which the source directory is deployed.
    pub deploy_href: String,
}

impl Default for GallerySection {
    fn default() -> Self {
        Self {
            name: "Gallery".to_string(),
            deploy_href: "/images/gallery/".to_string(),
        }
    }
}

/// Worker pool and ordering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of concurrent thumbnail workers.
    /// When absent, defaults to the number of CPU cores.
    pub max_workers: Option<usize>,
    /// Fixed shuffle seed. When absent the gallery order is freshly random.
    pub seed: Option<u64>,
}

/// Resolve the effective worker count.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_workers(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_workers
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Layered loading
// =============================================================================

/// Stock defaults as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(GalleryConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Merge every layer onto the stock defaults, then deserialize and validate.
pub fn resolve_config(layers: Vec<toml::Value>) -> Result<GalleryConfig, ConfigError> {
    let merged = layers
        .into_iter()
        .fold(stock_defaults_value()?, merge_toml);
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the configuration used by the CLI.
///
/// An explicit `config_file` must exist. Without one, [`DEFAULT_CONFIG_FILE`]
/// in the working directory is used when present. CLI flags are applied by the
/// caller on the returned struct, followed by another [`GalleryConfig::validate`].
pub fn load_config(config_file: Option<&Path>) -> Result<GalleryConfig, ConfigError> {
    let mut layers = Vec::new();
    match config_file {
        Some(path) => layers.push(load_raw_config(path)?),
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.exists() {
                layers.push(load_raw_config(fallback)?);
            }
        }
    }
    resolve_config(layers)
}

/// Fully-commented stock config, printed by `khgallery gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# khgallery Configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# CLI flags override anything set here. Unknown keys are an error.

# Flat directory of .jpg photographs (not scanned recursively).
source_dir = "gallery"

# Thumbnail directory, relative to source_dir. Created if missing.
thumbnails_dir = "thumbnails"

# Rendered gallery document.
output_path = "gallery.md"

# "markdown" renders a page with front matter and a photo grid,
# "json" dumps the finalized manifest.
format = "markdown"

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Width of regular thumbnails; height follows the source aspect ratio.
regular_width = 500

# Width of panorama thumbnails.
panorama_width = 2000

# A photo is a panorama when width / height (integer division) >= this.
panorama_ratio = 5

# JPEG encoding quality (1 = worst, 100 = best).
quality = 75

# ---------------------------------------------------------------------------
# Gallery page
# ---------------------------------------------------------------------------
[gallery]
name = "Gallery"

# URL prefix the source directory is served under.
deploy_href = "/images/gallery/"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum concurrent thumbnail workers.
# Omit to auto-detect (= number of CPU cores).
# max_workers = 4

# Fixed shuffle seed for a reproducible gallery order.
# seed = 42
"##
}
