//! Per-photo thumbnail generation.
//!
//! Stage 2 of the pipeline. One call handles one source file end to end and
//! either yields a [`PhotoRecord`] or a [`ProcessError`]; it never touches
//! shared state, so workers can run it concurrently without coordination.
//!
//! ## Steps
//!
//! ```text
//! dawn.jpg ──decode──► 4000x3000 ──plan──► 500x375 ──resize/encode──► thumbnails/dawn.jpg
//!                                                         │
//!                                             .thumb-XXXX.partial ──persist──┘
//! ```
//!
//! ## Output atomicity
//!
//! The thumbnail is encoded into a temp file in the thumbnails directory and
//! renamed over the destination only after the encoder and the flush both
//! succeed. On any earlier failure the temp file is dropped (and deleted),
//! so a reader never sees a truncated thumbnail under the final name.

use crate::config::GalleryConfig;
use crate::imaging::{
    BackendError, Dimensions, ImageBackend, PlanError, Quality, ResizeParams, ThumbnailGeometry,
    ThumbnailPlan, plan_thumbnail,
};
use crate::metadata::resolve_collection;
use crate::scan::is_photo;
use crate::types::{InvalidDimensions, PhotoRecord};
use image::DynamicImage;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),
    #[error("cannot open source: {0}")]
    Open(#[source] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error(transparent)]
    InvalidDimensions(#[from] InvalidDimensions),
    #[error("cannot write thumbnail {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("thumbnail too large: {width}x{height}")]
    ThumbnailTooLarge { width: u32, height: u32 },
    #[error("worker panicked: {0}")]
    Panicked(String),
}

impl From<PlanError> for ProcessError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::InvalidDimensions(dims) => ProcessError::InvalidDimensions(dims),
            PlanError::TooLarge { width, height } => {
                ProcessError::ThumbnailTooLarge { width, height }
            }
        }
    }
}

impl From<BackendError> for ProcessError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Open(source) => ProcessError::Open(source),
            BackendError::Decode(msg) => ProcessError::Decode(msg),
            BackendError::Encode(msg) => ProcessError::Encode(msg),
        }
    }
}

/// Everything a worker needs to know about where and how to write thumbnails.
#[derive(Debug, Clone)]
pub struct ThumbnailSettings {
    pub thumbnails_dir: PathBuf,
    pub geometry: ThumbnailGeometry,
    pub quality: Quality,
}

impl ThumbnailSettings {
    pub fn from_config(config: &GalleryConfig) -> Self {
        let t = &config.thumbnails;
        Self {
            thumbnails_dir: config.thumbnails_path(),
            geometry: ThumbnailGeometry {
                regular_width: t.regular_width,
                panorama_width: t.panorama_width,
                panorama_ratio: t.panorama_ratio,
            },
            quality: Quality::new(t.quality),
        }
    }
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self::from_config(&GalleryConfig::default())
    }
}

/// Generate the thumbnail for `source` and describe it.
///
/// The thumbnail lands in `settings.thumbnails_dir` under the source's file
/// name. The directory must already exist.
pub fn process_photo(
    backend: &impl ImageBackend,
    source: &Path,
    settings: &ThumbnailSettings,
) -> Result<PhotoRecord, ProcessError> {
    let filename = file_name_of(source);
    if !is_photo(source) {
        return Err(ProcessError::UnsupportedFormat(filename));
    }

    let image = backend.decode(source)?;
    let Dimensions { width, height } = Dimensions::of(&image);
    let plan = plan_thumbnail((width, height), &settings.geometry)?;

    let dest = settings.thumbnails_dir.join(&filename);
    write_thumbnail(backend, &image, &plan, &dest, settings.quality)?;

    let collection = resolve_collection(source);
    let record = PhotoRecord::new(
        collection,
        filename,
        width,
        height,
        settings.geometry.panorama_ratio,
    )?;
    Ok(record)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn write_thumbnail(
    backend: &impl ImageBackend,
    image: &DynamicImage,
    plan: &ThumbnailPlan,
    dest: &Path,
    quality: Quality,
) -> Result<(), ProcessError> {
    let write_err = |source| ProcessError::Write {
        path: dest.to_path_buf(),
        source,
    };
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));

    let staged = tempfile::Builder::new()
        .prefix(".thumb-")
        .suffix(".partial")
        .tempfile_in(dir)
        .map_err(write_err)?;

    let resized = backend.resize(
        image,
        &ResizeParams {
            width: plan.width,
            height: plan.height,
        },
    );

    let mut writer = BufWriter::new(staged);
    backend.encode(&resized, &mut writer, quality)?;
    writer.flush().map_err(write_err)?;
    let staged = writer
        .into_inner()
        .map_err(|e| write_err(e.into_error()))?;

    staged.persist(dest).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::types::DEFAULT_COLLECTION;
    use std::fs;
    use tempfile::TempDir;

    fn settings_in(dir: &Path) -> ThumbnailSettings {
        ThumbnailSettings {
            thumbnails_dir: dir.to_path_buf(),
            ..ThumbnailSettings::default()
        }
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    // =========================================================================
    // ThumbnailSettings tests
    // =========================================================================

    #[test]
    fn settings_default_values() {
        let settings = ThumbnailSettings::default();
        assert_eq!(settings.thumbnails_dir, PathBuf::from("gallery/thumbnails"));
        assert_eq!(settings.geometry, ThumbnailGeometry::default());
        assert_eq!(settings.quality.value(), 75);
    }

    #[test]
    fn settings_follow_config() {
        let mut config = GalleryConfig::default();
        config.source_dir = PathBuf::from("/photos");
        config.thumbnails_dir = "small".to_string();
        config.thumbnails.regular_width = 300;
        config.thumbnails.quality = 90;

        let settings = ThumbnailSettings::from_config(&config);
        assert_eq!(settings.thumbnails_dir, PathBuf::from("/photos/small"));
        assert_eq!(settings.geometry.regular_width, 300);
        assert_eq!(settings.quality.value(), 90);
    }

    // =========================================================================
    // process_photo() tests (mock backend)
    // =========================================================================

    #[test]
    fn regular_photo_writes_thumbnail_and_record() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("dawn.jpg");
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 4000,
            height: 3000,
        }]);

        let record = process_photo(&backend, &source, &settings_in(tmp.path())).unwrap();

        assert_eq!(record.filename(), "dawn.jpg");
        assert_eq!(record.collection_name(), DEFAULT_COLLECTION);
        assert_eq!((record.width(), record.height()), (4000, 3000));
        assert!(!record.is_panorama());
        assert_eq!(fs::read(tmp.path().join("dawn.jpg")).unwrap(), b"mock-jpeg");

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 3);
        assert!(matches!(&ops[0], RecordedOp::Decode(p) if p.ends_with("dawn.jpg")));
        assert_eq!(
            ops[1],
            RecordedOp::Resize {
                width: 500,
                height: 375
            }
        );
        assert_eq!(
            ops[2],
            RecordedOp::Encode {
                width: 500,
                height: 375,
                quality: 75
            }
        );
    }

    #[test]
    fn panorama_uses_wide_thumbnail() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 500,
            height: 100,
        }]);

        let record =
            process_photo(&backend, &tmp.path().join("pano.jpg"), &settings_in(tmp.path()))
                .unwrap();

        assert!(record.is_panorama());
        assert!(backend.get_operations().contains(&RecordedOp::Resize {
            width: 2000,
            height: 400
        }));
    }

    #[test]
    fn unsupported_extension_is_rejected_before_decode() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();

        let err = process_photo(&backend, &tmp.path().join("notes.txt"), &settings_in(tmp.path()))
            .unwrap_err();

        assert!(matches!(err, ProcessError::UnsupportedFormat(ref f) if f == "notes.txt"));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn decode_failure_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();

        let err = process_photo(&backend, &tmp.path().join("bad.jpg"), &settings_in(tmp.path()))
            .unwrap_err();

        assert!(matches!(err, ProcessError::Decode(_)));
        assert!(dir_entries(tmp.path()).is_empty());
    }

    #[test]
    fn encode_failure_leaves_no_partial_file() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::failing_encode(vec![Dimensions {
            width: 800,
            height: 600,
        }]);

        let err = process_photo(&backend, &tmp.path().join("dawn.jpg"), &settings_in(tmp.path()))
            .unwrap_err();

        assert!(matches!(err, ProcessError::Encode(_)));
        assert!(dir_entries(tmp.path()).is_empty());
    }

    #[test]
    fn zero_height_is_invalid_dimensions() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 100,
            height: 0,
        }]);

        let err = process_photo(&backend, &tmp.path().join("flat.jpg"), &settings_in(tmp.path()))
            .unwrap_err();

        assert!(matches!(err, ProcessError::InvalidDimensions(_)));
        assert!(dir_entries(tmp.path()).is_empty());
    }

    #[test]
    fn tall_narrow_photo_fails_before_resize() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 100,
            height: 20_000,
        }]);

        let err = process_photo(&backend, &tmp.path().join("tall.jpg"), &settings_in(tmp.path()))
            .unwrap_err();

        assert!(matches!(
            err,
            ProcessError::ThumbnailTooLarge {
                width: 500,
                height: 100_000
            }
        ));
        assert!(
            !backend
                .get_operations()
                .iter()
                .any(|op| matches!(op, RecordedOp::Resize { .. }))
        );
        assert!(dir_entries(tmp.path()).is_empty());
    }

    #[test]
    fn missing_thumbnails_dir_is_write_error() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 800,
            height: 600,
        }]);
        let settings = settings_in(&tmp.path().join("missing"));

        let err = process_photo(&backend, &tmp.path().join("dawn.jpg"), &settings).unwrap_err();

        assert!(matches!(err, ProcessError::Write { .. }));
    }

    #[test]
    fn existing_thumbnail_is_replaced() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("dawn.jpg"), b"old").unwrap();
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 800,
            height: 600,
        }]);

        process_photo(&backend, &tmp.path().join("dawn.jpg"), &settings_in(tmp.path())).unwrap();

        assert_eq!(fs::read(tmp.path().join("dawn.jpg")).unwrap(), b"mock-jpeg");
        assert_eq!(dir_entries(tmp.path()), vec!["dawn.jpg"]);
    }

    #[test]
    fn backend_errors_map_to_process_errors() {
        let open = ProcessError::from(BackendError::Open(std::io::Error::from(
            std::io::ErrorKind::NotFound,
        )));
        assert!(matches!(open, ProcessError::Open(_)));
        assert!(matches!(
            ProcessError::from(BackendError::Encode("x".into())),
            ProcessError::Encode(_)
        ));
    }

    // =========================================================================
    // process_photo() tests (real backend)
    // =========================================================================

    #[test]
    fn real_jpeg_round_trip() {
        use crate::imaging::RustBackend;
        use crate::test_helpers::write_test_jpeg;

        let tmp = TempDir::new().unwrap();
        let source_dir = tmp.path().join("src");
        let thumbs = tmp.path().join("thumbs");
        fs::create_dir_all(&source_dir).unwrap();
        fs::create_dir_all(&thumbs).unwrap();
        write_test_jpeg(&source_dir.join("wide.jpg"), 60, 10);

        let settings = ThumbnailSettings {
            thumbnails_dir: thumbs.clone(),
            geometry: ThumbnailGeometry {
                regular_width: 20,
                panorama_width: 30,
                panorama_ratio: 5,
            },
            quality: Quality::default(),
        };
        let record = process_photo(&RustBackend::new(), &source_dir.join("wide.jpg"), &settings)
            .unwrap();

        assert!(record.is_panorama());
        let thumb = image::open(thumbs.join("wide.jpg")).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (30, 5));
    }
}
