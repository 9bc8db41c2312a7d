//! Records shared by every pipeline stage.
//!
//! A [`PhotoRecord`] is produced once per successfully thumbnailed photo and
//! never mutated afterwards. The [`Manifest`] accumulates them: append-only
//! while the collector owns it, then shuffled once before rendering.

use crate::imaging::is_panorama;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Collection label used when a photo is not reached through a symlink.
pub const DEFAULT_COLLECTION: &str = "(default)";

/// Format used for [`Manifest::generated_at`] in rendered output.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid photo dimensions {width}x{height}: both must be at least 1")]
pub struct InvalidDimensions {
    pub width: u32,
    pub height: u32,
}

/// Metadata for one photo with a thumbnail on disk.
///
/// Deserialization goes through the same dimension check as
/// [`PhotoRecord::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PhotoRecordFields")]
pub struct PhotoRecord {
    collection_name: String,
    filename: String,
    width: u32,
    height: u32,
    is_panorama: bool,
}

impl PhotoRecord {
    /// Build a record, classifying it against `panorama_ratio`.
    ///
    /// Zero-sized photos are rejected here so no caller ever divides by a zero
    /// height.
    pub fn new(
        collection_name: impl Into<String>,
        filename: impl Into<String>,
        width: u32,
        height: u32,
        panorama_ratio: u32,
    ) -> Result<Self, InvalidDimensions> {
        if width == 0 || height == 0 {
            return Err(InvalidDimensions { width, height });
        }
        Ok(Self {
            collection_name: collection_name.into(),
            filename: filename.into(),
            width,
            height,
            is_panorama: is_panorama(width, height, panorama_ratio),
        })
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_panorama(&self) -> bool {
        self.is_panorama
    }
}

/// Wire shape of a [`PhotoRecord`], validated on conversion.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PhotoRecordFields {
    collection_name: String,
    filename: String,
    width: u32,
    height: u32,
    is_panorama: bool,
}

impl TryFrom<PhotoRecordFields> for PhotoRecord {
    type Error = InvalidDimensions;

    fn try_from(f: PhotoRecordFields) -> Result<Self, Self::Error> {
        if f.width == 0 || f.height == 0 {
            return Err(InvalidDimensions {
                width: f.width,
                height: f.height,
            });
        }
        // The ratio used at build time is not serialized, so the stored flag
        // is kept as written.
        Ok(Self {
            collection_name: f.collection_name,
            filename: f.filename,
            width: f.width,
            height: f.height,
            is_panorama: f.is_panorama,
        })
    }
}

/// Gallery-level manifest handed to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub generated_at: NaiveDateTime,
    pub photos: Vec<PhotoRecord>,
}

impl Manifest {
    pub fn new(name: impl Into<String>, generated_at: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            generated_at,
            photos: Vec::new(),
        }
    }

    pub fn push(&mut self, record: PhotoRecord) {
        self.photos.push(record);
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Human-readable generation timestamp.
    pub fn generated_at_display(&self) -> String {
        self.generated_at.format(DATE_TIME_FORMAT).to_string()
    }
}
