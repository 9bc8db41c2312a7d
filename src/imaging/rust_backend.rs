//! Pure Rust image backend built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG) | `image::ImageReader` with a fixed JPEG format |
//! | Resize | `DynamicImage::resize_exact` with the bilinear `Triangle` filter |
//! | Encode (JPEG) | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{BackendError, ImageBackend};
use super::params::{Quality, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Production backend. Stateless, so one instance serves every worker.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        // The reader owns the handle; it is closed when this function returns.
        let file = File::open(path).map_err(BackendError::Open)?;
        ImageReader::with_format(BufReader::new(file), ImageFormat::Jpeg)
            .decode()
            .map_err(|e| BackendError::Decode(format!("{}: {}", path.display(), e)))
    }

    fn resize(&self, image: &DynamicImage, params: &ResizeParams) -> DynamicImage {
        image.resize_exact(params.width, params.height, FilterType::Triangle)
    }

    fn encode(
        &self,
        image: &DynamicImage,
        out: &mut dyn Write,
        quality: Quality,
    ) -> Result<(), BackendError> {
        let rgb = image.to_rgb8();
        JpegEncoder::new_with_quality(out, quality.value())
            .write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| BackendError::Encode(e.to_string()))
    }
}
