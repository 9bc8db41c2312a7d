//! Shared test utilities: synthetic photo fixtures and a jittering backend.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_test_jpeg(&tmp.path().join("dawn.jpg"), 40, 30);
//! write_corrupt_jpeg(&tmp.path().join("broken.jpg"));
//! ```

use crate::imaging::{BackendError, ImageBackend, Quality, ResizeParams, RustBackend};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbImage};
use rand::Rng;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

// =========================================================================
// Fixture files
// =========================================================================

/// Write a small valid JPEG with the given dimensions.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a file with a `.jpg` name and a truncated, undecodable body.
pub fn write_corrupt_jpeg(path: &Path) {
    std::fs::write(path, b"\xFF\xD8\xFF\xE0not really a jpeg").unwrap();
}

/// Populate `dir` with `count` valid photos named `photo-NN.jpg`.
pub fn write_photos(dir: &Path, count: usize, width: u32, height: u32) {
    for i in 0..count {
        write_test_jpeg(&dir.join(format!("photo-{i:02}.jpg")), width, height);
    }
}

// =========================================================================
// Backends
// =========================================================================

/// Real backend that sleeps a random few milliseconds before each decode and
/// encode, shaking up worker completion order.
#[derive(Default)]
pub struct JitterBackend {
    inner: RustBackend,
}

impl JitterBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn jitter() {
        let millis = rand::thread_rng().gen_range(0..4);
        std::thread::sleep(Duration::from_millis(millis));
    }
}

impl ImageBackend for JitterBackend {
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        Self::jitter();
        self.inner.decode(path)
    }

    fn resize(&self, image: &DynamicImage, params: &ResizeParams) -> DynamicImage {
        self.inner.resize(image, params)
    }

    fn encode(
        &self,
        image: &DynamicImage,
        out: &mut dyn Write,
        quality: Quality,
    ) -> Result<(), BackendError> {
        Self::jitter();
        self.inner.encode(image, out, quality)
    }
}
