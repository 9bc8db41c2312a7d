//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between thumbnail orchestration and
//! pixel work: decode a source file, resize it, encode the result. The
//! production implementation is [`RustBackend`](super::rust_backend::RustBackend).
//! Tests substitute a recording mock.

use super::params::{Quality, ResizeParams};
use image::DynamicImage;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open source: {0}")]
    Open(#[source] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(image: &DynamicImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }
}

/// Decode / resize / encode capability used by every worker.
///
/// Backends are shared by reference across worker threads, hence `Sync`.
pub trait ImageBackend: Sync {
    /// Open and decode the file at `path`.
    ///
    /// The source handle must not outlive this call.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Resize the full source bounds into exactly `params.width` x `params.height`.
    fn resize(&self, image: &DynamicImage, params: &ResizeParams) -> DynamicImage;

    /// Encode `image` as JPEG into `out`.
    fn encode(
        &self,
        image: &DynamicImage,
        out: &mut dyn Write,
        quality: Quality,
    ) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that fabricates blank images and records every call.
    /// Uses Mutex (not RefCell) so it is Sync and can be shared with workers.
    #[derive(Default)]
    pub struct MockBackend {
        pub decode_results: Mutex<Vec<Dimensions>>,
        pub fail_encode: bool,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(String),
        Resize { width: u32, height: u32 },
        Encode { width: u32, height: u32, quality: u8 },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(dims: Vec<Dimensions>) -> Self {
            Self {
                decode_results: Mutex::new(dims),
                ..Self::default()
            }
        }

        pub fn failing_encode(dims: Vec<Dimensions>) -> Self {
            Self {
                fail_encode: true,
                ..Self::with_dimensions(dims)
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(path.to_string_lossy().to_string()));

            self.decode_results
                .lock()
                .unwrap()
                .pop()
                .map(|d| DynamicImage::new_rgb8(d.width, d.height))
                .ok_or_else(|| BackendError::Decode("No mock dimensions".to_string()))
        }

        fn resize(&self, _image: &DynamicImage, params: &ResizeParams) -> DynamicImage {
            self.operations.lock().unwrap().push(RecordedOp::Resize {
                width: params.width,
                height: params.height,
            });
            DynamicImage::new_rgb8(params.width, params.height)
        }

        fn encode(
            &self,
            image: &DynamicImage,
            out: &mut dyn Write,
            quality: Quality,
        ) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                width: image.width(),
                height: image.height(),
                quality: quality.value(),
            });
            if self.fail_encode {
                // Leave some bytes behind to prove partial output is discarded.
                let _ = out.write_all(b"partial");
                return Err(BackendError::Encode("mock encode failure".to_string()));
            }
            out.write_all(b"mock-jpeg")
                .map_err(|e| BackendError::Encode(e.to_string()))
        }
    }

    #[test]
    fn mock_records_decode() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 800,
            height: 600,
        }]);

        let image = backend.decode(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(Dimensions::of(&image), Dimensions { width: 800, height: 600 });

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Decode(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_decode_without_dimensions_fails() {
        let backend = MockBackend::new();
        assert!(matches!(
            backend.decode(Path::new("/x.jpg")),
            Err(BackendError::Decode(_))
        ));
    }

    #[test]
    fn mock_records_resize_and_encode() {
        let backend = MockBackend::new();
        let source = DynamicImage::new_rgb8(10, 10);
        let resized = backend.resize(
            &source,
            &ResizeParams {
                width: 5,
                height: 4,
            },
        );
        let mut sink = Vec::new();
        backend
            .encode(&resized, &mut sink, Quality::new(80))
            .unwrap();

        assert_eq!(
            backend.get_operations(),
            vec![
                RecordedOp::Resize {
                    width: 5,
                    height: 4
                },
                RecordedOp::Encode {
                    width: 5,
                    height: 4,
                    quality: 80
                },
            ]
        );
        assert_eq!(sink, b"mock-jpeg");
    }
}
