//! Image processing: pure Rust, JPEG in and JPEG out.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG) |
//! | **Resize** | bilinear `resize_exact` |
//! | **Encode** | `image::codecs::jpeg::JpegEncoder` |
//!
//! The module is split into:
//! - **Calculations**: panorama classification and thumbnail geometry (unit testable)
//! - **Parameters**: quality and resize targets
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    MAX_THUMBNAIL_EDGE, PlanError, ThumbnailGeometry, ThumbnailPlan, is_panorama, plan_thumbnail,
    target_height,
};
pub use params::{Quality, ResizeParams};
pub use rust_backend::RustBackend;
