//! Pure calculation functions for thumbnail geometry.
//!
//! All arithmetic is truncating integer arithmetic. No I/O.

use crate::types::InvalidDimensions;
use thiserror::Error;

/// Largest thumbnail edge the JPEG encoder accepts.
pub const MAX_THUMBNAIL_EDGE: u32 = u16::MAX as u32;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    #[error(transparent)]
    InvalidDimensions(#[from] InvalidDimensions),
    #[error(
        "thumbnail would be {width}x{height}, above the {max}px limit",
        max = MAX_THUMBNAIL_EDGE
    )]
    TooLarge { width: u32, height: u32 },
}

/// Whether a `width` x `height` photo is a panorama.
///
/// Uses truncating division: a 49x10 photo has ratio 4, not 4.9.
/// `height` must be non-zero; callers validate first.
pub fn is_panorama(width: u32, height: u32, panorama_ratio: u32) -> bool {
    width / height >= panorama_ratio
}

/// Thumbnail height preserving the source aspect ratio.
///
/// `floor(target_width * height / width)`, clamped to at least one pixel so
/// the encoder always receives a real image.
pub fn target_height(target_width: u32, width: u32, height: u32) -> u32 {
    let scaled = u64::from(target_width) * u64::from(height) / u64::from(width);
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

/// Thumbnail widths and the panorama threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailGeometry {
    pub regular_width: u32,
    pub panorama_width: u32,
    pub panorama_ratio: u32,
}

impl Default for ThumbnailGeometry {
    fn default() -> Self {
        Self {
            regular_width: 500,
            panorama_width: 2000,
            panorama_ratio: 5,
        }
    }
}

/// Resolved thumbnail shape for one photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailPlan {
    pub is_panorama: bool,
    pub width: u32,
    pub height: u32,
}

/// Plan the thumbnail for a `(width, height)` source.
///
/// Tall, narrow sources can scale to a height no encoder accepts; those are
/// rejected here, before any pixels are allocated.
///
/// # Examples
/// ```
/// # use khgallery::imaging::{ThumbnailGeometry, plan_thumbnail};
/// let plan = plan_thumbnail((4000, 3000), &ThumbnailGeometry::default()).unwrap();
/// assert_eq!((plan.width, plan.height), (500, 375));
///
/// let pano = plan_thumbnail((10000, 1000), &ThumbnailGeometry::default()).unwrap();
/// assert!(pano.is_panorama);
/// assert_eq!((pano.width, pano.height), (2000, 200));
/// ```
pub fn plan_thumbnail(
    source: (u32, u32),
    geometry: &ThumbnailGeometry,
) -> Result<ThumbnailPlan, PlanError> {
    let (width, height) = source;
    if width == 0 || height == 0 {
        return Err(InvalidDimensions { width, height }.into());
    }

    let is_panorama = is_panorama(width, height, geometry.panorama_ratio);
    let target_width = if is_panorama {
        geometry.panorama_width
    } else {
        geometry.regular_width
    };

    let plan = ThumbnailPlan {
        is_panorama,
        width: target_width,
        height: target_height(target_width, width, height),
    };
    if plan.width > MAX_THUMBNAIL_EDGE || plan.height > MAX_THUMBNAIL_EDGE {
        return Err(PlanError::TooLarge {
            width: plan.width,
            height: plan.height,
        });
    }
    Ok(plan)
}
