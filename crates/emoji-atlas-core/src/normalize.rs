//! Cropping and resampling policies applied before packing.
//!
//! - Center-crop: every image is cut to one shared bound and centred on a
//!   square canvas, so a whole category shares one canvas size (grid sheets).
//! - Tight-crop: every image is cut to its own bound, keeping its aspect
//!   ratio (bin-packed sheets).

use crate::bounds::BoundingBox;
use crate::compositing::{crop_rgba, paste_centered};
use image::RgbaImage;
use image::imageops::{self, FilterType};

/// Crop each image to `bound`, then centre it on a square canvas whose side
/// is the larger bound dimension.
pub fn center_crop<'a, I>(images: I, bound: &BoundingBox) -> Vec<RgbaImage>
where
    I: IntoIterator<Item = &'a RgbaImage>,
{
    let side = bound.width.max(bound.height);
    images
        .into_iter()
        .map(|img| paste_centered(&crop_rgba(img, bound.to_rect()), side))
        .collect()
}

/// Crop each image to its own box. A `None` box (fully transparent image)
/// keeps the whole canvas.
pub fn tight_crop<'a, I>(images: I, boxes: &[Option<BoundingBox>]) -> Vec<RgbaImage>
where
    I: IntoIterator<Item = &'a RgbaImage>,
{
    images
        .into_iter()
        .zip(boxes)
        .map(|(img, bbox)| match bbox {
            Some(b) => crop_rgba(img, b.to_rect()),
            None => img.clone(),
        })
        .collect()
}

/// Resample to exactly `size` x `size`.
pub fn resize_square(image: &RgbaImage, size: u32) -> RgbaImage {
    if image.dimensions() == (size, size) {
        return image.clone();
    }
    imageops::resize(image, size, size, FilterType::Lanczos3)
}

/// Dimensions after scaling by `size / reference`, rounded up.
///
/// Integer arithmetic keeps the rounding exact; `72 * (24 / 72)` is 24, not 25.
pub fn scaled_dimensions(width: u32, height: u32, size: u32, reference: u32) -> (u32, u32) {
    let reference = reference.max(1) as u64;
    let scale = |v: u32| -> u32 {
        let num = v as u64 * size as u64;
        (num.div_ceil(reference) as u32).max(1)
    };
    (scale(width), scale(height))
}

/// Uniform resample by `size / reference` on both axes.
pub fn scale_to_reference(image: &RgbaImage, size: u32, reference: u32) -> RgbaImage {
    let (w, h) = scaled_dimensions(image.width(), image.height(), size, reference);
    if (w, h) == image.dimensions() {
        return image.clone();
    }
    imageops::resize(image, w, h, FilterType::Lanczos3)
}
