//! Alpha-channel bounding boxes and the outlier-filtered category bound.

use crate::model::Rect;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Alpha above this value counts as opaque when measuring bounds.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 127;

/// Tight box around opaque pixels. `right`/`bottom` are exclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
            width: right.saturating_sub(left),
            height: bottom.saturating_sub(top),
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }
}

/// Bounding box of the pixels whose alpha exceeds `threshold`, or `None`
/// when the image has no such pixel.
pub fn image_bounds(rgba: &RgbaImage, threshold: u8) -> Option<BoundingBox> {
    let (w, h) = rgba.dimensions();
    let mut left = u32::MAX;
    let mut top = u32::MAX;
    let mut right = 0u32;
    let mut bottom = 0u32;
    let mut found = false;
    for (x, y, px) in rgba.enumerate_pixels() {
        if px[3] > threshold {
            found = true;
            left = left.min(x);
            top = top.min(y);
            right = right.max(x + 1);
            bottom = bottom.max(y + 1);
        }
    }
    if !found || w == 0 || h == 0 {
        return None;
    }
    Some(BoundingBox::new(left, top, right, bottom))
}

/// Per-image bounds, aligned 1:1 with `images`.
pub fn all_image_bounds<'a, I>(images: I, threshold: u8) -> Vec<Option<BoundingBox>>
where
    I: IntoIterator<Item = &'a RgbaImage>,
{
    images
        .into_iter()
        .map(|img| image_bounds(img, threshold))
        .collect()
}

/// Percentile with linear interpolation between the closest ranks.
/// Returns `None` for an empty slice.
pub fn percentile(values: &[u32], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    let a = sorted[lo] as f64;
    let b = sorted[hi] as f64;
    Some(a + (b - a) * frac)
}

/// Union of the per-image boxes whose width and height stay within the
/// `outlier_percentile`-th percentile. When the filter would drop every
/// box, all boxes are used. Transparent images (`None`) are ignored.
pub fn global_bounds(boxes: &[Option<BoundingBox>], outlier_percentile: f64) -> Option<BoundingBox> {
    let present: Vec<&BoundingBox> = boxes.iter().flatten().collect();
    if present.is_empty() {
        return None;
    }
    let widths: Vec<u32> = present.iter().map(|b| b.width).collect();
    let heights: Vec<u32> = present.iter().map(|b| b.height).collect();
    let w_thresh = percentile(&widths, outlier_percentile)?;
    let h_thresh = percentile(&heights, outlier_percentile)?;

    let mut kept: Vec<&BoundingBox> = present
        .iter()
        .copied()
        .filter(|b| b.width as f64 <= w_thresh && b.height as f64 <= h_thresh)
        .collect();
    if kept.is_empty() {
        kept = present;
    }

    let left = kept.iter().map(|b| b.left).min()?;
    let top = kept.iter().map(|b| b.top).min()?;
    let right = kept.iter().map(|b| b.right).max()?;
    let bottom = kept.iter().map(|b| b.bottom).max()?;
    Some(BoundingBox::new(left, top, right, bottom))
}
