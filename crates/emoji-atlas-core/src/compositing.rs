use crate::model::Rect;
use image::{RgbaImage, imageops};

/// Copy `src` into `canvas` with its top-left at (dx, dy).
///
/// Pixels are copied verbatim (no alpha blending), so a later crop of the
/// same rectangle reproduces `src` exactly. Pixels falling outside the
/// canvas are dropped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    for yy in 0..sh {
        if dy + yy >= ch {
            break;
        }
        for xx in 0..sw {
            if dx + xx >= cw {
                break;
            }
            canvas.put_pixel(dx + xx, dy + yy, *src.get_pixel(xx, yy));
        }
    }
}

/// Owned copy of `rect` within `src`, clamped to the image bounds.
pub fn crop_rgba(src: &RgbaImage, rect: Rect) -> RgbaImage {
    imageops::crop_imm(src, rect.x, rect.y, rect.w, rect.h).to_image()
}

/// Paste `src` centred on a transparent `side` x `side` canvas.
pub fn paste_centered(src: &RgbaImage, side: u32) -> RgbaImage {
    let mut canvas = RgbaImage::new(side, side);
    let dx = side.saturating_sub(src.width()) / 2;
    let dy = side.saturating_sub(src.height()) / 2;
    blit_rgba(src, &mut canvas, dx, dy);
    canvas
}
