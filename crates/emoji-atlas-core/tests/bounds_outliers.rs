use emoji_atlas_core::bounds::{BoundingBox, all_image_bounds, global_bounds, image_bounds};
use image::{Rgba, RgbaImage};

fn square_at(side: u32, from: u32, to: u32) -> RgbaImage {
    let mut img = RgbaImage::new(side, side);
    for y in from..to {
        for x in from..to {
            img.put_pixel(x, y, Rgba([200, 100, 50, 255]));
        }
    }
    img
}

#[test]
fn alpha_threshold_is_exclusive() {
    let mut img = RgbaImage::new(8, 8);
    img.put_pixel(2, 3, Rgba([0, 0, 0, 127]));
    assert_eq!(image_bounds(&img, 127), None);
    img.put_pixel(5, 6, Rgba([0, 0, 0, 128]));
    assert_eq!(image_bounds(&img, 127), Some(BoundingBox::new(5, 6, 6, 7)));
}

#[test]
fn outlier_is_left_out_of_category_bound() {
    let mut images: Vec<RgbaImage> = (0..19).map(|_| square_at(72, 10, 60)).collect();
    images.push(square_at(72, 0, 72));
    let boxes = all_image_bounds(&images, 127);
    assert_eq!(boxes.len(), 20);
    let bound = global_bounds(&boxes, 95.0).unwrap();
    assert_eq!(bound, BoundingBox::new(10, 10, 60, 60));
    // At the 100th percentile nothing is an outlier.
    let all = global_bounds(&boxes, 100.0).unwrap();
    assert_eq!(all, BoundingBox::new(0, 0, 72, 72));
}

#[test]
fn transparent_images_are_ignored() {
    let images = vec![RgbaImage::new(16, 16), square_at(16, 4, 8), RgbaImage::new(16, 16)];
    let boxes = all_image_bounds(&images, 127);
    assert_eq!(boxes[0], None);
    assert_eq!(global_bounds(&boxes, 95.0), Some(BoundingBox::new(4, 4, 8, 8)));
}

#[test]
fn no_bound_without_opaque_pixels() {
    assert_eq!(global_bounds(&[], 95.0), None);
    assert_eq!(global_bounds(&[None, None], 95.0), None);
}
