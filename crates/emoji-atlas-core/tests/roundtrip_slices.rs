use emoji_atlas_core::key::GlyphKey;
use emoji_atlas_core::normalize::{center_crop, scale_to_reference};
use emoji_atlas_core::bounds::BoundingBox;
use emoji_atlas_core::packer::grid::GridPacker;
use emoji_atlas_core::packer::shelf::ShelfPacker;
use emoji_atlas_core::packer::{PackItem, SheetPacker};
use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn noise(rng: &mut StdRng, w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |_, _| Rgba([rng.r#gen(), rng.r#gen(), rng.r#gen(), rng.r#gen()]))
}

#[test]
fn shelf_slices_reproduce_inputs() {
    let mut rng = StdRng::seed_from_u64(42);
    let items: Vec<PackItem> = (0..25)
        .map(|i| {
            let (w, h) = (rng.gen_range(1..=20), rng.gen_range(1..=20));
            PackItem::new(
                GlyphKey::from_codepoints(&[0x1F300 + i]).unwrap(),
                noise(&mut rng, w, h),
            )
        })
        .collect();
    let sheet = ShelfPacker::new(1, 1, 4096).pack(&items).unwrap();
    for it in &items {
        let slice = sheet.slice(&it.key).unwrap();
        assert_eq!(slice, it.image, "{}", it.key.escaped());
    }
}

#[test]
fn grid_slices_reproduce_inputs() {
    let mut rng = StdRng::seed_from_u64(9);
    let items: Vec<PackItem> = (0..11)
        .map(|i| {
            PackItem::new(
                GlyphKey::from_codepoints(&[0x2600 + i]).unwrap(),
                noise(&mut rng, 12, 12),
            )
        })
        .collect();
    let sheet = GridPacker::new(12, 1).pack(&items).unwrap();
    for it in &items {
        assert_eq!(sheet.slice(&it.key).unwrap(), it.image);
    }
}

#[test]
fn center_crop_shares_one_canvas() {
    let mut rng = StdRng::seed_from_u64(3);
    let images: Vec<RgbaImage> = (0..4).map(|_| noise(&mut rng, 40, 30)).collect();
    let out = center_crop(&images, &BoundingBox::new(5, 2, 35, 22));
    for img in &out {
        assert_eq!(img.dimensions(), (30, 30));
    }
    // 30x20 crop centred vertically: rows 0..5 stay transparent.
    assert_eq!(out[0].get_pixel(0, 0)[3], 0);
    assert_eq!(out[0].get_pixel(0, 5), images[0].get_pixel(5, 2));
}

#[test]
fn scale_keeps_relative_size() {
    let img = RgbaImage::new(36, 18);
    assert_eq!(scale_to_reference(&img, 24, 72).dimensions(), (12, 6));
}
