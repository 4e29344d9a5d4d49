use emoji_atlas_core::prelude::*;
use image::RgbaImage;

fn item(cp: u32, w: u32, h: u32) -> PackItem {
    let key = GlyphKey::from_codepoints(&[cp]).expect("key");
    PackItem::new(key, RgbaImage::new(w, h))
}

#[test]
fn test_shelf_stats_basic() {
    let items: Vec<PackItem> = (0..4).map(|i| item(0x1F600 + i, 16, 16)).collect();
    let sheet = ShelfPacker::new(1, 1, 4096).pack(&items).expect("pack");
    let stats = sheet.stats();

    assert_eq!(stats.num_frames, 4);
    // Padding is not counted as used area.
    assert_eq!(stats.used_area, 4 * 16 * 16);
    assert_eq!(stats.width, sheet.rgba.width());
    assert_eq!(stats.height, sheet.rgba.height());
    assert!(stats.occupancy > 0.25, "Occupancy: {}", stats.occupancy);
    assert!(stats.occupancy <= 1.0);
}

#[test]
fn test_grid_stats_fill_cells() {
    let items: Vec<PackItem> = (0..4).map(|i| item(0x2600 + i, 12, 12)).collect();
    let sheet = GridPacker::new(12, 0).pack(&items).expect("pack");
    let stats = sheet.stats();

    assert_eq!(stats.num_frames, 4);
    assert_eq!((stats.width, stats.height), (24, 24));
    assert!((stats.occupancy - 1.0).abs() < 1e-9);
    assert!(stats.summary().contains("Frames: 4"));
}

#[test]
fn test_empty_stats() {
    let stats = SheetStats::from_rects(0, 0, &[]);
    assert_eq!(stats.num_frames, 0);
    assert_eq!(stats.used_area, 0);
    assert_eq!(stats.occupancy, 0.0);
}
