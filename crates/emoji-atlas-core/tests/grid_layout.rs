use emoji_atlas_core::error::AtlasError;
use emoji_atlas_core::key::GlyphKey;
use emoji_atlas_core::model::Rect;
use emoji_atlas_core::packer::grid::{GridPacker, grid_dimensions};
use emoji_atlas_core::packer::{PackItem, Placements, SheetPacker};
use image::RgbaImage;

fn items(n: u32, size: u32) -> Vec<PackItem> {
    (0..n)
        .map(|i| {
            PackItem::new(
                GlyphKey::from_codepoints(&[0x1F400 + i]).unwrap(),
                RgbaImage::new(size, size),
            )
        })
        .collect()
}

#[test]
fn five_items_make_three_by_two() {
    assert_eq!(grid_dimensions(5), (3, 2));
    let sheet = GridPacker::new(10, 1).pack(&items(5, 10)).unwrap();
    assert_eq!(sheet.rgba.dimensions(), (36, 24));
    let Placements::Grid { layout, keys } = &sheet.placements else {
        panic!("expected grid placements");
    };
    assert_eq!((layout.columns, layout.rows, layout.count), (3, 2, 5));
    assert_eq!(layout.cell_size, 12);
    assert_eq!(keys.len(), 5);
    assert_eq!(layout.hint_file_name(), "3x2_5.txt");
    assert_eq!(layout.cell_rect(4), Rect::new(13, 13, 10, 10));
}

#[test]
fn columns_cover_count_and_favor_width() {
    for n in 1..=500u32 {
        let (c, r) = grid_dimensions(n);
        assert!(c * r >= n, "n={n}");
        assert!(c >= r, "n={n}");
        assert!((c - 1) * (c - 1) < n, "n={n}: columns not minimal");
    }
}

#[test]
fn grid_rejects_mismatched_cells() {
    let mut input = items(3, 8);
    input.push(PackItem::new(
        GlyphKey::from_char('x'),
        RgbaImage::new(8, 9),
    ));
    let err = GridPacker::new(8, 1).pack(&input).unwrap_err();
    assert!(matches!(err, AtlasError::InvalidInput(_)));
}

#[test]
fn grid_rejects_empty_input() {
    assert!(matches!(
        GridPacker::new(8, 1).pack(&[]),
        Err(AtlasError::Empty)
    ));
}

#[test]
fn grid_cells_do_not_overlap() {
    let sheet = GridPacker::new(16, 2).pack(&items(17, 16)).unwrap();
    let rects: Vec<Rect> = sheet.content_rects().into_iter().map(|(_, r)| r).collect();
    let bounds = Rect::new(0, 0, sheet.rgba.width(), sheet.rgba.height());
    for (i, a) in rects.iter().enumerate() {
        assert!(bounds.contains(&a.expand(2)));
        for b in &rects[i + 1..] {
            assert!(!a.expand(2).intersects(&b.expand(2)));
        }
    }
}
