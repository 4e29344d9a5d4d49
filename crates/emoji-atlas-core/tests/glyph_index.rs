use emoji_atlas_core::error::AtlasError;
use emoji_atlas_core::glyph_index::{GlyphIndexAllocator, HEBREW_BLOCK, SPACE};
use emoji_atlas_core::model::Rect;

fn rects(n: usize) -> Vec<Rect> {
    (0..n as u32).map(|i| Rect::new(i * 18 + 1, 1, 16, 16)).collect()
}

#[test]
fn codes_are_unique_increasing_and_usable() {
    let records = GlyphIndexAllocator::new(33, false).allocate(&rects(3000)).unwrap();
    assert_eq!(records.len(), 3000);
    assert_eq!(records[0].character, 34);
    for pair in records.windows(2) {
        assert!(pair[0].character < pair[1].character);
    }
    for r in &records {
        assert!(!HEBREW_BLOCK.contains(&r.character), "{:#X}", r.character);
        assert_ne!(r.character, 0x200D);
        assert!(r.character <= 0xFFFF);
        assert!(r.character != 0x7F && !(0x80..=0x9F).contains(&r.character));
        assert_eq!(r.shift, r.width);
        assert_eq!(r.offset, 0);
    }
}

#[test]
fn records_copy_placement_rects() {
    let input = rects(3);
    let records = GlyphIndexAllocator::default().allocate(&input).unwrap();
    for (r, rect) in records.iter().zip(&input) {
        assert_eq!((r.x, r.y, r.width, r.height), (rect.x, rect.y, rect.w, rect.h));
    }
}

#[test]
fn hebrew_block_is_skipped_in_one_jump() {
    let records = GlyphIndexAllocator::new(*HEBREW_BLOCK.start(), false)
        .allocate(&rects(4))
        .unwrap();
    assert!(records[0].character > *HEBREW_BLOCK.end());
}

#[test]
fn zero_width_joiner_is_never_assigned() {
    let records = GlyphIndexAllocator::new(0x200C, false).allocate(&rects(2)).unwrap();
    // U+200E and U+200F are format characters as well.
    assert_eq!(records[0].character, 0x2010);
}

#[test]
fn offset_itself_is_never_assigned() {
    let records = GlyphIndexAllocator::default().allocate(&rects(1)).unwrap();
    assert_eq!(records[0].character, 34);
    let records = GlyphIndexAllocator::new(100, false).allocate(&rects(2)).unwrap();
    assert_eq!(records[0].character, 101);
}

#[test]
fn space_record_comes_first() {
    let records = GlyphIndexAllocator::new(20, true).allocate(&rects(2)).unwrap();
    assert_eq!(records.len(), 3);
    let space = records[0];
    assert_eq!(space.character, SPACE);
    assert_eq!((space.x, space.y, space.width, space.height, space.shift), (0, 0, 0, 0, 0));
    assert_eq!(records[1].character, 33);
    assert_eq!(records[2].character, 34);
}

#[test]
fn space_with_default_offset_skips_33() {
    let records = GlyphIndexAllocator::new(33, true).allocate(&rects(2)).unwrap();
    let codes: Vec<u32> = records.iter().map(|r| r.character).collect();
    assert_eq!(codes, vec![SPACE, 34, 35]);
}

#[test]
fn exhaustion_above_u16_is_fatal() {
    let err = GlyphIndexAllocator::new(0xFFF0, false)
        .allocate(&rects(100))
        .unwrap_err();
    match err {
        AtlasError::GlyphCodesExhausted { assigned } => assert!(assigned < 16),
        other => panic!("expected GlyphCodesExhausted, got {other:?}"),
    }
}

#[test]
fn last_usable_codes_below_the_ceiling() {
    let records = GlyphIndexAllocator::new(0xFFF0, false).allocate(&rects(2)).unwrap();
    let codes: Vec<u32> = records.iter().map(|r| r.character).collect();
    assert_eq!(codes, vec![0xFFFC, 0xFFFD]);
}
