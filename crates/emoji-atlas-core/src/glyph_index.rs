//! Character code allocation for bitmap fonts.
//!
//! Codes are handed out in increasing order, starting just above a
//! configurable offset (the offset itself is never assigned), skipping codepoints the consuming engine cannot map to a glyph:
//! general category C (control, format, unassigned, private use,
//! surrogate), the Hebrew block (right-to-left shaping) and U+200D.
//! Codes above 0xFFFF are fatal.

use crate::error::{AtlasError, Result};
use crate::model::Rect;
use icu_properties::CodePointMapData;
use icu_properties::props::GeneralCategory;
use serde::{Deserialize, Serialize};

pub const SPACE: u32 = 32;
pub const HEBREW_BLOCK: std::ops::RangeInclusive<u32> = 0x0590..=0x05FF;
pub const MAX_GLYPH_CODE: u32 = 0xFFFF;
pub const DEFAULT_FONT_OFFSET: u32 = 33;

/// One glyph of a bitmap font descriptor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlyphRecord {
    pub character: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Horizontal advance; equals `width`.
    pub shift: u32,
    /// Reserved for kerning/baseline adjustment; always 0 for now.
    pub offset: i32,
}

/// Inclusive run of consecutive character codes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeRange {
    pub lower: u32,
    pub upper: u32,
}

/// True when the general category of `cp` is in group C.
pub fn is_other_category(cp: u32) -> bool {
    matches!(
        CodePointMapData::<GeneralCategory>::new().get32(cp),
        GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::Unassigned
            | GeneralCategory::PrivateUse
            | GeneralCategory::Surrogate
    )
}

#[derive(Debug, Clone)]
pub struct GlyphIndexAllocator {
    next: u32,
    include_space: bool,
}

impl GlyphIndexAllocator {
    /// The first candidate is `offset + 1`; with `include_space` the
    /// offset is raised to at least 32 first.
    pub fn new(offset: u32, include_space: bool) -> Self {
        let floor = if include_space {
            offset.max(SPACE)
        } else {
            offset
        };
        let next = floor.saturating_add(1);
        Self {
            next,
            include_space,
        }
    }

    /// Next usable code, or `None` once the probe passes 0xFFFF.
    pub fn next_code(&mut self) -> Option<u32> {
        loop {
            let candidate = self.next;
            if candidate > MAX_GLYPH_CODE {
                return None;
            }
            if HEBREW_BLOCK.contains(&candidate) {
                self.next = HEBREW_BLOCK.end() + 1;
                continue;
            }
            self.next = candidate + 1;
            if candidate == crate::tier::ZWJ || is_other_category(candidate) {
                continue;
            }
            return Some(candidate);
        }
    }

    /// Assign a code to every placed glyph, in order.
    ///
    /// Fails with `GlyphCodesExhausted` if the codes run out; no partial
    /// record list is returned.
    pub fn allocate(mut self, rects: &[Rect]) -> Result<Vec<GlyphRecord>> {
        let mut records = Vec::with_capacity(rects.len() + 1);
        if self.include_space {
            records.push(GlyphRecord {
                character: SPACE,
                x: 0,
                y: 0,
                width: 0,
                height: 0,
                shift: 0,
                offset: 0,
            });
        }
        for (assigned, r) in rects.iter().enumerate() {
            let character = self
                .next_code()
                .ok_or(AtlasError::GlyphCodesExhausted { assigned })?;
            records.push(GlyphRecord {
                character,
                x: r.x,
                y: r.y,
                width: r.w,
                height: r.h,
                shift: r.w,
                offset: 0,
            });
        }
        Ok(records)
    }
}

impl Default for GlyphIndexAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_OFFSET, false)
    }
}

/// Group codes into maximal runs of consecutive integers.
pub fn code_ranges(codes: &[u32]) -> Vec<CodeRange> {
    let mut sorted = codes.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let mut ranges: Vec<CodeRange> = Vec::new();
    for c in sorted {
        match ranges.last_mut() {
            Some(r) if r.upper + 1 == c => r.upper = c,
            _ => ranges.push(CodeRange { lower: c, upper: c }),
        }
    }
    ranges
}

/// Sorted codes, 40 per line, space separated.
pub fn sample_text(codes: &[u32]) -> String {
    let mut sorted = codes.to_vec();
    sorted.sort_unstable();
    sorted
        .chunks(40)
        .map(|line| {
            line.iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_group_consecutive_runs() {
        let r = code_ranges(&[40, 34, 35, 36, 38, 39]);
        assert_eq!(
            r,
            vec![
                CodeRange { lower: 34, upper: 36 },
                CodeRange { lower: 38, upper: 40 },
            ]
        );
        assert!(code_ranges(&[]).is_empty());
    }

    #[test]
    fn sample_text_wraps_at_forty() {
        let codes: Vec<u32> = (100..181).collect();
        let text = sample_text(&codes);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].split(' ').count(), 40);
        assert_eq!(lines[2], "180");
    }

    #[test]
    fn control_and_format_are_other() {
        assert!(is_other_category(0x7F));
        assert!(is_other_category(0x200D));
        assert!(is_other_category(0xD800));
        assert!(!is_other_category('A' as u32));
    }
}
