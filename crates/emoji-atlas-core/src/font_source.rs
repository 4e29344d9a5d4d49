//! Glyph bitmaps rendered from outline fonts with `fontdue`.
//!
//! Every `.ttf`/`.otf` file in a directory is one category named after its
//! file stem. Latin-script letters and general-category C codepoints are
//! left out; everything else in the character map (symbols, digits,
//! punctuation, pictographs) is rasterized.

use crate::bounds::percentile;
use crate::error::{AtlasError, Result};
use crate::glyph_index::is_other_category;
use crate::key::GlyphKey;
use crate::source::{GlyphSource, SourceImage, is_significant};
use fontdue::{Font, FontSettings};
use icu_properties::CodePointMapData;
use icu_properties::props::{GeneralCategory, GeneralCategoryGroup, Script};
use image::{Rgba, RgbaImage};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Offsets of the dilation passes; each pass draws the glyph shifted by one
/// pixel and the passes are merged by maximum coverage.
const DILATION: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(Debug, Clone)]
pub struct FontGlyphSource {
    fonts: BTreeMap<String, PathBuf>,
    render_px: f32,
    outlier_percentile: f64,
    significance: f64,
}

impl FontGlyphSource {
    /// Index the font files of `dir`. A missing directory yields no categories.
    pub fn from_dir(
        dir: &Path,
        render_px: f32,
        outlier_percentile: f64,
        significance: f64,
    ) -> Result<Self> {
        let mut fonts = BTreeMap::new();
        if dir.is_dir() {
            for entry in fs::read_dir(dir)? {
                let path = entry?.path();
                let is_font = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
                if !is_font {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    fonts.insert(stem.to_string(), path.clone());
                }
            }
        }
        Ok(Self {
            fonts,
            render_px,
            outlier_percentile,
            significance,
        })
    }

    pub fn from_config(dir: &Path, cfg: &crate::config::BuildConfig) -> Result<Self> {
        Self::from_dir(
            dir,
            cfg.glyph_render_px,
            cfg.glyph_outlier_percentile,
            cfg.glyph_significance,
        )
    }

    fn open(&self, category: &str) -> Result<Font> {
        let path = self
            .fonts
            .get(category)
            .ok_or_else(|| AtlasError::InvalidInput(format!("unknown font '{category}'")))?;
        let bytes = fs::read(path)?;
        Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| AtlasError::Font(format!("{}: {e}", path.display())))
    }

    /// Render every candidate character of `font`.
    pub fn render_font(&self, font: &Font) -> Vec<SourceImage> {
        let mut chars: Vec<char> = font.chars().keys().copied().filter(|&c| wants_char(c)).collect();
        chars.sort_unstable();

        let rendered: Vec<(char, usize, usize, Vec<u8>)> = chars
            .into_iter()
            .map(|ch| {
                let (m, bitmap) = font.rasterize(ch, self.render_px);
                (ch, m.width, m.height, bitmap)
            })
            .filter(|(_, w, h, _)| *w > 0 && *h > 0)
            .collect();
        if rendered.is_empty() {
            return Vec::new();
        }

        let widths: Vec<u32> = rendered.iter().map(|r| r.1 as u32).collect();
        let heights: Vec<u32> = rendered.iter().map(|r| r.2 as u32).collect();
        let wthresh = percentile(&widths, self.outlier_percentile).unwrap_or(f64::MAX);
        let hthresh = percentile(&heights, self.outlier_percentile).unwrap_or(f64::MAX);
        let mut kept: Vec<&(char, usize, usize, Vec<u8>)> = rendered
            .iter()
            .filter(|r| r.1 as f64 <= wthresh && r.2 as f64 <= hthresh)
            .collect();
        if kept.is_empty() {
            kept = rendered.iter().collect();
        }

        let largest = kept.iter().map(|r| r.1.max(r.2)).max().unwrap_or(0) as u32;
        // One spare pixel on each side for the dilation passes.
        let side = largest + 2;

        let mut out = Vec::with_capacity(kept.len());
        for (ch, w, h, bitmap) in kept {
            let canvas = draw_dilated(bitmap, *w as u32, *h as u32, side);
            if is_significant(&canvas, self.significance) {
                out.push(SourceImage::new(GlyphKey::from_char(*ch), canvas));
            } else {
                debug!(glyph = %GlyphKey::from_char(*ch).escaped(), "skipping insignificant glyph");
            }
        }
        out
    }
}

impl GlyphSource for FontGlyphSource {
    fn categories(&self) -> Result<Vec<String>> {
        Ok(self.fonts.keys().cloned().collect())
    }

    fn load(&self, category: &str) -> Result<Vec<SourceImage>> {
        let font = self.open(category)?;
        let glyphs = self.render_font(&font);
        info!(font = category, glyphs = glyphs.len(), "rendered font glyphs");
        Ok(glyphs)
    }
}

/// Latin-script letters and category C are not emitted as glyphs.
fn wants_char(ch: char) -> bool {
    let gc = CodePointMapData::<GeneralCategory>::new().get(ch);
    let script = CodePointMapData::<Script>::new().get(ch);
    if script == Script::Latin && GeneralCategoryGroup::Letter.contains(gc) {
        return false;
    }
    !is_other_category(ch as u32)
}

/// White glyph centred on a transparent `side` square, drawn once per
/// dilation offset.
fn draw_dilated(coverage: &[u8], w: u32, h: u32, side: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(side, side, Rgba([255, 255, 255, 0]));
    let ox = (side.saturating_sub(w) / 2) as i32;
    let oy = (side.saturating_sub(h) / 2) as i32;
    for (dx, dy) in DILATION {
        for y in 0..h {
            for x in 0..w {
                let a = coverage[(y * w + x) as usize];
                if a == 0 {
                    continue;
                }
                let px = ox + dx + x as i32;
                let py = oy + dy + y as i32;
                if px < 0 || py < 0 || px >= side as i32 || py >= side as i32 {
                    continue;
                }
                let p = canvas.get_pixel_mut(px as u32, py as u32);
                p[3] = p[3].max(a);
            }
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_letters_are_left_out() {
        assert!(!wants_char('A'));
        assert!(!wants_char('é'));
        assert!(wants_char('1'));
        assert!(wants_char('★'));
        assert!(wants_char('α'));
        assert!(!wants_char('\n'));
    }

    #[test]
    fn dilation_spreads_one_pixel() {
        let canvas = draw_dilated(&[255], 1, 1, 3);
        assert_eq!(canvas.get_pixel(1, 1)[3], 0);
        assert_eq!(canvas.get_pixel(0, 1)[3], 255);
        assert_eq!(canvas.get_pixel(2, 1)[3], 255);
        assert_eq!(canvas.get_pixel(1, 0)[3], 255);
        assert_eq!(canvas.get_pixel(1, 2)[3], 255);
        assert_eq!(canvas.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn missing_dir_has_no_fonts() {
        let src = FontGlyphSource::from_dir(Path::new("/nonexistent/fonts"), 64.0, 97.0, 0.001).unwrap();
        assert!(src.categories().unwrap().is_empty());
    }
}
