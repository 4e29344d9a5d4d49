use crate::compositing::crop_rgba;
use crate::error::Result;
use crate::key::GlyphKey;
use crate::model::{GridLayout, Placement, Rect, SheetStats};
use image::RgbaImage;

pub mod grid;
pub mod shelf;

/// One normalized glyph image to place on a sheet.
#[derive(Debug, Clone)]
pub struct PackItem {
    pub key: GlyphKey,
    pub image: RgbaImage,
}

impl PackItem {
    pub fn new(key: GlyphKey, image: RgbaImage) -> Self {
        Self { key, image }
    }
}

/// Where each glyph ended up on a sheet.
#[derive(Debug, Clone)]
pub enum Placements {
    /// Heterogeneous sizes: one content rectangle per key, in placement order.
    Rects(Vec<Placement>),
    /// Uniform cells: the key at position `i` occupies grid cell `i`.
    Grid { layout: GridLayout, keys: Vec<GlyphKey> },
}

/// A packed sheet: RGBA raster plus placements.
#[derive(Debug, Clone)]
pub struct PackedSheet {
    pub rgba: RgbaImage,
    pub placements: Placements,
}

impl PackedSheet {
    /// Content rectangle of every glyph, in placement order.
    pub fn content_rects(&self) -> Vec<(&GlyphKey, Rect)> {
        match &self.placements {
            Placements::Rects(list) => list.iter().map(|p| (&p.key, p.rect)).collect(),
            Placements::Grid { layout, keys } => keys
                .iter()
                .enumerate()
                .map(|(i, k)| (k, layout.cell_rect(i as u32)))
                .collect(),
        }
    }

    /// Cut the pixels of `key` back out of the sheet.
    pub fn slice(&self, key: &GlyphKey) -> Option<RgbaImage> {
        self.content_rects()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, r)| crop_rgba(&self.rgba, r))
    }

    pub fn stats(&self) -> SheetStats {
        let rects: Vec<Rect> = self.content_rects().into_iter().map(|(_, r)| r).collect();
        SheetStats::from_rects(self.rgba.width(), self.rgba.height(), &rects)
    }
}

/// A packing strategy turns normalized glyph images into one sheet.
///
/// Implementations must place every item without overlap, keep all content
/// inside the returned raster and copy pixels verbatim.
pub trait SheetPacker {
    fn name(&self) -> &'static str;
    fn pack(&self, items: &[PackItem]) -> Result<PackedSheet>;
}
