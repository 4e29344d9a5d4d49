use super::{PackItem, PackedSheet, Placements, SheetPacker};
use crate::compositing::{blit_rgba, crop_rgba};
use crate::error::{AtlasError, Result};
use crate::model::{Placement, Rect};
use image::RgbaImage;
use tracing::{debug, instrument};

/// Row-by-row bin packer that searches for the smallest square atlas.
///
/// Items are sorted by descending area and laid out left to right on
/// shelves; each occupies its size plus `padding` on every side. When a
/// shelf layout overflows the square, the side grows by one pixel and the
/// layout is retried, up to `max_side`.
#[derive(Debug, Clone, Copy)]
pub struct ShelfPacker {
    pub padding: u32,
    /// Smallest side tried.
    pub min_side: u32,
    /// Largest side tried before giving up with `AtlasCapacity`.
    pub max_side: u32,
}

impl ShelfPacker {
    pub fn new(padding: u32, min_side: u32, max_side: u32) -> Self {
        Self {
            padding,
            min_side,
            max_side,
        }
    }

    fn padded(&self, w: u32, h: u32) -> (u32, u32) {
        (w + self.padding * 2, h + self.padding * 2)
    }

    /// First side length worth trying: the area estimate, the largest
    /// padded dimension and `min_side`, whichever is largest.
    pub fn initial_side(&self, sizes: &[(u32, u32)]) -> u32 {
        let mut area = 0u64;
        let mut largest = 0u32;
        for &(w, h) in sizes {
            let (pw, ph) = self.padded(w, h);
            area += pw as u64 * ph as u64;
            largest = largest.max(pw).max(ph);
        }
        let estimate = super::grid::ceil_sqrt(area) as u32;
        self.min_side.max(estimate).max(largest)
    }

    /// Shelf layout of `sizes` (already in placement order) in a square of
    /// `side`. Returns padded slot origins, or `None` when they do not fit.
    pub fn try_layout(&self, sizes: &[(u32, u32)], side: u32) -> Option<Vec<(u32, u32)>> {
        let mut origins = Vec::with_capacity(sizes.len());
        let (mut x, mut y, mut row_h) = (0u32, 0u32, 0u32);
        for &(w, h) in sizes {
            let (pw, ph) = self.padded(w, h);
            if x + pw > side {
                x = 0;
                y += row_h;
                row_h = 0;
            }
            if x + pw > side || y + ph > side {
                return None;
            }
            origins.push((x, y));
            x += pw;
            row_h = row_h.max(ph);
        }
        Some(origins)
    }

    /// Pure layout without pixels: placement order and content rectangles
    /// within an uncropped square of the returned side.
    pub fn layout(&self, sizes: &[(u32, u32)]) -> Result<(u32, Vec<(usize, Rect)>)> {
        if sizes.is_empty() {
            return Err(AtlasError::Empty);
        }
        let mut order: Vec<usize> = (0..sizes.len()).collect();
        order.sort_by(|&a, &b| {
            let area_a = sizes[a].0 as u64 * sizes[a].1 as u64;
            let area_b = sizes[b].0 as u64 * sizes[b].1 as u64;
            area_b.cmp(&area_a)
        });
        let sorted: Vec<(u32, u32)> = order.iter().map(|&i| sizes[i]).collect();

        let mut side = self.initial_side(&sorted);
        loop {
            if side > self.max_side {
                return Err(AtlasError::AtlasCapacity {
                    side,
                    limit: self.max_side,
                });
            }
            if let Some(origins) = self.try_layout(&sorted, side) {
                let rects = order
                    .iter()
                    .zip(origins)
                    .map(|(&idx, (x, y))| {
                        let (w, h) = sizes[idx];
                        (idx, Rect::new(x + self.padding, y + self.padding, w, h))
                    })
                    .collect();
                return Ok((side, rects));
            }
            side += 1;
        }
    }
}

impl SheetPacker for ShelfPacker {
    fn name(&self) -> &'static str {
        "shelf"
    }

    #[instrument(skip_all, fields(count = items.len()))]
    fn pack(&self, items: &[PackItem]) -> Result<PackedSheet> {
        let sizes: Vec<(u32, u32)> = items.iter().map(|it| it.image.dimensions()).collect();
        let (side, rects) = self.layout(&sizes)?;

        let mut canvas = RgbaImage::new(side, side);
        let mut used: Option<Rect> = None;
        for &(idx, r) in &rects {
            blit_rgba(&items[idx].image, &mut canvas, r.x, r.y);
            used = Some(match used {
                None => r,
                Some(u) => {
                    let x = u.x.min(r.x);
                    let y = u.y.min(r.y);
                    Rect::new(x, y, u.right().max(r.right()) - x, u.bottom().max(r.bottom()) - y)
                }
            });
        }

        // Trim unused area: keep the used region plus one padding margin.
        let crop = used
            .map(|u| u.expand(self.padding))
            .map(|c| Rect::new(c.x, c.y, c.w.min(side - c.x), c.h.min(side - c.y)))
            .unwrap_or(Rect::new(0, 0, side, side));
        let rgba = if crop == Rect::new(0, 0, side, side) {
            canvas
        } else {
            crop_rgba(&canvas, crop)
        };
        let placements = rects
            .into_iter()
            .map(|(idx, r)| Placement {
                key: items[idx].key.clone(),
                rect: Rect::new(r.x - crop.x, r.y - crop.y, r.w, r.h),
            })
            .collect();

        debug!(side, width = rgba.width(), height = rgba.height(), "shelf packed");
        Ok(PackedSheet {
            rgba,
            placements: Placements::Rects(placements),
        })
    }
}
