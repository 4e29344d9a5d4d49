use super::{PackItem, PackedSheet, Placements, SheetPacker};
use crate::compositing::blit_rgba;
use crate::error::{AtlasError, Result};
use crate::model::GridLayout;
use image::RgbaImage;
use tracing::debug;

/// Smallest `c` with `c * c >= n`.
pub fn ceil_sqrt(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let mut c = (n as f64).sqrt() as u64;
    while c * c < n {
        c += 1;
    }
    while c > 0 && (c - 1) * (c - 1) >= n {
        c -= 1;
    }
    c
}

/// Column-first grid for `count` items: `(columns, rows)` with
/// `columns = ceil(sqrt(count))` and `rows = ceil(count / columns)`.
pub fn grid_dimensions(count: u32) -> (u32, u32) {
    if count == 0 {
        return (0, 0);
    }
    let columns = ceil_sqrt(count as u64) as u32;
    let rows = count.div_ceil(columns);
    (columns, rows)
}

/// Uniform-cell packer for images that already share one square size.
#[derive(Debug, Clone, Copy)]
pub struct GridPacker {
    pub size: u32,
    pub padding: u32,
}

impl GridPacker {
    pub fn new(size: u32, padding: u32) -> Self {
        Self { size, padding }
    }

    pub fn layout(&self, count: u32) -> GridLayout {
        let (columns, rows) = grid_dimensions(count);
        GridLayout {
            columns,
            rows,
            count,
            cell_size: self.size + self.padding * 2,
            padding: self.padding,
        }
    }
}

impl SheetPacker for GridPacker {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn pack(&self, items: &[PackItem]) -> Result<PackedSheet> {
        if items.is_empty() {
            return Err(AtlasError::Empty);
        }
        if let Some(bad) = items
            .iter()
            .find(|it| it.image.dimensions() != (self.size, self.size))
        {
            return Err(AtlasError::InvalidInput(format!(
                "grid cell is {}x{} but {} is {}x{}",
                self.size,
                self.size,
                bad.key.escaped(),
                bad.image.width(),
                bad.image.height()
            )));
        }
        let layout = self.layout(items.len() as u32);
        let (sheet_w, sheet_h) = layout.sheet_size();
        let mut canvas = RgbaImage::new(sheet_w, sheet_h);
        for (i, item) in items.iter().enumerate() {
            let r = layout.cell_rect(i as u32);
            blit_rgba(&item.image, &mut canvas, r.x, r.y);
        }
        debug!(
            columns = layout.columns,
            rows = layout.rows,
            count = layout.count,
            "grid packed"
        );
        Ok(PackedSheet {
            rgba: canvas,
            placements: Placements::Grid {
                layout,
                keys: items.iter().map(|it| it.key.clone()).collect(),
            },
        })
    }
}
