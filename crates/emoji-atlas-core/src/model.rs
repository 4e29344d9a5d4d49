use crate::key::GlyphKey;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
    /// Grows the rectangle by `pad` on every side (saturating at the origin).
    pub fn expand(&self, pad: u32) -> Rect {
        let x = self.x.saturating_sub(pad);
        let y = self.y.saturating_sub(pad);
        Rect::new(x, y, self.right() + pad - x, self.bottom() + pad - y)
    }
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
}

/// Content rectangle of one glyph inside a bin-packed sheet.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Placement {
    pub key: GlyphKey,
    pub rect: Rect,
}

/// Geometry of a uniform grid sheet. Persisted next to grid sheets so the
/// consumer can derive pixel coordinates from a sequential index:
/// `x = (i % columns) * cell_size + padding`, `y = (i / columns) * cell_size + padding`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
    pub count: u32,
    pub cell_size: u32,
    pub padding: u32,
}

impl GridLayout {
    /// Content rectangle of cell `index`.
    pub fn cell_rect(&self, index: u32) -> Rect {
        let col = index % self.columns;
        let row = index / self.columns;
        let content = self.cell_size - self.padding * 2;
        Rect::new(
            col * self.cell_size + self.padding,
            row * self.cell_size + self.padding,
            content,
            content,
        )
    }

    pub fn sheet_size(&self) -> (u32, u32) {
        (self.columns * self.cell_size, self.rows * self.cell_size)
    }

    /// File name of the layout hint: `<columns>x<rows>_<count>.txt`.
    pub fn hint_file_name(&self) -> String {
        format!("{}x{}_{}.txt", self.columns, self.rows, self.count)
    }
}

/// Statistics about sheet packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SheetStats {
    pub width: u32,
    pub height: u32,
    pub num_frames: usize,
    /// Sum of content areas (padding excluded).
    pub used_area: u64,
    /// used_area / (width * height), 0.0 to 1.0.
    pub occupancy: f64,
}

impl SheetStats {
    pub fn from_rects<'a>(width: u32, height: u32, rects: impl IntoIterator<Item = &'a Rect>) -> Self {
        let mut num_frames = 0;
        let mut used_area = 0u64;
        for r in rects {
            num_frames += 1;
            used_area += r.area();
        }
        let total = width as u64 * height as u64;
        let occupancy = if total > 0 {
            used_area as f64 / total as f64
        } else {
            0.0
        };
        Self {
            width,
            height,
            num_frames,
            used_area,
            occupancy,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Size: {}x{}, Frames: {}, Occupancy: {:.2}%, Used Area: {} px²",
            self.width,
            self.height,
            self.num_frames,
            self.occupancy * 100.0,
            self.used_area,
        )
    }
}
