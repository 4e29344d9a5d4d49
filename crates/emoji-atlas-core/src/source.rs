use crate::error::{AtlasError, Result};
use crate::key::GlyphKey;
use image::RgbaImage;
use std::collections::BTreeMap;

/// One decoded source bitmap and the glyph it depicts.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub key: GlyphKey,
    pub rgba: RgbaImage,
}

impl SourceImage {
    pub fn new(key: GlyphKey, rgba: RgbaImage) -> Self {
        Self { key, rgba }
    }
}

/// Supplies pre-rendered glyph bitmaps grouped by category.
///
/// Unreadable or misnamed entries are the provider's concern: it logs and
/// skips them, and `load` only fails when the category itself cannot be read.
pub trait ImageSource {
    /// Category names, in the order they should be built.
    fn categories(&self) -> Result<Vec<String>>;
    fn load(&self, category: &str) -> Result<Vec<SourceImage>>;
}

/// Supplies glyph bitmaps rendered from outline fonts; one category per font.
pub trait GlyphSource {
    fn categories(&self) -> Result<Vec<String>>;
    fn load(&self, category: &str) -> Result<Vec<SourceImage>>;
}

/// True when more than `min_ratio` of the pixels have any coverage.
pub fn is_significant(rgba: &RgbaImage, min_ratio: f64) -> bool {
    let total = rgba.width() as u64 * rgba.height() as u64;
    if total == 0 {
        return false;
    }
    let covered = rgba.pixels().filter(|p| p[3] > 0).count() as u64;
    covered as f64 / total as f64 > min_ratio
}

/// Categories held in memory. Serves both provider roles, which makes it
/// the source of choice for tests and for callers that decode images
/// themselves.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    categories: BTreeMap<String, Vec<SourceImage>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: impl Into<String>, images: Vec<SourceImage>) {
        self.categories.insert(category.into(), images);
    }

    pub fn with_category(mut self, category: impl Into<String>, images: Vec<SourceImage>) -> Self {
        self.insert(category, images);
        self
    }

    fn names(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    fn get(&self, category: &str) -> Result<Vec<SourceImage>> {
        self.categories
            .get(category)
            .cloned()
            .ok_or_else(|| AtlasError::InvalidInput(format!("unknown category '{category}'")))
    }
}

impl ImageSource for MemorySource {
    fn categories(&self) -> Result<Vec<String>> {
        Ok(self.names())
    }
    fn load(&self, category: &str) -> Result<Vec<SourceImage>> {
        self.get(category)
    }
}

impl GlyphSource for MemorySource {
    fn categories(&self) -> Result<Vec<String>> {
        Ok(self.names())
    }
    fn load(&self, category: &str) -> Result<Vec<SourceImage>> {
        self.get(category)
    }
}
