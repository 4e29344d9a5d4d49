//! Core library for building emoji texture atlases and bitmap fonts.
//!
//! - Analysis: alpha bounding boxes with an outlier-tolerant category bound
//! - Tiers: Lite/Full/Deluxe admission by ZWJ and skin-tone composition
//! - Packers: shelf bin packing into the smallest square, uniform grids
//! - Fonts: collision-free glyph code allocation and `.yy` descriptors
//! - Orchestration: `AtlasBuilder` writes sheets, JSON, lookup scripts and manifests
//!
//! Quick example:
//! ```ignore
//! use emoji_atlas_core::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! let key = GlyphKey::from_file_stem("1f600")?;
//! let img = image::open("1f600.png")?.to_rgba8();
//! let src = MemorySource::new().with_category("Smileys", vec![SourceImage::new(key, img)]);
//! let cfg = BuildConfig::builder().texture_sizes([16, 32]).build();
//! let builder = AtlasBuilder::new(cfg, "out")?;
//! let report = builder.build_images(&src, |_| true)?;
//! println!("written: {}", report.written);
//! # Ok(()) }
//! ```

pub mod bounds;
pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod export_font;
pub mod export_script;
#[cfg(feature = "font")]
pub mod font_source;
pub mod glyph_index;
pub mod key;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod packer;
pub mod source;
pub mod tier;

pub use config::*;
pub use error::*;
pub use key::{GlyphKey, category_slug};
pub use model::*;
pub use orchestrator::{AtlasBuilder, BuildReport, FailedUnit, OutputPaths};
pub use packer::{PackItem, PackedSheet, Placements, SheetPacker};
pub use source::{GlyphSource, ImageSource, MemorySource, SourceImage};
pub use tier::Tier;

/// Convenience prelude for common types and functions.
/// Importing `emoji_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::bounds::{BoundingBox, global_bounds, image_bounds};
    pub use crate::config::{ArtifactKind, BuildConfig, BuildConfigBuilder};
    pub use crate::error::{AtlasError, Result};
    #[cfg(feature = "font")]
    pub use crate::font_source::FontGlyphSource;
    pub use crate::glyph_index::{GlyphIndexAllocator, GlyphRecord};
    pub use crate::key::GlyphKey;
    pub use crate::model::{GridLayout, Placement, Rect, SheetStats};
    pub use crate::orchestrator::{AtlasBuilder, BuildReport};
    pub use crate::packer::grid::GridPacker;
    pub use crate::packer::shelf::ShelfPacker;
    pub use crate::packer::{PackItem, PackedSheet, Placements, SheetPacker};
    pub use crate::source::{GlyphSource, ImageSource, MemorySource, SourceImage};
    pub use crate::tier::Tier;
}
