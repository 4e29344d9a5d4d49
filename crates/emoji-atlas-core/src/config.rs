use crate::glyph_index::{DEFAULT_FONT_OFFSET, MAX_GLYPH_CODE};
use crate::tier::Tier;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Artifact families the orchestrator can emit per (category, tier, size).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Bin-packed sheet of tight-cropped glyphs + lookup script.
    Textures,
    /// Uniform grid strip + index metadata + layout hint.
    Sprites,
    /// Uniform grid bitmap font + font descriptor.
    Fonts,
}

impl FromStr for ArtifactKind {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "textures" | "texture" => Ok(Self::Textures),
            "sprites" | "sprite" => Ok(Self::Sprites),
            "fonts" | "font" => Ok(Self::Fonts),
            _ => Err(()),
        }
    }
}

/// Build configuration shared by every unit of one build invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Output square sizes in pixels.
    #[serde(default = "default_texture_sizes")]
    pub texture_sizes: Vec<u32>,
    /// Tiers to emit, in build order.
    #[serde(default = "default_tiers")]
    pub tiers: Vec<Tier>,
    /// Artifact families to emit.
    #[serde(default = "default_artifacts")]
    pub artifacts: Vec<ArtifactKind>,
    /// Pixels of empty margin on every side of each packed glyph.
    #[serde(default = "default_padding")]
    pub padding: u32,

    /// Alpha above this counts as opaque for bounds.
    #[serde(default = "default_alpha_threshold")]
    pub alpha_threshold: u8,
    /// Boxes larger than this percentile (width or height) are ignored for the category bound.
    #[serde(default = "default_outlier_percentile")]
    pub outlier_percentile: f64,

    /// Smallest side tried by the shelf packer.
    #[serde(default = "default_min_atlas_size")]
    pub min_atlas_size: u32,
    /// Largest side the shelf packer may grow to.
    #[serde(default = "default_max_atlas_size")]
    pub max_atlas_size: u32,

    /// Glyph codes start just above this value.
    #[serde(default = "default_font_offset")]
    pub font_offset: u32,
    /// Reserve code 32 as a zero-sized space glyph.
    #[serde(default)]
    pub font_include_space: bool,
    /// Parent resource the font descriptors belong to.
    #[serde(default = "default_font_parent_name")]
    pub font_parent_name: String,
    #[serde(default = "default_font_parent_path")]
    pub font_parent_path: String,

    /// Rasterization size for outline-font glyphs.
    #[serde(default = "default_glyph_render_px")]
    pub glyph_render_px: f32,
    /// Glyphs larger than this percentile are dropped as outliers.
    #[serde(default = "default_glyph_outlier_percentile")]
    pub glyph_outlier_percentile: f64,
    /// Minimum fraction of non-transparent pixels for a rendered glyph to be kept.
    #[serde(default = "default_glyph_significance")]
    pub glyph_significance: f64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            texture_sizes: default_texture_sizes(),
            tiers: default_tiers(),
            artifacts: default_artifacts(),
            padding: default_padding(),
            alpha_threshold: default_alpha_threshold(),
            outlier_percentile: default_outlier_percentile(),
            min_atlas_size: default_min_atlas_size(),
            max_atlas_size: default_max_atlas_size(),
            font_offset: default_font_offset(),
            font_include_space: false,
            font_parent_name: default_font_parent_name(),
            font_parent_path: default_font_parent_path(),
            glyph_render_px: default_glyph_render_px(),
            glyph_outlier_percentile: default_glyph_outlier_percentile(),
            glyph_significance: default_glyph_significance(),
        }
    }
}

impl BuildConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AtlasError;

        if self.texture_sizes.is_empty() {
            return Err(AtlasError::InvalidConfig("texture_sizes is empty".into()));
        }
        if self.texture_sizes.contains(&0) {
            return Err(AtlasError::InvalidConfig(
                "texture_sizes must not contain 0".into(),
            ));
        }
        if self.tiers.is_empty() {
            return Err(AtlasError::InvalidConfig("tiers is empty".into()));
        }
        for (name, p) in [
            ("outlier_percentile", self.outlier_percentile),
            ("glyph_outlier_percentile", self.glyph_outlier_percentile),
        ] {
            if !(p > 0.0 && p <= 100.0) {
                return Err(AtlasError::InvalidConfig(format!(
                    "{name} ({p}) must be in (0, 100]"
                )));
            }
        }
        if self.min_atlas_size == 0 || self.min_atlas_size > self.max_atlas_size {
            return Err(AtlasError::InvalidConfig(format!(
                "min_atlas_size ({}) must be in 1..=max_atlas_size ({})",
                self.min_atlas_size, self.max_atlas_size
            )));
        }
        if self.font_offset > MAX_GLYPH_CODE {
            return Err(AtlasError::InvalidConfig(format!(
                "font_offset ({:#X}) is above {:#X}",
                self.font_offset, MAX_GLYPH_CODE
            )));
        }
        if !(self.glyph_render_px > 0.0) {
            return Err(AtlasError::InvalidConfig(
                "glyph_render_px must be positive".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.glyph_significance) {
            return Err(AtlasError::InvalidConfig(format!(
                "glyph_significance ({}) must be in [0, 1)",
                self.glyph_significance
            )));
        }
        Ok(())
    }

    pub fn wants(&self, kind: ArtifactKind) -> bool {
        self.artifacts.contains(&kind)
    }
}

fn default_texture_sizes() -> Vec<u32> {
    vec![16, 24, 32]
}
fn default_tiers() -> Vec<Tier> {
    vec![Tier::Deluxe, Tier::Full, Tier::Lite]
}
fn default_artifacts() -> Vec<ArtifactKind> {
    vec![ArtifactKind::Textures]
}
fn default_padding() -> u32 {
    1
}
fn default_alpha_threshold() -> u8 {
    crate::bounds::DEFAULT_ALPHA_THRESHOLD
}
fn default_outlier_percentile() -> f64 {
    95.0
}
fn default_min_atlas_size() -> u32 {
    64
}
fn default_max_atlas_size() -> u32 {
    8192
}
fn default_font_offset() -> u32 {
    DEFAULT_FONT_OFFSET
}
fn default_font_parent_name() -> String {
    "Emoji".into()
}
fn default_font_parent_path() -> String {
    "Emoji.yyp".into()
}
fn default_glyph_render_px() -> f32 {
    256.0
}
fn default_glyph_outlier_percentile() -> f64 {
    97.0
}
fn default_glyph_significance() -> f64 {
    0.001
}

/// Builder for `BuildConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct BuildConfigBuilder {
    cfg: BuildConfig,
}

impl BuildConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: BuildConfig::default(),
        }
    }
    pub fn texture_sizes(mut self, v: impl Into<Vec<u32>>) -> Self {
        self.cfg.texture_sizes = v.into();
        self
    }
    pub fn tiers(mut self, v: impl Into<Vec<Tier>>) -> Self {
        self.cfg.tiers = v.into();
        self
    }
    pub fn artifacts(mut self, v: impl Into<Vec<ArtifactKind>>) -> Self {
        self.cfg.artifacts = v.into();
        self
    }
    pub fn padding(mut self, v: u32) -> Self {
        self.cfg.padding = v;
        self
    }
    pub fn alpha_threshold(mut self, v: u8) -> Self {
        self.cfg.alpha_threshold = v;
        self
    }
    pub fn outlier_percentile(mut self, v: f64) -> Self {
        self.cfg.outlier_percentile = v;
        self
    }
    pub fn atlas_size_range(mut self, min: u32, max: u32) -> Self {
        self.cfg.min_atlas_size = min;
        self.cfg.max_atlas_size = max;
        self
    }
    pub fn font_offset(mut self, v: u32) -> Self {
        self.cfg.font_offset = v;
        self
    }
    pub fn font_include_space(mut self, v: bool) -> Self {
        self.cfg.font_include_space = v;
        self
    }
    pub fn font_parent(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.cfg.font_parent_name = name.into();
        self.cfg.font_parent_path = path.into();
        self
    }
    pub fn glyph_render_px(mut self, v: f32) -> Self {
        self.cfg.glyph_render_px = v;
        self
    }
    pub fn glyph_outlier_percentile(mut self, v: f64) -> Self {
        self.cfg.glyph_outlier_percentile = v;
        self
    }
    pub fn glyph_significance(mut self, v: f64) -> Self {
        self.cfg.glyph_significance = v;
        self
    }
    pub fn build(self) -> BuildConfig {
        self.cfg
    }
}

impl BuildConfig {
    /// Create a fluent builder for `BuildConfig`.
    pub fn builder() -> BuildConfigBuilder {
        BuildConfigBuilder::new()
    }
}
