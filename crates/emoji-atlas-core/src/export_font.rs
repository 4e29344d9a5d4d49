use crate::error::Result;
use crate::glyph_index::{CodeRange, GlyphRecord, code_ranges, sample_text};
use crate::tier::Tier;
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::Path;

/// Named reference to another resource of the consuming project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceRef {
    pub name: String,
    pub path: String,
}

/// GameMaker `GMFont` resource (`.yy`). Only the fields the engine requires
/// to load a pre-rendered bitmap font are modelled; all other settings are
/// fixed to the values a bitmap font needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FontDescriptor {
    #[serde(rename = "$GMFont")]
    pub gm_font: String,
    #[serde(rename = "%Name")]
    pub resource_name: String,
    #[serde(rename = "AntiAlias")]
    pub anti_alias: u32,
    #[serde(rename = "applyKerning")]
    pub apply_kerning: u32,
    pub ascender: u32,
    #[serde(rename = "ascenderOffset")]
    pub ascender_offset: i32,
    pub bold: bool,
    #[serde(rename = "canGenerateBitmap")]
    pub can_generate_bitmap: bool,
    pub charset: u32,
    pub first: u32,
    #[serde(rename = "fontName")]
    pub font_name: String,
    #[serde(rename = "glyphOperations")]
    pub glyph_operations: u32,
    pub glyphs: Vec<GlyphRecord>,
    pub hinting: u32,
    #[serde(rename = "includeTTF")]
    pub include_ttf: bool,
    pub interpreter: u32,
    pub italic: bool,
    #[serde(rename = "kerningPairs")]
    pub kerning_pairs: Vec<serde_json::Value>,
    pub last: u32,
    #[serde(rename = "lineHeight")]
    pub line_height: u32,
    #[serde(rename = "maintainGms1Font")]
    pub maintain_gms1_font: bool,
    pub name: String,
    pub parent: ResourceRef,
    #[serde(rename = "pointRounding")]
    pub point_rounding: u32,
    pub ranges: Vec<CodeRange>,
    #[serde(rename = "regenerateBitmap")]
    pub regenerate_bitmap: bool,
    #[serde(rename = "resourceType")]
    pub resource_type: String,
    #[serde(rename = "resourceVersion")]
    pub resource_version: String,
    #[serde(rename = "sampleText")]
    pub sample_text: String,
    #[serde(rename = "sdfSpread")]
    pub sdf_spread: u32,
    pub size: u32,
    #[serde(rename = "styleName")]
    pub style_name: String,
    #[serde(rename = "textureGroupId")]
    pub texture_group_id: ResourceRef,
    #[serde(rename = "TTFName")]
    pub ttf_name: String,
    #[serde(rename = "usesSDF")]
    pub uses_sdf: bool,
}

impl FontDescriptor {
    /// Descriptor for a bitmap font of `size` pixels whose glyphs were
    /// allocated into `glyphs`. `resource_name` is the `.yy` file stem;
    /// `family` is the human readable category name.
    pub fn new(
        resource_name: &str,
        family: &str,
        size: u32,
        glyphs: Vec<GlyphRecord>,
        parent: ResourceRef,
    ) -> Self {
        let codes: Vec<u32> = glyphs.iter().map(|g| g.character).collect();
        let font_name = format!("{family} Emojis");
        Self {
            gm_font: String::new(),
            resource_name: resource_name.to_string(),
            anti_alias: 1,
            apply_kerning: 0,
            ascender: size,
            ascender_offset: 0,
            bold: false,
            can_generate_bitmap: true,
            charset: 0,
            first: 0,
            font_name: font_name.clone(),
            glyph_operations: 0,
            ranges: code_ranges(&codes),
            sample_text: sample_text(&codes),
            glyphs,
            hinting: 0,
            include_ttf: false,
            interpreter: 0,
            italic: false,
            kerning_pairs: Vec::new(),
            last: 0,
            line_height: size,
            maintain_gms1_font: false,
            name: resource_name.to_string(),
            parent,
            point_rounding: 0,
            regenerate_bitmap: false,
            resource_type: "GMFont".into(),
            resource_version: "2.0".into(),
            sdf_spread: 8,
            size,
            style_name: "Regular".into(),
            texture_group_id: ResourceRef {
                name: "Default".into(),
                path: "texturegroups/Default".into(),
            },
            ttf_name: font_name,
            uses_sdf: false,
        }
    }

    /// Four-space indented JSON, the layout the engine writes itself.
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Project manifest fragments listing every font descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceManifest {
    /// Lines for `resource_order.txt`.
    pub order: String,
    /// Lines for `resources.txt`.
    pub resources: String,
}

impl ResourceManifest {
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut order = Vec::with_capacity(names.len());
        let mut resources = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let name = name.as_ref();
            let path = format!("fonts/{name}/{name}.yy");
            order.push(format!(r#"{{"name":"{name}","order":{i},"path":"{path}",}},"#));
            resources.push(format!(r#"{{"name":"{name}","path":"{path}",}},"#));
        }
        Self {
            order: order.join("\n"),
            resources: resources.join("\n"),
        }
    }
}

/// Stems of every `.yy` under `<fonts_root>/<Tier>/<category>/`, ordered by
/// tier (as given), then category directory name, then file name.
pub fn scan_font_descriptors(fonts_root: &Path, tiers: &[Tier]) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for tier in tiers {
        let tier_dir = fonts_root.join(tier.dir_name());
        if !tier_dir.is_dir() {
            continue;
        }
        let mut categories: Vec<_> = fs::read_dir(&tier_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        categories.sort();
        for dir in categories {
            let mut stems: Vec<String> = fs::read_dir(&dir)?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "yy"))
                .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
                .collect();
            stems.sort();
            names.extend(stems);
        }
    }
    Ok(names)
}
