//! GML lookup scripts.
//!
//! Texture sheets get a function that lazily parses an embedded JSON table
//! mapping each glyph key to its rectangle on the sheet, then hands it to
//! the engine-side `__emj_build_format_tags_for_lookup_table` helper.
//! Sprite strips get a smaller function returning the key to cell index
//! table of `metadata.json`.

use crate::error::Result;
use crate::export::{ascii_json, gml_string_escape, grid_index_to_compact_json, placements_to_json};
use crate::key::GlyphKey;
use crate::model::Placement;
use handlebars::Handlebars;
use serde::Serialize;

const LOOKUP_TEMPLATE: &str = include_str!("templates/lookup_table.gml.hbs");
const SPRITE_LOOKUP_TEMPLATE: &str = include_str!("templates/sprite_lookup.gml.hbs");

/// Names shared by a texture sheet and its lookup script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetNames {
    /// `emj_spr_<slug>_<tier>_<size>`: sprite resource and PNG/JSON stem.
    pub sprite: String,
    /// `emj_lt_<slug>_<tier>_<size>`: lookup function and script stem.
    pub function: String,
}

impl SheetNames {
    pub fn new(slug: &str, tier: &str, size: u32) -> Self {
        Self {
            sprite: format!("emj_spr_{slug}_{tier}_{size}"),
            function: format!("emj_lt_{slug}_{tier}_{size}"),
        }
    }
}

/// `__emoji_lookup_<slug>_<tier>`: lookup function of a sprite strip folder.
pub fn sprite_lookup_function(slug: &str, tier: &str) -> String {
    format!("__emoji_lookup_{slug}_{tier}")
}

#[derive(Serialize)]
struct LookupContext<'a> {
    function_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sprite_name: Option<&'a str>,
    json: String,
}

fn render(template: &str, ctx: &LookupContext<'_>) -> Result<String> {
    let mut reg = Handlebars::new();
    reg.set_strict_mode(true);
    reg.register_escape_fn(handlebars::no_escape);
    reg.register_template_string("lookup", template)?;
    Ok(reg.render("lookup", ctx)?)
}

/// Render the lookup script for one texture sheet. The output depends only
/// on the names and placements, so re-running yields identical bytes.
pub fn render_lookup_script(names: &SheetNames, placements: &[Placement]) -> Result<String> {
    let json = gml_string_escape(&ascii_json(&placements_to_json(placements)?));
    render(
        LOOKUP_TEMPLATE,
        &LookupContext {
            function_name: &names.function,
            sprite_name: Some(&names.sprite),
            json,
        },
    )
}

/// Render `lookup.gml` for a sprite strip folder: `keys` in cell order.
pub fn render_sprite_lookup_script(function_name: &str, keys: &[GlyphKey]) -> Result<String> {
    let json = gml_string_escape(&ascii_json(&grid_index_to_compact_json(keys)?));
    render(
        SPRITE_LOOKUP_TEMPLATE,
        &LookupContext {
            function_name,
            sprite_name: None,
            json,
        },
    )
}
