use crate::error::Result;
use crate::key::GlyphKey;
use crate::model::{GridLayout, Placement};
use image::{ImageFormat, RgbaImage};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use std::fs;
use std::path::Path;
use tracing::debug;

/// JSON object whose entries keep insertion order.
///
/// `serde_json::Map` sorts its keys; packed sheets need their entries in
/// placement order so the consumer sees keys in sheet order.
pub struct OrderedEntries<'a, V: Serialize>(pub &'a [(String, V)]);

impl<V: Serialize> Serialize for OrderedEntries<'_, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct FrameJson {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

/// `{ "<key>": { "x", "y", "w", "h" } }` in packing order.
pub fn placements_to_json(placements: &[Placement]) -> Result<String> {
    let entries: Vec<(String, FrameJson)> = placements
        .iter()
        .map(|p| {
            (
                p.key.to_string(),
                FrameJson {
                    x: p.rect.x,
                    y: p.rect.y,
                    w: p.rect.w,
                    h: p.rect.h,
                },
            )
        })
        .collect();
    Ok(serde_json::to_string(&OrderedEntries(&entries))?)
}

/// `{ "<key>": index }` where `index` is the grid cell of the key.
pub fn grid_index_to_json(keys: &[GlyphKey]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&OrderedEntries(&grid_index_entries(keys)))?)
}

/// Same table as [`grid_index_to_json`] without whitespace, for embedding.
pub fn grid_index_to_compact_json(keys: &[GlyphKey]) -> Result<String> {
    Ok(serde_json::to_string(&OrderedEntries(&grid_index_entries(keys)))?)
}

fn grid_index_entries(keys: &[GlyphKey]) -> Vec<(String, usize)> {
    keys.iter()
        .enumerate()
        .map(|(i, k)| (k.to_string(), i))
        .collect()
}

/// `{ "<key>": character_code }` for font lookup tables.
pub fn glyph_codes_to_json(pairs: &[(GlyphKey, u32)]) -> Result<String> {
    let entries: Vec<(String, u32)> = pairs.iter().map(|(k, c)| (k.to_string(), *c)).collect();
    Ok(serde_json::to_string_pretty(&OrderedEntries(&entries))?)
}

/// Body of the layout hint file next to a grid sheet.
pub fn layout_hint_to_json(layout: &GridLayout) -> Result<String> {
    Ok(serde_json::to_string_pretty(layout)?)
}

/// Replace every non-ASCII character of already-serialized JSON with
/// `\uXXXX` escapes (UTF-16 code units, so astral characters become a
/// surrogate pair).
pub fn ascii_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut buf = [0u16; 2];
    for ch in json.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else {
            for unit in ch.encode_utf16(&mut buf) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

/// Escape text for a double-quoted GML string literal.
pub fn gml_string_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Write `contents` to `path` unless the file already holds exactly those
/// bytes. Parent directories are created. Returns whether a write happened.
pub fn write_if_changed(path: &Path, contents: &[u8]) -> Result<bool> {
    if matches!(fs::read(path), Ok(existing) if existing == contents) {
        debug!(path = %path.display(), "unchanged");
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(true)
}

/// Encode `rgba` as PNG at `path`, creating parent directories.
pub fn write_png(path: &Path, rgba: &RgbaImage) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    rgba.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
