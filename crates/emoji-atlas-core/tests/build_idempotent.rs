use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use emoji_atlas_core::config::{ArtifactKind, BuildConfig};
use emoji_atlas_core::error::AtlasError;
use emoji_atlas_core::key::GlyphKey;
use emoji_atlas_core::orchestrator::AtlasBuilder;
use emoji_atlas_core::source::{MemorySource, SourceImage};
use emoji_atlas_core::tier::Tier;
use image::{Rgba, RgbaImage};

const CATEGORY: &str = "Smileys & Emotion";

fn glyph(cps: &[u32], shade: u8, inset: u32) -> SourceImage {
    let mut img = RgbaImage::new(72, 72);
    for y in inset..72 - inset {
        for x in inset..72 - inset {
            img.put_pixel(x, y, Rgba([shade, 255 - shade, 128, 255]));
        }
    }
    SourceImage::new(GlyphKey::from_codepoints(cps).unwrap(), img)
}

fn source() -> MemorySource {
    MemorySource::new().with_category(
        CATEGORY,
        vec![
            glyph(&[0x1F469, 0x200D, 0x1F692], 10, 6),
            glyph(&[0x1F600], 40, 4),
            glyph(&[0x1F600, 0x1F3FD], 80, 8),
            glyph(&[0x1F601], 120, 4),
            glyph(&[0x1F602], 160, 12),
            glyph(&[0x1F44D, 0x1F3FB], 200, 10),
        ],
    )
}

fn config() -> BuildConfig {
    BuildConfig::builder()
        .texture_sizes([16, 24])
        .artifacts([ArtifactKind::Textures, ArtifactKind::Sprites, ArtifactKind::Fonts])
        .build()
}

fn snapshot(root: &Path) -> BTreeMap<PathBuf, (Vec<u8>, SystemTime)> {
    let mut out = BTreeMap::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let meta = fs::metadata(&path).unwrap();
                out.insert(path.clone(), (fs::read(&path).unwrap(), meta.modified().unwrap()));
            }
        }
    }
    out
}

#[test]
fn second_build_modifies_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let builder = AtlasBuilder::new(config(), tmp.path()).unwrap();
    let src = source();

    let first = builder.build_images(&src, |_| true).unwrap();
    assert!(first.failed.is_empty(), "{:?}", first.failed);
    // 3 kinds x 3 tiers x 2 sizes
    assert_eq!(first.written, 18);
    assert_eq!(builder.write_resource_manifest().unwrap(), 6);
    let before = snapshot(tmp.path());

    let second = builder.build_images(&src, |_| true).unwrap();
    assert_eq!(second.written, 0);
    assert_eq!(second.skipped_existing, 18);
    builder.write_resource_manifest().unwrap();
    let after = snapshot(tmp.path());

    assert_eq!(before.keys().collect::<Vec<_>>(), after.keys().collect::<Vec<_>>());
    for (path, (bytes, mtime)) in &before {
        let (bytes2, mtime2) = &after[path];
        assert_eq!(bytes, bytes2, "{} changed", path.display());
        assert_eq!(mtime, mtime2, "{} rewritten", path.display());
    }
}

#[test]
fn artifacts_land_in_their_folders() {
    let tmp = tempfile::tempdir().unwrap();
    let builder = AtlasBuilder::new(config(), tmp.path()).unwrap();
    builder.build_images(&source(), |_| true).unwrap();
    builder.write_resource_manifest().unwrap();
    let root = tmp.path();

    let tex = root.join("Texture Sheets/Lite/16").join(CATEGORY);
    assert!(tex.join("emj_spr_smileysEmotion_lite_16.png").is_file());
    assert!(tex.join("emj_spr_smileysEmotion_lite_16.json").is_file());
    let gml = fs::read_to_string(tex.join("emj_lt_smileysEmotion_lite_16.gml")).unwrap();
    assert!(gml.contains("function emj_lt_smileysEmotion_lite_16()"));

    // Lite admits 1f600, 1f601 and 1f602 only.
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tex.join("emj_spr_smileysEmotion_lite_16.json")).unwrap())
            .unwrap();
    assert_eq!(json.as_object().unwrap().len(), 3);

    let sprites = root.join("Sprites/Deluxe").join(CATEGORY);
    assert!(sprites.join("__emj_smileysEmotion_deluxe_24.png").is_file());
    assert!(sprites.join("3x2_6.txt").is_file());
    let meta: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(sprites.join("metadata.json")).unwrap()).unwrap();
    // Sorted by tier: Lite keys first.
    assert_eq!(meta["😀"], 0);
    assert_eq!(meta["👩\u{200d}🚒"], 5);
    let script = fs::read_to_string(sprites.join("lookup.gml")).unwrap();
    assert!(script.starts_with("function __emoji_lookup_smileysEmotion_deluxe() {\n"));
    assert!(script.contains(r#"static __ = json_parse("{\"\\ud83d\\ude00\":0,"#));
    assert!(script.trim_end().ends_with("return __;\n}"));
    let strip = image::open(sprites.join("__emj_smileysEmotion_deluxe_24.png")).unwrap();
    assert_eq!((strip.width(), strip.height()), (3 * 26, 2 * 26));

    let fonts = root.join("GMFonts/Full").join(CATEGORY);
    let yy: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(fonts.join("__emj_fnt_smileysEmotion_full_16.yy")).unwrap(),
    )
    .unwrap();
    assert_eq!(yy["resourceType"], "GMFont");
    assert_eq!(yy["glyphs"].as_array().unwrap().len(), 4);
    let lookup: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(fonts.join("lookup.json")).unwrap()).unwrap();
    assert_eq!(lookup["😀"], 34);

    let order = fs::read_to_string(root.join("GMFonts/resource_order.txt")).unwrap();
    let first = order.lines().next().unwrap();
    assert!(first.starts_with(r#"{"name":"__emj_fnt_smileysEmotion_deluxe_16","order":0,"#));
    assert_eq!(order.lines().count(), 6);
}

#[test]
fn exhausted_font_unit_fails_without_files() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = BuildConfig::builder()
        .texture_sizes([16])
        .tiers([Tier::Deluxe])
        .artifacts([ArtifactKind::Fonts])
        .font_offset(0xFFF0)
        .build();
    let builder = AtlasBuilder::new(cfg, tmp.path()).unwrap();
    let report = builder.build_images(&source(), |_| true).unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].kind, ArtifactKind::Fonts);
    assert_eq!((report.failed[0].tier, report.failed[0].size), (Tier::Deluxe, 16));
    assert_eq!(report.written, 0);
    assert!(
        !tmp.path()
            .join("GMFonts/Deluxe")
            .join(CATEGORY)
            .join("__emj_fnt_smileysEmotion_deluxe_16.png")
            .exists()
    );
}

#[test]
fn oversized_texture_unit_reports_capacity() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = BuildConfig::builder()
        .texture_sizes([32])
        .tiers([Tier::Lite])
        .artifacts([ArtifactKind::Textures])
        .atlas_size_range(8, 16)
        .build();
    let builder = AtlasBuilder::new(cfg, tmp.path()).unwrap();
    let report = builder.build_images(&source(), |_| true).unwrap();
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].reason.contains("capacity"));
}

#[test]
fn empty_and_filtered_categories_are_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let builder = AtlasBuilder::new(config(), tmp.path()).unwrap();
    let src = source()
        .with_category("Empty", Vec::new())
        .with_category("Invisible", vec![SourceImage::new(GlyphKey::from_char('★'), RgbaImage::new(8, 8))]);
    let report = builder.build_images(&src, |c| c != CATEGORY).unwrap();
    assert_eq!(report.written, 0);
    assert_eq!(report.skipped_empty, 2);
    assert!(report.failed.is_empty());
}

#[test]
fn unreadable_category_is_skipped_not_failed() {
    let tmp = tempfile::tempdir().unwrap();
    let builder = AtlasBuilder::new(config(), tmp.path()).unwrap();
    let report = builder
        .build_category("BrokenFont", || {
            Err(AtlasError::Font("BrokenFont.ttf: invalid table".into()))
        })
        .unwrap();
    assert_eq!(report.skipped_empty, 1);
    assert_eq!(report.written, 0);
    assert!(!report.has_failures());
    assert!(!tmp.path().join("GMFonts").exists());
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = BuildConfig::builder().texture_sizes(Vec::<u32>::new()).build();
    assert!(AtlasBuilder::new(cfg, "unused").is_err());
    let cfg = BuildConfig::builder().outlier_percentile(0.0).build();
    assert!(AtlasBuilder::new(cfg, "unused").is_err());
}
