use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use emoji_atlas_core::{GlyphKey, ImageSource, Result, SourceImage};
use image::ImageReader;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Pre-rendered PNG directory: one sub-directory per category, files named
/// by hex codepoints (`1f469-200d-1f692.png`).
#[derive(Debug, Clone)]
pub struct DirImageSource {
    root: PathBuf,
}

impl DirImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }
}

impl ImageSource for DirImageSource {
    fn categories(&self) -> Result<Vec<String>> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = fs::read_dir(&self.root)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    fn load(&self, category: &str) -> Result<Vec<SourceImage>> {
        let dir = self.root.join(category);
        let mut images = Vec::new();
        let mut seen = HashSet::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if !p.is_file() || !is_png(p) {
                continue;
            }
            let Some(stem) = p.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let key = match GlyphKey::from_file_stem(stem) {
                Ok(k) => k,
                Err(e) => {
                    warn!(?p, error = %e, "skip file: name is not a codepoint sequence");
                    continue;
                }
            };
            // 1f600.png, 1F600.png and 01f600.png name the same key.
            if seen.contains(&key) {
                warn!(?p, key = %key.escaped(), "skip file: duplicate key in category");
                continue;
            }
            match decode(p) {
                Ok(rgba) => {
                    seen.insert(key.clone());
                    images.push(SourceImage::new(key, rgba));
                }
                Err(e) => warn!(?p, error = %e, "skip image"),
            }
        }
        debug!(category, count = images.len(), "loaded category");
        Ok(images)
    }
}

fn is_png(p: &Path) -> bool {
    p.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

fn decode(p: &Path) -> anyhow::Result<image::RgbaImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(path: &Path) {
        RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn unusable_files_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("Smileys");
        fs::create_dir_all(&dir).unwrap();
        write_png(&dir.join("1f600.png"));
        write_png(&dir.join("smile.png"));
        fs::write(dir.join("1f601.png"), b"not a png").unwrap();
        fs::write(dir.join("1f602.txt"), b"notes").unwrap();

        let src = DirImageSource::new(tmp.path());
        assert_eq!(src.categories().unwrap(), vec!["Smileys".to_string()]);
        let images = src.load("Smileys").unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].key, GlyphKey::from_char('\u{1F600}'));
        assert_eq!(images[0].rgba.dimensions(), (4, 4));
    }

    #[test]
    fn stems_naming_the_same_key_load_once() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("Smileys");
        fs::create_dir_all(&dir).unwrap();
        for stem in ["1f600", "1F600", "01f600", "1f601"] {
            write_png(&dir.join(format!("{stem}.png")));
        }

        let images = DirImageSource::new(tmp.path()).load("Smileys").unwrap();
        let keys: Vec<_> = images.iter().map(|s| s.key.clone()).collect();
        assert_eq!(
            keys,
            vec![GlyphKey::from_char('\u{1F600}'), GlyphKey::from_char('\u{1F601}')]
        );
    }

    #[test]
    fn missing_root_has_no_categories() {
        let src = DirImageSource::new("/nonexistent/png");
        assert!(!src.exists());
        assert!(src.categories().unwrap().is_empty());
    }
}
