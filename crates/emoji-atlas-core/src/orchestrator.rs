//! Drives every (category, tier, size) build unit from loaded source images
//! to files on disk.
//!
//! Output layout below the output root:
//!
//! ```text
//! Texture Sheets/<Tier>/<size>/<category>/emj_spr_<slug>_<tier>_<size>.{png,json}
//!                                         emj_lt_<slug>_<tier>_<size>.gml
//! Sprites/<Tier>/<category>/__emj_<slug>_<tier>_<size>.png, metadata.json, lookup.gml, <c>x<r>_<n>.txt
//! GMFonts/<Tier>/<category>/__emj_fnt_<slug>_<tier>_<size>.{png,yy}, lookup.json
//! GMFonts/resource_order.txt, GMFonts/resources.txt
//! ```

use crate::bounds::{BoundingBox, all_image_bounds, global_bounds};
use crate::config::{ArtifactKind, BuildConfig};
use crate::error::{AtlasError, Result};
use crate::export::{
    glyph_codes_to_json, grid_index_to_json, layout_hint_to_json, placements_to_json,
    write_if_changed, write_png,
};
use crate::export_font::{FontDescriptor, ResourceManifest, ResourceRef, scan_font_descriptors};
use crate::export_script::{
    SheetNames, render_lookup_script, render_sprite_lookup_script, sprite_lookup_function,
};
use crate::glyph_index::GlyphIndexAllocator;
use crate::key::category_slug;
use crate::normalize::{center_crop, resize_square, scale_to_reference, tight_crop};
use crate::packer::grid::GridPacker;
use crate::packer::shelf::ShelfPacker;
use crate::packer::{PackItem, PackedSheet, Placements, SheetPacker};
use crate::source::{GlyphSource, ImageSource, SourceImage};
use crate::tier::{Tier, sort_by_tier};
use image::RgbaImage;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Where the artifacts of one build go.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub root: PathBuf,
}

impl OutputPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn texture_dir(&self, tier: Tier, size: u32, category: &str) -> PathBuf {
        self.root
            .join("Texture Sheets")
            .join(tier.dir_name())
            .join(size.to_string())
            .join(category)
    }

    pub fn sprite_dir(&self, tier: Tier, category: &str) -> PathBuf {
        self.root.join("Sprites").join(tier.dir_name()).join(category)
    }

    pub fn fonts_root(&self) -> PathBuf {
        self.root.join("GMFonts")
    }

    pub fn font_dir(&self, tier: Tier, category: &str) -> PathBuf {
        self.fonts_root().join(tier.dir_name()).join(category)
    }

    /// Image file whose presence marks the unit as already built.
    pub fn target_png(&self, kind: ArtifactKind, category: &str, tier: Tier, size: u32) -> PathBuf {
        let slug = category_slug(category);
        match kind {
            ArtifactKind::Textures => self
                .texture_dir(tier, size, category)
                .join(format!("{}.png", SheetNames::new(&slug, tier.as_str(), size).sprite)),
            ArtifactKind::Sprites => self
                .sprite_dir(tier, category)
                .join(format!("__emj_{slug}_{tier}_{size}.png")),
            ArtifactKind::Fonts => self
                .font_dir(tier, category)
                .join(format!("{}.png", font_resource_name(&slug, tier, size))),
        }
    }
}

fn font_resource_name(slug: &str, tier: Tier, size: u32) -> String {
    format!("__emj_fnt_{slug}_{tier}_{size}")
}

/// A build unit that could not be produced: the atlas outgrew
/// `max_atlas_size` or the font ran out of character codes.
#[derive(Debug, Clone)]
pub struct FailedUnit {
    pub category: String,
    pub tier: Tier,
    pub size: u32,
    pub kind: ArtifactKind,
    pub reason: String,
}

impl fmt::Display for FailedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{} ({:?}): {}",
            self.category, self.tier, self.size, self.kind, self.reason
        )
    }
}

/// Outcome counters for one or more categories.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Units whose image was written in this run.
    pub written: usize,
    /// Units skipped because their image already existed.
    pub skipped_existing: usize,
    /// Units or categories skipped because nothing was left to pack,
    /// including categories whose provider failed to load.
    pub skipped_empty: usize,
    pub failed: Vec<FailedUnit>,
}

impl BuildReport {
    pub fn merge(&mut self, other: BuildReport) {
        self.written += other.written;
        self.skipped_existing += other.skipped_existing;
        self.skipped_empty += other.skipped_empty;
        self.failed.extend(other.failed);
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Per-category working set shared by all tiers and sizes.
struct CategorySet {
    images: Vec<SourceImage>,
    tight: Vec<RgbaImage>,
    centered: Vec<RgbaImage>,
    /// Center-cropped set resized per output size, built on first use.
    resized: BTreeMap<u32, Vec<RgbaImage>>,
}

impl CategorySet {
    fn square(&mut self, size: u32) -> &[RgbaImage] {
        let centered = &self.centered;
        self.resized
            .entry(size)
            .or_insert_with(|| centered.iter().map(|img| resize_square(img, size)).collect())
    }
}

pub struct AtlasBuilder {
    cfg: BuildConfig,
    paths: OutputPaths,
}

impl AtlasBuilder {
    pub fn new(cfg: BuildConfig, out_dir: impl Into<PathBuf>) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            paths: OutputPaths::new(out_dir),
        })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.cfg
    }

    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }

    fn kinds(&self) -> impl Iterator<Item = ArtifactKind> + '_ {
        [ArtifactKind::Textures, ArtifactKind::Sprites, ArtifactKind::Fonts]
            .into_iter()
            .filter(|k| self.cfg.wants(*k))
    }

    /// True when every unit of `category` already has its image on disk.
    pub fn all_targets_exist(&self, category: &str) -> bool {
        self.kinds().all(|kind| {
            self.cfg.tiers.iter().all(|&tier| {
                self.cfg
                    .texture_sizes
                    .iter()
                    .all(|&size| self.paths.target_png(kind, category, tier, size).exists())
            })
        })
    }

    /// Build every category of an image provider accepted by `filter`.
    pub fn build_images(
        &self,
        src: &dyn ImageSource,
        filter: impl Fn(&str) -> bool,
    ) -> Result<BuildReport> {
        let mut report = BuildReport::default();
        for category in src.categories()?.iter().filter(|c| filter(c)) {
            report.merge(self.build_category(category, || src.load(category))?);
        }
        Ok(report)
    }

    /// Build every font category of a glyph provider accepted by `filter`.
    pub fn build_glyphs(
        &self,
        src: &dyn GlyphSource,
        filter: impl Fn(&str) -> bool,
    ) -> Result<BuildReport> {
        let mut report = BuildReport::default();
        for category in src.categories()?.iter().filter(|c| filter(c)) {
            report.merge(self.build_category(category, || src.load(category))?);
        }
        Ok(report)
    }

    /// Build all units of one category. `load` is only called when at least
    /// one unit is missing; a load error skips the category with a warning.
    /// Failures of single units are reported, not returned; I/O errors
    /// while writing propagate.
    #[instrument(skip_all, fields(category = %category))]
    pub fn build_category<F>(&self, category: &str, load: F) -> Result<BuildReport>
    where
        F: FnOnce() -> Result<Vec<SourceImage>>,
    {
        let mut report = BuildReport::default();
        if self.all_targets_exist(category) {
            debug!(category, "all outputs exist; skipping");
            report.skipped_existing += self.unit_count();
            return Ok(report);
        }

        let mut images = match load() {
            Ok(images) => images,
            Err(e) => {
                warn!(category, error = %e, "failed to load category; skipping");
                report.skipped_empty += 1;
                return Ok(report);
            }
        };
        if images.is_empty() {
            warn!(category, "no images; skipping category");
            report.skipped_empty += 1;
            return Ok(report);
        }

        sort_by_tier(&mut images, |s| &s.key);
        let boxes = all_image_bounds(images.iter().map(|s| &s.rgba), self.cfg.alpha_threshold);
        let Some(bound) = global_bounds(&boxes, self.cfg.outlier_percentile) else {
            warn!(category, "no opaque pixels in any image; skipping category");
            report.skipped_empty += 1;
            return Ok(report);
        };
        debug!(
            category,
            width = bound.width,
            height = bound.height,
            "global crop bound"
        );

        let mut set = self.prepare(images, &boxes, &bound);
        for &tier in &self.cfg.tiers {
            let admitted: Vec<usize> = (0..set.images.len())
                .filter(|&i| tier.admits(&set.images[i].key))
                .collect();
            for &size in &self.cfg.texture_sizes {
                for kind in self.kinds() {
                    if self.paths.target_png(kind, category, tier, size).exists() {
                        debug!(category, %tier, size, ?kind, "exists; skipping");
                        report.skipped_existing += 1;
                        continue;
                    }
                    if admitted.is_empty() {
                        debug!(category, %tier, size, ?kind, "nothing admitted; skipping");
                        report.skipped_empty += 1;
                        continue;
                    }
                    let outcome = match kind {
                        ArtifactKind::Textures => {
                            self.write_texture_sheet(category, tier, size, &set, &admitted)
                        }
                        ArtifactKind::Sprites => {
                            self.write_sprite_strip(category, tier, size, &mut set, &admitted)
                        }
                        ArtifactKind::Fonts => {
                            self.write_font_sheet(category, tier, size, &mut set, &admitted)
                        }
                    };
                    match outcome {
                        Ok(()) => report.written += 1,
                        Err(e @ (AtlasError::AtlasCapacity { .. }
                        | AtlasError::GlyphCodesExhausted { .. })) => {
                            warn!(category, %tier, size, ?kind, error = %e, "unit failed");
                            report.failed.push(FailedUnit {
                                category: category.to_string(),
                                tier,
                                size,
                                kind,
                                reason: e.to_string(),
                            });
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }
        info!(
            category,
            images = set.images.len(),
            written = report.written,
            "processed category"
        );
        Ok(report)
    }

    fn unit_count(&self) -> usize {
        self.kinds().count() * self.cfg.tiers.len() * self.cfg.texture_sizes.len()
    }

    fn prepare(
        &self,
        images: Vec<SourceImage>,
        boxes: &[Option<BoundingBox>],
        bound: &BoundingBox,
    ) -> CategorySet {
        let tight = if self.cfg.wants(ArtifactKind::Textures) {
            tight_crop(images.iter().map(|s| &s.rgba), boxes)
        } else {
            Vec::new()
        };
        let centered = if self.cfg.wants(ArtifactKind::Sprites) || self.cfg.wants(ArtifactKind::Fonts)
        {
            center_crop(images.iter().map(|s| &s.rgba), bound)
        } else {
            Vec::new()
        };
        CategorySet {
            images,
            tight,
            centered,
            resized: BTreeMap::new(),
        }
    }

    fn write_texture_sheet(
        &self,
        category: &str,
        tier: Tier,
        size: u32,
        set: &CategorySet,
        admitted: &[usize],
    ) -> Result<()> {
        let items: Vec<PackItem> = admitted
            .iter()
            .map(|&i| {
                let reference = set.images[i].rgba.height();
                PackItem::new(
                    set.images[i].key.clone(),
                    scale_to_reference(&set.tight[i], size, reference),
                )
            })
            .collect();
        let packer = ShelfPacker::new(
            self.cfg.padding,
            self.cfg.min_atlas_size,
            self.cfg.max_atlas_size,
        );
        let sheet = packer.pack(&items)?;
        let Placements::Rects(placements) = &sheet.placements else {
            return Err(AtlasError::InvalidInput(
                "shelf packer returned grid placements".into(),
            ));
        };

        let names = SheetNames::new(&category_slug(category), tier.as_str(), size);
        let dir = self.paths.texture_dir(tier, size, category);
        let script = render_lookup_script(&names, placements)?;
        let json = placements_to_json(placements)?;

        write_png(&dir.join(format!("{}.png", names.sprite)), &sheet.rgba)?;
        write_if_changed(&dir.join(format!("{}.gml", names.function)), script.as_bytes())?;
        write_if_changed(&dir.join(format!("{}.json", names.sprite)), json.as_bytes())?;
        log_sheet("texture sheet", category, tier, size, packer.name(), &sheet);
        Ok(())
    }

    fn write_sprite_strip(
        &self,
        category: &str,
        tier: Tier,
        size: u32,
        set: &mut CategorySet,
        admitted: &[usize],
    ) -> Result<()> {
        let sheet = self.pack_grid(size, set, admitted)?;
        let Placements::Grid { layout, keys } = &sheet.placements else {
            return Err(AtlasError::InvalidInput(
                "grid packer returned rect placements".into(),
            ));
        };
        let dir = self.paths.sprite_dir(tier, category);
        write_png(
            &self.paths.target_png(ArtifactKind::Sprites, category, tier, size),
            &sheet.rgba,
        )?;
        write_if_changed(&dir.join("metadata.json"), grid_index_to_json(keys)?.as_bytes())?;
        let function = sprite_lookup_function(&category_slug(category), tier.as_str());
        write_if_changed(
            &dir.join("lookup.gml"),
            render_sprite_lookup_script(&function, keys)?.as_bytes(),
        )?;
        write_if_changed(
            &dir.join(layout.hint_file_name()),
            layout_hint_to_json(layout)?.as_bytes(),
        )?;
        log_sheet("sprite strip", category, tier, size, "grid", &sheet);
        Ok(())
    }

    fn write_font_sheet(
        &self,
        category: &str,
        tier: Tier,
        size: u32,
        set: &mut CategorySet,
        admitted: &[usize],
    ) -> Result<()> {
        let sheet = self.pack_grid(size, set, admitted)?;
        let content = sheet.content_rects();
        let rects: Vec<_> = content.iter().map(|(_, r)| *r).collect();
        // Allocate before touching the disk so an exhausted range writes nothing.
        let records = GlyphIndexAllocator::new(self.cfg.font_offset, self.cfg.font_include_space)
            .allocate(&rects)?;
        let glyph_records = &records[records.len() - rects.len()..];
        let lookup: Vec<_> = content
            .iter()
            .zip(glyph_records)
            .map(|((key, _), rec)| ((*key).clone(), rec.character))
            .collect();

        let slug = category_slug(category);
        let name = font_resource_name(&slug, tier, size);
        let descriptor = FontDescriptor::new(
            &name,
            category,
            size,
            records,
            ResourceRef {
                name: self.cfg.font_parent_name.clone(),
                path: self.cfg.font_parent_path.clone(),
            },
        );
        let dir = self.paths.font_dir(tier, category);
        write_png(&dir.join(format!("{name}.png")), &sheet.rgba)?;
        write_if_changed(&dir.join(format!("{name}.yy")), descriptor.to_json()?.as_bytes())?;
        write_if_changed(&dir.join("lookup.json"), glyph_codes_to_json(&lookup)?.as_bytes())?;
        log_sheet("font sheet", category, tier, size, "grid", &sheet);
        Ok(())
    }

    fn pack_grid(&self, size: u32, set: &mut CategorySet, admitted: &[usize]) -> Result<PackedSheet> {
        let keys: Vec<_> = admitted.iter().map(|&i| set.images[i].key.clone()).collect();
        let squares = set.square(size);
        let items: Vec<PackItem> = admitted
            .iter()
            .zip(keys)
            .map(|(&i, key)| PackItem::new(key, squares[i].clone()))
            .collect();
        GridPacker::new(size, self.cfg.padding).pack(&items)
    }

    /// Regenerate the project manifest fragments from the font descriptors
    /// on disk. Returns how many descriptors are listed.
    pub fn write_resource_manifest(&self) -> Result<usize> {
        let root = self.paths.fonts_root();
        let names = scan_font_descriptors(&root, &self.cfg.tiers)?;
        if names.is_empty() {
            debug!("no font descriptors; manifest not written");
            return Ok(0);
        }
        let manifest = ResourceManifest::from_names(&names);
        write_manifest_file(&root.join("resource_order.txt"), &manifest.order)?;
        write_manifest_file(&root.join("resources.txt"), &manifest.resources)?;
        Ok(names.len())
    }
}

fn write_manifest_file(path: &Path, contents: &str) -> Result<()> {
    if write_if_changed(path, contents.as_bytes())? {
        info!(path = %path.display(), "saved resource manifest");
    }
    Ok(())
}

fn log_sheet(what: &str, category: &str, tier: Tier, size: u32, packer: &str, sheet: &PackedSheet) {
    let stats = sheet.stats();
    info!(
        category,
        %tier,
        size,
        packer,
        frames = stats.num_frames,
        occupancy = stats.occupancy,
        "wrote {what} {}x{}",
        stats.width,
        stats.height
    );
}
