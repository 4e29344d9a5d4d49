use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use emoji_atlas_core::config::ArtifactKind;
use emoji_atlas_core::tier::Composition;
use emoji_atlas_core::{
    AtlasBuilder, BuildConfig, BuildReport, GlyphKey, ImageSource, SourceImage, Tier,
};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use tracing::{error, info, warn};

mod source;
use source::DirImageSource;

#[derive(Parser, Debug)]
#[command(
    name = "emoji-atlas",
    about = "Build emoji texture sheets, sprite strips and bitmap fonts",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress=false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build every artifact kind (restrict with --no-textures/--no-sprites/--no-fonts)
    Build(BuildArgs),
    /// Bin-packed texture sheets with lookup scripts only
    Textures(BuildArgs),
    /// Uniform grid sprite strips only
    Sprites(BuildArgs),
    /// Bitmap font sheets, descriptors and the resource manifest only
    Fonts(BuildArgs),
    /// Print tier classification of keys given as hex file stems
    Classify(ClassifyArgs),
    /// Print the merged configuration (after CLI/YAML) and exit
    PrintConfig(PrintConfigArgs),
}

#[derive(Parser, Debug, Clone)]
struct BuildArgs {
    // Input/Output
    /// Directory of category sub-directories holding hex-named PNGs
    #[arg(long, default_value = "png", help_heading = "Input/Output")]
    png_dir: PathBuf,
    /// Directory of .ttf/.otf fonts; each font becomes one category
    #[arg(long, help_heading = "Input/Output")]
    fonts_dir: Option<PathBuf>,
    /// Output root
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// YAML config file path (its values override the options below)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only categories matching any pattern are built
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Categories matching any pattern are ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Layout
    /// Output sizes in pixels
    #[arg(long, value_delimiter = ',', default_value = "16,24,32", help_heading = "Layout")]
    sizes: Vec<u32>,
    /// Tiers to build: deluxe,full,lite
    #[arg(long, value_delimiter = ',', default_value = "deluxe,full,lite", help_heading = "Layout")]
    tiers: Vec<String>,
    /// Padding around every packed glyph
    #[arg(long, default_value_t = 1, help_heading = "Layout")]
    padding: u32,
    /// Largest atlas side the shelf packer may grow to
    #[arg(long, default_value_t = 8192, help_heading = "Layout")]
    max_atlas_size: u32,

    // Image Processing
    /// Alpha above this counts as opaque (0..=255)
    #[arg(long, default_value_t = 127, help_heading = "Image Processing")]
    alpha_threshold: u8,
    /// Bounding boxes above this percentile are ignored for the shared crop
    #[arg(long, default_value_t = 95.0, help_heading = "Image Processing")]
    outlier_percentile: f64,

    // Fonts
    /// Font glyph codes start just above this value
    #[arg(long, default_value_t = 33, help_heading = "Fonts")]
    font_offset: u32,
    /// Emit a zero-sized space glyph at code 32
    #[arg(long, default_value_t = false, help_heading = "Fonts")]
    font_include_space: bool,

    // Artifacts (build only)
    #[arg(long, default_value_t = false, help_heading = "Artifacts")]
    no_textures: bool,
    #[arg(long, default_value_t = false, help_heading = "Artifacts")]
    no_sprites: bool,
    #[arg(long, default_value_t = false, help_heading = "Artifacts")]
    no_fonts: bool,
}

#[derive(Parser, Debug, Clone)]
struct ClassifyArgs {
    /// Keys as hex file stems, e.g. 1f469-200d-1f692
    #[arg(required = true)]
    keys: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
struct PrintConfigArgs {
    #[command(flatten)]
    build: BuildArgs,
    /// Output format: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"])]
    format: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let progress = cli.progress && !cli.quiet;
    match &cli.command {
        Commands::Build(args) => {
            let mut kinds = Vec::new();
            if !args.no_textures {
                kinds.push(ArtifactKind::Textures);
            }
            if !args.no_sprites {
                kinds.push(ArtifactKind::Sprites);
            }
            if !args.no_fonts {
                kinds.push(ArtifactKind::Fonts);
            }
            run_build(args, kinds, progress)
        }
        Commands::Textures(args) => run_build(args, vec![ArtifactKind::Textures], progress),
        Commands::Sprites(args) => run_build(args, vec![ArtifactKind::Sprites], progress),
        Commands::Fonts(args) => run_build(args, vec![ArtifactKind::Fonts], progress),
        Commands::Classify(args) => run_classify(args),
        Commands::PrintConfig(args) => {
            let all = vec![
                ArtifactKind::Textures,
                ArtifactKind::Sprites,
                ArtifactKind::Fonts,
            ];
            let cfg = build_config(&args.build, all)?;
            match args.format.as_str() {
                "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
                _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
            }
            Ok(())
        }
    }
}

fn run_build(args: &BuildArgs, kinds: Vec<ArtifactKind>, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(args, kinds)?;
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create out_dir {}", args.out_dir.display()))?;
    let builder = AtlasBuilder::new(cfg, &args.out_dir)?;
    let filter = CategoryFilter::new(&args.include, &args.exclude)?;

    let mut report = BuildReport::default();
    let pngs = DirImageSource::new(&args.png_dir);
    if pngs.exists() {
        let categories: Vec<String> = pngs
            .categories()?
            .into_iter()
            .filter(|c| filter.accepts(c))
            .collect();
        info!(count = categories.len(), dir = %args.png_dir.display(), "image categories");
        report.merge(build_with_progress(
            &builder,
            &categories,
            |c| pngs.load(c),
            show_progress,
        )?);
    } else {
        warn!(dir = %args.png_dir.display(), "png directory not found; skipping image categories");
    }

    if let Some(dir) = &args.fonts_dir {
        report.merge(build_fonts(&builder, dir, &filter, show_progress)?);
    }

    if builder.config().wants(ArtifactKind::Fonts) {
        let listed = builder
            .write_resource_manifest()
            .context("write resource manifest")?;
        info!(descriptors = listed, "resource manifest up to date");
    }

    info!(
        written = report.written,
        skipped_existing = report.skipped_existing,
        skipped_empty = report.skipped_empty,
        failed = report.failed.len(),
        "build finished"
    );
    if report.has_failures() {
        for f in &report.failed {
            error!("{f}");
        }
        anyhow::bail!("{} build unit(s) failed", report.failed.len());
    }
    Ok(())
}

#[cfg(feature = "font")]
fn build_fonts(
    builder: &AtlasBuilder,
    dir: &Path,
    filter: &CategoryFilter,
    show_progress: bool,
) -> anyhow::Result<BuildReport> {
    use emoji_atlas_core::GlyphSource;
    use emoji_atlas_core::font_source::FontGlyphSource;

    let fonts = FontGlyphSource::from_config(dir, builder.config())
        .with_context(|| format!("read fonts dir {}", dir.display()))?;
    let categories: Vec<String> = fonts
        .categories()?
        .into_iter()
        .filter(|c| filter.accepts(c))
        .collect();
    info!(count = categories.len(), dir = %dir.display(), "font categories");
    build_with_progress(builder, &categories, |c| fonts.load(c), show_progress)
}

#[cfg(not(feature = "font"))]
fn build_fonts(
    _builder: &AtlasBuilder,
    dir: &Path,
    _filter: &CategoryFilter,
    _show_progress: bool,
) -> anyhow::Result<BuildReport> {
    warn!(dir = %dir.display(), "built without the `font` feature; ignoring --fonts-dir");
    Ok(BuildReport::default())
}

fn build_with_progress<F>(
    builder: &AtlasBuilder,
    categories: &[String],
    load: F,
    progress: bool,
) -> anyhow::Result<BuildReport>
where
    F: Fn(&str) -> emoji_atlas_core::Result<Vec<SourceImage>>,
{
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(categories.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} building {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut report = BuildReport::default();
    for category in categories {
        if let Some(b) = &bar {
            b.set_message(category.clone());
        }
        let r = builder
            .build_category(category, || load(category.as_str()))
            .with_context(|| format!("build category {category}"))?;
        report.merge(r);
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(report)
}

fn run_classify(args: &ClassifyArgs) -> anyhow::Result<()> {
    for stem in &args.keys {
        let key = GlyphKey::from_file_stem(stem)?;
        let tier = Tier::classify(&key);
        let c = Composition::of(&key);
        let admitted: Vec<&str> = Tier::ALL
            .iter()
            .filter(|t| t.admits(&key))
            .map(|t| t.as_str())
            .collect();
        println!(
            "{}\t{}\ttier={} weight={} zwj={} skin_tone={} len={} admitted_by={}",
            key.file_stem(),
            key,
            tier,
            tier.weight(),
            c.has_zwj,
            c.has_skin_tone,
            c.len,
            admitted.join(",")
        );
    }
    Ok(())
}

/// Glob filter over category names.
struct CategoryFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl CategoryFilter {
    fn new(include: &[String], exclude: &[String]) -> anyhow::Result<Self> {
        Ok(Self {
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
        })
    }

    fn accepts(&self, name: &str) -> bool {
        if let Some(ex) = &self.exclude {
            if ex.is_match(name) {
                return false;
            }
        }
        if let Some(inc) = &self.include {
            if !inc.is_match(name) {
                return false;
            }
        }
        true
    }
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("invalid glob {pat}"))?);
    }
    Ok(Some(b.build()?))
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

/// CLI values first, then YAML on top, then validation.
fn build_config(args: &BuildArgs, artifacts: Vec<ArtifactKind>) -> anyhow::Result<BuildConfig> {
    let tiers = args
        .tiers
        .iter()
        .map(|t| {
            t.parse::<Tier>()
                .map_err(|_| anyhow::anyhow!("unknown tier: {}", t))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let mut cfg = BuildConfig::builder()
        .texture_sizes(args.sizes.clone())
        .tiers(tiers)
        .artifacts(artifacts)
        .padding(args.padding)
        .alpha_threshold(args.alpha_threshold)
        .outlier_percentile(args.outlier_percentile)
        .atlas_size_range(BuildConfig::default().min_atlas_size, args.max_atlas_size)
        .font_offset(args.font_offset)
        .font_include_space(args.font_include_space)
        .build();
    if let Some(path) = &args.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg = y.apply(cfg);
    }
    cfg.validate()?;
    Ok(cfg)
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    texture_sizes: Option<Vec<u32>>,
    tiers: Option<Vec<Tier>>,
    artifacts: Option<Vec<ArtifactKind>>,
    padding: Option<u32>,
    alpha_threshold: Option<u8>,
    outlier_percentile: Option<f64>,
    min_atlas_size: Option<u32>,
    max_atlas_size: Option<u32>,
    font_offset: Option<u32>,
    font_include_space: Option<bool>,
    font_parent_name: Option<String>,
    font_parent_path: Option<String>,
    glyph_render_px: Option<f32>,
    glyph_outlier_percentile: Option<f64>,
    glyph_significance: Option<f64>,
}

impl YamlConfig {
    fn apply(self, mut cfg: BuildConfig) -> BuildConfig {
        if let Some(v) = self.texture_sizes {
            cfg.texture_sizes = v;
        }
        if let Some(v) = self.tiers {
            cfg.tiers = v;
        }
        if let Some(v) = self.artifacts {
            cfg.artifacts = v;
        }
        if let Some(v) = self.padding {
            cfg.padding = v;
        }
        if let Some(v) = self.alpha_threshold {
            cfg.alpha_threshold = v;
        }
        if let Some(v) = self.outlier_percentile {
            cfg.outlier_percentile = v;
        }
        if let Some(v) = self.min_atlas_size {
            cfg.min_atlas_size = v;
        }
        if let Some(v) = self.max_atlas_size {
            cfg.max_atlas_size = v;
        }
        if let Some(v) = self.font_offset {
            cfg.font_offset = v;
        }
        if let Some(v) = self.font_include_space {
            cfg.font_include_space = v;
        }
        if let Some(v) = self.font_parent_name {
            cfg.font_parent_name = v;
        }
        if let Some(v) = self.font_parent_path {
            cfg.font_parent_path = v;
        }
        if let Some(v) = self.glyph_render_px {
            cfg.glyph_render_px = v;
        }
        if let Some(v) = self.glyph_outlier_percentile {
            cfg.glyph_outlier_percentile = v;
        }
        if let Some(v) = self.glyph_significance {
            cfg.glyph_significance = v;
        }
        cfg
    }
}
