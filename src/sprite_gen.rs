use crate::label_font::LabelFont;
use crate::manifest::{ManifestEntry, ManifestFile};
use crate::sprite_table::{check_dimensions, SpriteSpec, SpriteTable};
use anyhow::{bail, Context, Result};
use image::{
    codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder},
    ColorType, ImageEncoder, Rgba, RgbaImage,
};
use std::{
    fs::{create_dir_all, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Border and label color
pub const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Border thickness in pixels, measured inward from the canvas edge
pub const BORDER_WIDTH: u32 = 2;

/// Options for a batch run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub output: PathBuf,
    pub font: Option<PathBuf>,
    pub keep_going: bool,
    pub strict: bool,
    pub manifest: bool,
}

/// Outcome of a batch run. Paths are relative to the output directory.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub created: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl GenerationReport {
    pub fn attempted(&self) -> usize {
        self.created.len() + self.failed.len()
    }
}

/// Render a placeholder sprite in memory: a filled canvas, a black border
/// and the label centered on its ink bounding box.
pub fn render_sprite(
    width: u32,
    height: u32,
    label: &str,
    background: [u8; 4],
    font: &LabelFont,
) -> Result<RgbaImage> {
    check_dimensions(width, height)?;

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba(background));
    draw_border(&mut canvas, BORDER_WIDTH, INK);

    if let Some((x, y)) = label_origin(font, label, width, height) {
        font.draw(&mut canvas, label, x, y, INK);
    }

    Ok(canvas)
}

/// Render a sprite and write it to `path` as PNG, creating parent directories
pub fn render(
    path: &Path,
    width: u32,
    height: u32,
    label: &str,
    background: [u8; 4],
    font: &LabelFont,
) -> Result<()> {
    let canvas = render_sprite(width, height, label, background, font)?;
    write_png(&canvas, path)
}

/// Paint a solid frame `thickness` pixels wide along the outermost edge
pub fn draw_border(canvas: &mut RgbaImage, thickness: u32, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();

    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        if is_border_pixel(x, y, width, height, thickness) {
            *pixel = color;
        }
    }
}

fn is_border_pixel(x: u32, y: u32, width: u32, height: u32, thickness: u32) -> bool {
    x < thickness
        || y < thickness
        || x >= width.saturating_sub(thickness)
        || y >= height.saturating_sub(thickness)
}

/// Top-left draw origin that centers the label's ink on the canvas.
/// Returns `None` for labels that leave no ink (empty or whitespace).
pub fn label_origin(font: &LabelFont, label: &str, width: u32, height: u32) -> Option<(i32, i32)> {
    let bounds = font.measure(label)?;
    let x = (width as i32 - bounds.width()).div_euclid(2) - bounds.min_x;
    let y = (height as i32 - bounds.height()).div_euclid(2) - bounds.min_y;
    Some((x, y))
}

/// True when every pixel of the `thickness`-wide frame equals the border ink
pub fn border_is_intact(image: &RgbaImage, thickness: u32) -> bool {
    let (width, height) = image.dimensions();
    image
        .enumerate_pixels()
        .filter(|(x, y, _)| is_border_pixel(*x, *y, width, height, thickness))
        .all(|(_, _, pixel)| *pixel == INK)
}

/// Encode an RGBA canvas as PNG at `path`, overwriting any existing file
pub fn write_png(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)
            .with_context(|| format!("Can't create directory {}", parent.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create PNG file {}", path.display()))?;
    let mut out_file = BufWriter::new(file);
    let encoder =
        PngEncoder::new_with_quality(&mut out_file, CompressionType::Default, PngFilterType::Adaptive);
    encoder
        .write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)
        .with_context(|| format!("Failed to write PNG {}", path.display()))?;
    out_file.flush()?;

    Ok(())
}

/// Render every sprite in `table` under `options.output`, in table order
pub fn generate_sprites(table: &SpriteTable, options: &GenerateOptions) -> Result<GenerationReport> {
    table.validate()?;

    let collisions = table.collisions();
    if !collisions.is_empty() {
        let paths: Vec<String> = collisions.iter().map(|c| c.relative_path()).collect();
        if options.strict {
            bail!(
                "Sprite table has duplicate output paths: {}",
                paths.join(", ")
            );
        }
        for collision in &collisions {
            println!(
                "⚠ {} is declared {} times; the last entry wins",
                collision.relative_path(),
                collision.count
            );
        }
    }

    println!("Creating placeholder sprites...");

    create_dir_all(&options.output)
        .with_context(|| format!("Can't create directory {}", options.output.display()))?;

    let font = LabelFont::load(options.font.as_deref());
    println!("Using font: {}", font.describe());

    let mut report = GenerationReport::default();
    let mut manifest = ManifestFile::new(font.describe());

    for category in &table.categories {
        let category_dir = options.output.join(&category.name);
        if let Err(err) = create_dir_all(&category_dir)
            .with_context(|| format!("Can't create directory {}", category_dir.display()))
        {
            if !options.keep_going {
                return Err(match category.sprites.first() {
                    Some(spec) => err.context(format!(
                        "Failed to generate {}/{}",
                        category.name, spec.filename
                    )),
                    None => err,
                });
            }
            for spec in &category.sprites {
                record_failure(&mut report, &category.name, spec, &err);
            }
            continue;
        }

        for spec in &category.sprites {
            let relative = Path::new(&category.name).join(&spec.filename);
            let result = render(
                &options.output.join(&relative),
                spec.width,
                spec.height,
                &spec.label,
                spec.color,
                &font,
            )
            .with_context(|| format!("Failed to generate {}/{}", category.name, spec.filename));

            match result {
                Ok(()) => {
                    println!("✓ Created {}/{}", category.name, spec.filename);
                    manifest.add_sprite(ManifestEntry::new(&category.name, spec));
                    report.created.push(relative);
                }
                Err(err) if options.keep_going => {
                    record_failure(&mut report, &category.name, spec, &err);
                }
                Err(err) => return Err(err),
            }
        }
    }

    if options.manifest {
        manifest.write(&options.output)?;
        println!("✓ Generated manifest.json");
    }

    println!();
    if report.failed.is_empty() {
        println!("All placeholder sprites created!");
    } else {
        println!(
            "{} of {} sprites failed",
            report.failed.len(),
            report.attempted()
        );
    }
    println!("Total sprites: {}", report.created.len());
    println!();
    println!("Note: These are placeholders. Replace with actual sprites from:");
    println!("  - Kenney.nl (https://kenney.nl/assets)");
    println!("  - Game-Icons.net (https://game-icons.net)");

    Ok(report)
}

fn record_failure(
    report: &mut GenerationReport,
    category: &str,
    spec: &SpriteSpec,
    err: &anyhow::Error,
) {
    eprintln!("✗ Failed {}/{}: {:#}", category, spec.filename, err);
    report
        .failed
        .push((Path::new(category).join(&spec.filename), format!("{:#}", err)));
}
