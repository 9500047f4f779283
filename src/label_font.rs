//! Label font resolution, measurement and drawing
//!
//! A label is drawn with a TrueType font when one can be loaded, otherwise
//! with the built-in bitmap font. Loading never fails: each candidate path is
//! tried in turn and the bitmap font is the last resort.

use crate::bitmap_font;
use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use rusttype::{point, Font, PositionedGlyph, Scale};
use std::path::{Path, PathBuf};

/// Pixel height used for every label
pub const LABEL_FONT_SIZE: f32 = 12.0;

#[cfg(target_os = "macos")]
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
];

#[cfg(target_os = "windows")]
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "C:\\Windows\\Fonts\\segoeuib.ttf",
];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
];

/// Ink bounding box of a laid-out label, relative to the draw origin.
/// `max_x`/`max_y` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl TextBounds {
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    fn include(bounds: Option<Self>, other: Self) -> Option<Self> {
        Some(match bounds {
            None => other,
            Some(b) => Self {
                min_x: b.min_x.min(other.min_x),
                min_y: b.min_y.min(other.min_y),
                max_x: b.max_x.max(other.max_x),
                max_y: b.max_y.max(other.max_y),
            },
        })
    }
}

pub enum LabelFont {
    TrueType { font: Font<'static>, path: PathBuf },
    Bitmap,
}

impl LabelFont {
    /// Resolve the label font: `preferred` first, then the platform's system
    /// candidates, then the built-in bitmap font.
    pub fn load(preferred: Option<&Path>) -> Self {
        let candidates = preferred
            .map(Path::to_path_buf)
            .into_iter()
            .chain(system_font_candidates().iter().map(PathBuf::from));

        for path in candidates {
            if let Ok(font) = load_truetype(&path) {
                return LabelFont::TrueType { font, path };
            }
        }

        LabelFont::Bitmap
    }

    /// Human readable description for progress output and the manifest
    pub fn describe(&self) -> String {
        match self {
            LabelFont::TrueType { path, .. } => path.display().to_string(),
            LabelFont::Bitmap => "built-in 8x8 bitmap font".to_string(),
        }
    }

    /// Bounding box of the ink `text` leaves when drawn at (0, 0),
    /// or `None` when nothing would be painted.
    pub fn measure(&self, text: &str) -> Option<TextBounds> {
        match self {
            LabelFont::TrueType { font, .. } => layout(font, text, 0, 0)
                .iter()
                .filter_map(|glyph| glyph.pixel_bounding_box())
                .map(|bb| TextBounds {
                    min_x: bb.min.x,
                    min_y: bb.min.y,
                    max_x: bb.max.x,
                    max_y: bb.max.y,
                })
                .fold(None, TextBounds::include),
            LabelFont::Bitmap => bitmap_font::lit_pixels(text)
                .map(|(x, y)| TextBounds {
                    min_x: x,
                    min_y: y,
                    max_x: x + 1,
                    max_y: y + 1,
                })
                .fold(None, TextBounds::include),
        }
    }

    /// Draw `text` with its top-left origin at (`x`, `y`). Pixels that fall
    /// outside the canvas are clipped.
    pub fn draw(&self, canvas: &mut RgbaImage, text: &str, x: i32, y: i32, color: Rgba<u8>) {
        match self {
            LabelFont::TrueType { font, .. } => {
                for glyph in layout(font, text, x, y) {
                    if let Some(bb) = glyph.pixel_bounding_box() {
                        glyph.draw(|gx, gy, coverage| {
                            let px = bb.min.x + gx as i32;
                            let py = bb.min.y + gy as i32;
                            blend_pixel(canvas, px, py, color, coverage);
                        });
                    }
                }
            }
            LabelFont::Bitmap => {
                for (px, py) in bitmap_font::lit_pixels(text) {
                    blend_pixel(canvas, x + px, y + py, color, 1.0);
                }
            }
        }
    }
}

pub fn system_font_candidates() -> &'static [&'static str] {
    SYSTEM_FONT_CANDIDATES
}

fn load_truetype(path: &Path) -> Result<Font<'static>> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read font {}", path.display()))?;
    Font::try_from_vec(data)
        .with_context(|| format!("Failed to parse font {}", path.display()))
}

fn layout<'f>(font: &'f Font<'static>, text: &str, x: i32, y: i32) -> Vec<PositionedGlyph<'f>> {
    let scale = Scale::uniform(LABEL_FONT_SIZE);
    let v_metrics = font.v_metrics(scale);
    let start = point(x as f32, y as f32 + v_metrics.ascent);
    font.layout(text, scale, start).collect()
}

/// Source-over blend of `color` at `coverage` onto the canvas
fn blend_pixel(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }

    let alpha = (color[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }

    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    let dst_alpha = pixel[3] as f32 / 255.0;
    let out_alpha = alpha + dst_alpha * (1.0 - alpha);

    for channel in 0..3 {
        let src = color[channel] as f32 * alpha;
        let dst = pixel[channel] as f32 * dst_alpha * (1.0 - alpha);
        pixel[channel] = ((src + dst) / out_alpha).round().clamp(0.0, 255.0) as u8;
    }
    pixel[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_falls_back_to_bitmap() {
        let font = LabelFont::load(Some(Path::new("/nonexistent/font.ttf")));
        // A system font may still be picked up, but loading must never fail
        // and a bogus preferred path is never the chosen font.
        if let LabelFont::TrueType { path, .. } = &font {
            assert_ne!(path, Path::new("/nonexistent/font.ttf"));
        }
    }

    #[test]
    fn test_invalid_font_file_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        assert!(load_truetype(&path).is_err());
    }

    #[test]
    fn test_bitmap_measure() {
        let font = LabelFont::Bitmap;
        assert_eq!(font.measure(""), None);
        assert_eq!(font.measure("   "), None);

        // '-' lights columns 0..6 of row 3
        let bounds = font.measure("-").unwrap();
        assert_eq!(
            bounds,
            TextBounds {
                min_x: 0,
                min_y: 3,
                max_x: 6,
                max_y: 4
            }
        );
        assert_eq!(bounds.width(), 6);
        assert_eq!(bounds.height(), 1);
    }

    #[test]
    fn test_bitmap_draw_is_clipped() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        LabelFont::Bitmap.draw(&mut canvas, "Wide label", -3, -2, Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.dimensions(), (4, 4));
    }

    #[test]
    fn test_blend_over_transparent_keeps_color() {
        let mut canvas = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        blend_pixel(&mut canvas, 0, 0, Rgba([10, 20, 30, 255]), 0.5);
        let pixel = canvas.get_pixel(0, 0);
        assert_eq!(&pixel.0[..3], &[10, 20, 30]);
        assert_eq!(pixel[3], 128);
    }

    #[test]
    fn test_full_coverage_replaces_pixel() {
        let mut canvas = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 255]));
        blend_pixel(&mut canvas, 0, 0, Rgba([0, 0, 0, 255]), 1.0);
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }
}
