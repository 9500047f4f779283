//! Sprite table data model
//!
//! A sprite table is an ordered list of categories, each holding an ordered
//! list of sprite specs. The category name doubles as the output
//! subdirectory, so `Tiles` + `tile_1.png` ends up at `<base>/Tiles/tile_1.png`.
//!
//! The built-in table is declared as a `const` array of [`SpriteDef`] records
//! and converted into an owned [`SpriteTable`] on demand. Tables can also be
//! loaded from JSON, where colors may be RGBA arrays or CSS color strings.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::HashMap, path::Path, str::FromStr};

/// Largest width or height a sprite may declare
pub const MAX_DIMENSION: u32 = 16384;

/// Compile-time sprite record used by the built-in table
#[derive(Debug, Clone, Copy)]
pub struct SpriteDef {
    pub filename: &'static str,
    pub width: u32,
    pub height: u32,
    pub label: &'static str,
    pub color: [u8; 4],
}

const fn sprite(
    filename: &'static str,
    width: u32,
    height: u32,
    label: &'static str,
    color: [u8; 4],
) -> SpriteDef {
    SpriteDef {
        filename,
        width,
        height,
        label,
        color,
    }
}

const MASCOT: &[SpriteDef] = &[
    sprite("character_idle.png", 64, 64, "Idle", [100, 150, 255, 255]),
    sprite("character_happy.png", 64, 64, "Happy", [100, 200, 100, 255]),
    sprite("character_celebrating.png", 64, 64, "Celebr", [255, 200, 100, 255]),
    sprite("character_encouraging.png", 64, 64, "Encour", [200, 100, 255, 255]),
    sprite("character_thinking.png", 64, 64, "Think", [255, 150, 100, 255]),
    sprite("character_confused.png", 64, 64, "Confus", [150, 150, 255, 255]),
];

const TILES: &[SpriteDef] = &[
    sprite("tile_1.png", 64, 64, "1", [255, 100, 100, 255]),
    sprite("tile_2.png", 64, 64, "2", [255, 150, 100, 255]),
    sprite("tile_3.png", 64, 64, "3", [255, 200, 100, 255]),
    sprite("tile_4.png", 64, 64, "4", [200, 255, 100, 255]),
    sprite("tile_5.png", 64, 64, "5", [100, 255, 100, 255]),
    sprite("tile_6.png", 64, 64, "6", [100, 255, 150, 255]),
    sprite("tile_7.png", 64, 64, "7", [100, 255, 200, 255]),
    sprite("tile_8.png", 64, 64, "8", [100, 200, 255, 255]),
    sprite("tile_9.png", 64, 64, "9", [100, 150, 255, 255]),
    sprite("tile_star.png", 64, 64, "★", [255, 255, 100, 255]),
    sprite("tile_heart.png", 64, 64, "❤", [255, 100, 150, 255]),
    sprite("tile_gem.png", 64, 64, "💎", [200, 100, 255, 255]),
    sprite("tile_base.png", 64, 64, "Base", [200, 200, 200, 255]),
    sprite("tile_selected.png", 64, 64, "Sel", [50, 150, 50, 255]),
    sprite("tile_matched.png", 64, 64, "Match", [100, 255, 100, 255]),
    sprite("tile_locked.png", 64, 64, "Lock", [100, 100, 100, 255]),
];

const UI: &[SpriteDef] = &[
    sprite("button_play.png", 128, 64, "Play", [100, 200, 100, 255]),
    sprite("button_pause.png", 128, 64, "Pause", [200, 150, 100, 255]),
    sprite("button_settings.png", 128, 64, "Settings", [100, 150, 200, 255]),
    sprite("button_back.png", 128, 64, "Back", [200, 100, 100, 255]),
    sprite("button_next.png", 128, 64, "Next", [100, 200, 150, 255]),
    sprite("button_retry.png", 128, 64, "Retry", [200, 100, 150, 255]),
    sprite("button_shop.png", 128, 64, "Shop", [255, 200, 100, 255]),
    sprite("button_ads.png", 128, 64, "Watch Ad", [150, 150, 255, 255]),
    sprite("panel_menu.png", 320, 240, "Menu", [220, 220, 220, 255]),
    sprite("panel_pause.png", 320, 240, "Paused", [180, 180, 200, 255]),
];

const ICONS: &[SpriteDef] = &[
    sprite("coin.png", 32, 32, "Coin", [255, 200, 0, 255]),
    sprite("gem.png", 32, 32, "Gem", [150, 100, 255, 255]),
    sprite("star.png", 32, 32, "Star", [255, 255, 100, 255]),
    sprite("heart.png", 32, 32, "Heart", [255, 100, 150, 255]),
    sprite("bolt.png", 32, 32, "Bolt", [255, 255, 0, 255]),
    sprite("shield.png", 32, 32, "Shield", [100, 150, 255, 255]),
    sprite("music_on.png", 32, 32, "Music", [100, 200, 100, 255]),
    sprite("music_off.png", 32, 32, "Mute", [200, 100, 100, 255]),
    sprite("sound_on.png", 32, 32, "Sound", [100, 200, 100, 255]),
    sprite("sound_off.png", 32, 32, "Mute", [200, 100, 100, 255]),
];

const BACKGROUNDS: &[SpriteDef] = &[
    sprite("bg_menu.png", 1080, 1920, "Menu BG", [200, 220, 255, 255]),
    sprite("bg_level.png", 1080, 1920, "Level BG", [240, 240, 240, 255]),
    sprite("bg_shop.png", 1080, 1920, "Shop BG", [255, 240, 200, 255]),
    sprite("bg_settings.png", 1080, 1920, "Settings", [220, 240, 220, 255]),
];

const EFFECTS: &[SpriteDef] = &[
    sprite("particle_star.png", 32, 32, "✨", [255, 255, 100, 255]),
    sprite("particle_pop.png", 32, 32, "◉", [255, 150, 100, 255]),
    sprite("particle_spark.png", 32, 32, "✦", [255, 200, 100, 255]),
    sprite("particle_dust.png", 32, 32, "◦", [150, 150, 150, 255]),
    sprite("explosion.png", 64, 64, "💥", [255, 100, 100, 255]),
    sprite("confetti.png", 64, 64, "🎊", [255, 200, 100, 255]),
];

/// The built-in placeholder table, in generation order
pub const BUILTIN_CATEGORIES: &[(&str, &[SpriteDef])] = &[
    ("Mascot", MASCOT),
    ("Tiles", TILES),
    ("UI", UI),
    ("Icons", ICONS),
    ("Backgrounds", BACKGROUNDS),
    ("Effects", EFFECTS),
];

/// A single placeholder sprite to render
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SpriteSpec {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub label: String,
    /// Fill color as RGBA. JSON tables may also give a CSS color string.
    #[serde(deserialize_with = "deserialize_color")]
    pub color: [u8; 4],
}

/// Named group of sprites, rendered into a subdirectory of the same name
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub sprites: Vec<SpriteSpec>,
}

/// Ordered set of categories driving a generation run
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SpriteTable {
    pub categories: Vec<Category>,
}

/// Output path shared by more than one spec in a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub category: String,
    pub filename: String,
    pub count: usize,
}

impl Collision {
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.category, self.filename)
    }
}

impl From<&SpriteDef> for SpriteSpec {
    fn from(def: &SpriteDef) -> Self {
        Self {
            filename: def.filename.to_string(),
            width: def.width,
            height: def.height,
            label: def.label.to_string(),
            color: def.color,
        }
    }
}

impl SpriteSpec {
    /// Check dimensions and filename before anything touches the disk
    pub fn validate(&self) -> Result<()> {
        check_dimensions(self.width, self.height)
            .with_context(|| format!("Sprite {} has invalid dimensions", self.filename))?;
        validate_path_component(&self.filename, "Sprite filename")?;
        if !self.filename.to_ascii_lowercase().ends_with(".png") {
            bail!("Sprite filename must end in .png: {}", self.filename);
        }
        Ok(())
    }
}

impl SpriteTable {
    /// Build the owned built-in table
    pub fn builtin() -> Self {
        let categories = BUILTIN_CATEGORIES
            .iter()
            .map(|(name, defs)| Category {
                name: name.to_string(),
                sprites: defs.iter().map(SpriteSpec::from).collect(),
            })
            .collect();

        Self { categories }
    }

    /// Load a table from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sprite table {}", path.display()))?;
        Self::from_json_str(&data)
            .with_context(|| format!("Failed to parse sprite table {}", path.display()))
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        let table: SpriteTable = serde_json::from_str(data)?;
        Ok(table)
    }

    /// Total number of sprite specs across all categories
    pub fn total(&self) -> usize {
        self.categories.iter().map(|c| c.sprites.len()).sum()
    }

    /// Iterate over every (category, spec) pair in table order
    pub fn iter(&self) -> impl Iterator<Item = (&Category, &SpriteSpec)> {
        self.categories
            .iter()
            .flat_map(|category| category.sprites.iter().map(move |spec| (category, spec)))
    }

    /// Keep only the named categories (case-insensitive). Unknown names are an error.
    pub fn retain_categories(&mut self, names: &[String]) -> Result<()> {
        for name in names {
            if !self
                .categories
                .iter()
                .any(|c| c.name.eq_ignore_ascii_case(name))
            {
                let available: Vec<&str> =
                    self.categories.iter().map(|c| c.name.as_str()).collect();
                bail!(
                    "Unknown category: {}. Available categories: {}",
                    name,
                    available.join(", ")
                );
            }
        }

        self.categories
            .retain(|c| names.iter().any(|n| c.name.eq_ignore_ascii_case(n)));
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for category in &self.categories {
            validate_path_component(&category.name, "Category name")?;
            for spec in &category.sprites {
                spec.validate()
                    .with_context(|| format!("Invalid entry in category {}", category.name))?;
            }
        }
        Ok(())
    }

    /// Output paths claimed by more than one spec, in order of first appearance.
    /// Names are compared ignoring ASCII case, since `Tiles/A.png` and
    /// `tiles/a.png` are the same file on case-insensitive filesystems.
    pub fn collisions(&self) -> Vec<Collision> {
        let mut counts: HashMap<(String, String), usize> = HashMap::new();
        let mut order = Vec::new();

        for (category, spec) in self.iter() {
            let key = (
                category.name.to_ascii_lowercase(),
                spec.filename.to_ascii_lowercase(),
            );
            let count = counts.entry(key.clone()).or_insert(0);
            if *count == 0 {
                order.push((key, category.name.as_str(), spec.filename.as_str()));
            }
            *count += 1;
        }

        order
            .into_iter()
            .filter_map(|(key, category, filename)| {
                let count = counts[&key];
                (count > 1).then(|| Collision {
                    category: category.to_string(),
                    filename: filename.to_string(),
                    count,
                })
            })
            .collect()
    }
}

/// Reject sizes that are zero or too large to allocate as an RGBA canvas
pub fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        bail!(
            "Sprite dimensions must be positive, got {}x{}",
            width,
            height
        );
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        bail!(
            "Sprite dimensions {}x{} exceed the {}px limit per side",
            width,
            height,
            MAX_DIMENSION
        );
    }
    Ok(())
}

fn validate_path_component(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        bail!("{} must not be empty", what);
    }
    if value.contains('/') || value.contains('\\') || value.contains("..") || value == "." {
        bail!("{} must be a plain name without path separators: {}", what, value);
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorValue {
    Rgba([u8; 4]),
    Css(String),
}

fn deserialize_color<'de, D>(deserializer: D) -> std::result::Result<[u8; 4], D::Error>
where
    D: Deserializer<'de>,
{
    match ColorValue::deserialize(deserializer)? {
        ColorValue::Rgba(rgba) => Ok(rgba),
        ColorValue::Css(css) => parse_css_color(&css).map_err(serde::de::Error::custom),
    }
}

/// Parse a CSS color string (`#rrggbb`, `rgba(...)`, named colors) into RGBA
pub fn parse_css_color(value: &str) -> Result<[u8; 4]> {
    let color = css_color::Srgb::from_str(value)
        .map_err(|_| anyhow::anyhow!("Invalid CSS color: {}", value))?;

    Ok([
        (color.red * 255.).round() as u8,
        (color.green * 255.).round() as u8,
        (color.blue * 255.).round() as u8,
        (color.alpha * 255.).round() as u8,
    ])
}
