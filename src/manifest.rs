//! manifest.json data model
//!
//! Describes the sprites written by a run so game-side tooling can pick up
//! the placeholder set without scanning the output directory.

use crate::sprite_table::SpriteSpec;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Root structure of manifest.json
#[derive(Serialize, Debug, Clone)]
pub struct ManifestFile {
    /// Every sprite written, in generation order
    pub sprites: Vec<ManifestEntry>,

    pub info: Info,
}

/// One generated sprite
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub category: String,
    pub filename: String,

    /// Path relative to the output directory, always `/`-separated
    pub path: String,

    pub width: u32,
    pub height: u32,
    pub label: String,
}

/// Format version and the tool/font that produced the sprites
#[derive(Serialize, Debug, Clone)]
pub struct Info {
    pub version: u8,
    pub author: String,
    pub font: String,
}

impl ManifestFile {
    pub fn new(font: String) -> Self {
        Self {
            sprites: Vec::new(),
            info: Info {
                version: 1,
                author: "sprite-gen".to_string(),
                font,
            },
        }
    }

    pub fn add_sprite(&mut self, entry: ManifestEntry) {
        self.sprites.push(entry);
    }

    /// Write `manifest.json` into `dir`, replacing any previous one.
    /// `dir` is created when missing.
    pub fn write(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Can't create directory {}", dir.display()))?;
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize manifest.json")?;
        let path = dir.join(MANIFEST_FILE_NAME);
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

impl ManifestEntry {
    pub fn new(category: &str, spec: &SpriteSpec) -> Self {
        Self {
            category: category.to_string(),
            filename: spec.filename.clone(),
            path: format!("{}/{}", category, spec.filename),
            width: spec.width,
            height: spec.height,
            label: spec.label.clone(),
        }
    }
}
