use image::Rgba;
use sprite_gen::label_font::LabelFont;
use sprite_gen::sprite_gen::{
    border_is_intact, generate_sprites, render, render_sprite, GenerateOptions, BORDER_WIDTH,
};
use sprite_gen::sprite_table::{Category, SpriteSpec, SpriteTable};
use tempfile::TempDir;

fn spec(filename: &str, width: u32, height: u32, label: &str, color: [u8; 4]) -> SpriteSpec {
    SpriteSpec {
        filename: filename.to_string(),
        width,
        height,
        label: label.to_string(),
        color,
    }
}

fn options(output: &std::path::Path) -> GenerateOptions {
    GenerateOptions {
        output: output.to_path_buf(),
        font: None,
        keep_going: false,
        strict: false,
        manifest: false,
    }
}

#[test]
fn test_render_writes_decodable_png() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("Tiles").join("tile_star.png");
    let font = LabelFont::load(None);

    render(&path, 64, 64, "★", [255, 255, 100, 255], &font).unwrap();

    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (64, 64));
    assert!(border_is_intact(&img, BORDER_WIDTH));
    assert_eq!(*img.get_pixel(2, 2), Rgba([255, 255, 100, 255]));
}

#[test]
fn test_render_is_byte_identical_across_runs() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("a.png");
    let second = temp_dir.path().join("b.png");
    let font = LabelFont::Bitmap;

    render(&first, 128, 64, "Watch Ad", [150, 150, 255, 255], &font).unwrap();
    render(&second, 128, 64, "Watch Ad", [150, 150, 255, 255], &font).unwrap();

    assert_eq!(std::fs::read(first).unwrap(), std::fs::read(second).unwrap());
}

#[test]
fn test_existing_file_is_overwritten() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("coin.png");
    std::fs::write(&path, b"stale").unwrap();

    render(&path, 32, 32, "Coin", [255, 200, 0, 255], &LabelFont::Bitmap).unwrap();

    assert_eq!(image::open(&path).unwrap().width(), 32);
}

#[test]
fn test_translucent_fill_is_preserved() {
    let img = render_sprite(20, 20, "", [10, 20, 30, 100], &LabelFont::Bitmap).unwrap();
    assert_eq!(*img.get_pixel(10, 10), Rgba([10, 20, 30, 100]));
    assert!(border_is_intact(&img, BORDER_WIDTH));
}

#[test]
fn test_bitmap_label_ink_is_centered() {
    let font = LabelFont::Bitmap;
    let img = render_sprite(64, 64, "Idle", [255, 255, 255, 255], &font).unwrap();

    let ink: Vec<(u32, u32)> = img
        .enumerate_pixels()
        .filter(|(x, y, p)| {
            *x >= BORDER_WIDTH
                && *y >= BORDER_WIDTH
                && *x < 64 - BORDER_WIDTH
                && *y < 64 - BORDER_WIDTH
                && p.0 == [0, 0, 0, 255]
        })
        .map(|(x, y, _)| (x, y))
        .collect();
    assert!(!ink.is_empty());

    let min_x = ink.iter().map(|p| p.0).min().unwrap();
    let max_x = ink.iter().map(|p| p.0).max().unwrap();
    let min_y = ink.iter().map(|p| p.1).min().unwrap();
    let max_y = ink.iter().map(|p| p.1).max().unwrap();

    // Margins on opposite sides differ by at most one pixel
    let left = min_x as i32;
    let right = 63 - max_x as i32;
    let top = min_y as i32;
    let bottom = 63 - max_y as i32;
    assert!((left - right).abs() <= 1, "left {} right {}", left, right);
    assert!((top - bottom).abs() <= 1, "top {} bottom {}", top, bottom);
}

#[test]
fn test_generate_sprites_report() {
    let temp_dir = TempDir::new().unwrap();
    let table = SpriteTable {
        categories: vec![
            Category {
                name: "Icons".to_string(),
                sprites: vec![
                    spec("coin.png", 32, 32, "Coin", [255, 200, 0, 255]),
                    spec("gem.png", 32, 32, "Gem", [150, 100, 255, 255]),
                ],
            },
            Category {
                name: "Effects".to_string(),
                sprites: vec![spec("confetti.png", 64, 64, "🎊", [255, 200, 100, 255])],
            },
        ],
    };

    let report = generate_sprites(&table, &options(temp_dir.path())).unwrap();

    assert!(report.failed.is_empty());
    assert_eq!(report.attempted(), 3);
    assert_eq!(
        report.created,
        vec![
            std::path::Path::new("Icons").join("coin.png"),
            std::path::Path::new("Icons").join("gem.png"),
            std::path::Path::new("Effects").join("confetti.png"),
        ]
    );
    for relative in &report.created {
        assert!(temp_dir.path().join(relative).exists());
    }
}

#[test]
fn test_generate_sprites_rejects_invalid_table() {
    let temp_dir = TempDir::new().unwrap();
    let table = SpriteTable {
        categories: vec![Category {
            name: "Tiles".to_string(),
            sprites: vec![
                spec("ok.png", 8, 8, "1", [0, 0, 0, 255]),
                spec("flat.png", 8, 0, "2", [0, 0, 0, 255]),
            ],
        }],
    };

    assert!(generate_sprites(&table, &options(temp_dir.path())).is_err());
    // Validation happens before anything is written
    assert!(!temp_dir.path().join("Tiles").exists());
}

#[test]
fn test_strict_collision_check_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let table = SpriteTable {
        categories: vec![Category {
            name: "UI".to_string(),
            sprites: vec![
                spec("panel.png", 8, 8, "A", [0, 0, 0, 255]),
                spec("panel.png", 8, 8, "B", [0, 0, 0, 255]),
            ],
        }],
    };
    let mut opts = options(temp_dir.path());
    opts.strict = true;

    assert!(generate_sprites(&table, &opts).is_err());
    assert!(!temp_dir.path().join("UI").exists());
}

#[test]
fn test_empty_table_still_writes_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("fresh");
    let table = SpriteTable::from_json_str(r#"{"categories":[]}"#).unwrap();
    let mut opts = options(&output);
    opts.manifest = true;

    let report = generate_sprites(&table, &opts).unwrap();

    assert_eq!(report.attempted(), 0);
    let content = std::fs::read_to_string(output.join("manifest.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed["sprites"].as_array().unwrap().len(), 0);
}

#[test]
fn test_oversized_sprite_rejected_before_rendering() {
    let temp_dir = TempDir::new().unwrap();
    let table = SpriteTable {
        categories: vec![Category {
            name: "Backgrounds".to_string(),
            sprites: vec![spec("huge.png", 4_000_000_000, 4_000_000_000, "x", [0, 0, 0, 255])],
        }],
    };

    assert!(generate_sprites(&table, &options(temp_dir.path())).is_err());
    assert!(!temp_dir.path().join("Backgrounds").exists());
}

#[test]
fn test_case_insensitive_collision_rejected_in_strict_mode() {
    let temp_dir = TempDir::new().unwrap();
    let table = SpriteTable {
        categories: vec![
            Category {
                name: "Tiles".to_string(),
                sprites: vec![spec("Star.png", 8, 8, "A", [0, 0, 0, 255])],
            },
            Category {
                name: "tiles".to_string(),
                sprites: vec![spec("star.png", 8, 8, "B", [0, 0, 0, 255])],
            },
        ],
    };
    let mut opts = options(temp_dir.path());
    opts.strict = true;

    let err = generate_sprites(&table, &opts).unwrap_err();
    assert!(format!("{:#}", err).contains("Tiles/Star.png"));
}
