use anyhow::{Context, Result};
use image::io::Reader as ImageReader;
use sprite_gen::sprite_gen::{border_is_intact, BORDER_WIDTH};

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Assets/Sprites/Tiles/tile_star.png".to_string());

    let img = ImageReader::open(&path)
        .with_context(|| format!("Failed to open image {}", path))?
        .decode()
        .context("Failed to decode image")?;

    let rgba_img = img.to_rgba8();
    let width = img.width();
    let height = img.height();

    println!("Checking sprite: {}", path);
    println!("Image dimensions: {}x{}", width, height);

    // Fill color is sampled just inside the border
    if width > BORDER_WIDTH && height > BORDER_WIDTH {
        let pixel = rgba_img.get_pixel(BORDER_WIDTH, BORDER_WIDTH);
        println!(
            "Fill sample (x={}, y={}): RGBA [{}, {}, {}, {}]",
            BORDER_WIDTH, BORDER_WIDTH, pixel[0], pixel[1], pixel[2], pixel[3]
        );
    }

    if border_is_intact(&rgba_img, BORDER_WIDTH) {
        println!("✓ {}px black border intact", BORDER_WIDTH);
    } else {
        println!("⚠ Border is missing or damaged");
    }

    Ok(())
}
