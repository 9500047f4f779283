use anyhow::{bail, Result};
use clap::Parser;
use sprite_gen::{
    sprite_gen::{generate_sprites, GenerateOptions},
    sprite_table::SpriteTable,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(
    name = "sprite-gen",
    about = "Generate labelled placeholder sprites for a game project"
)]
struct Args {
    /// Base output directory. Each category becomes a subdirectory.
    #[clap(short, long, value_name = "DIR", default_value = "./Assets/Sprites")]
    output: PathBuf,

    /// JSON sprite table to use instead of the built-in one
    #[clap(short, long, value_name = "FILE")]
    table: Option<PathBuf>,

    /// Only generate these categories (case-insensitive)
    #[clap(short, long, value_delimiter = ',', value_name = "NAMES")]
    category: Option<Vec<String>>,

    /// TrueType font for labels, tried before the system fonts
    #[clap(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Report failing sprites and continue with the rest of the batch
    #[clap(long)]
    keep_going: bool,

    /// Fail before writing anything if two sprites share an output path
    #[clap(long)]
    strict: bool,

    /// Write manifest.json into the output directory
    #[clap(long)]
    manifest: bool,

    /// Print the sprite table and exit
    #[clap(long)]
    list: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut table = match &args.table {
        Some(path) => SpriteTable::from_json_file(path)?,
        None => SpriteTable::builtin(),
    };

    if let Some(categories) = &args.category {
        table.retain_categories(categories)?;
    }

    if args.list {
        print_table(&table);
        return Ok(());
    }

    let options = GenerateOptions {
        output: args.output,
        font: args.font,
        keep_going: args.keep_going,
        strict: args.strict,
        manifest: args.manifest,
    };

    let report = generate_sprites(&table, &options)?;
    if !report.failed.is_empty() {
        bail!(
            "{} of {} sprites failed",
            report.failed.len(),
            report.attempted()
        );
    }

    Ok(())
}

fn print_table(table: &SpriteTable) {
    for category in &table.categories {
        println!("{}:", category.name);
        for spec in &category.sprites {
            let [r, g, b, a] = spec.color;
            println!(
                "  {:<28} {:>4}x{:<4} {:<10} rgba({}, {}, {}, {})",
                spec.filename, spec.width, spec.height, spec.label, r, g, b, a
            );
        }
    }
    println!("Total sprites: {}", table.total());
}
