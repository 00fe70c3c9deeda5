use std::{
    fs::{read_to_string, write},
    io::{stdout, Write},
};

use anyhow::Context;
use args::Args;
use clap::Parser;
use font_shrink::{
    parser::gfx_header,
    render::gfx_header::render,
    shrink::{shrink, BlankGlyph, WantedSet},
};
use log::info;

mod args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .format_timestamp(None)
        .init();

    let content = read_to_string(&args.font_file)
        .with_context(|| format!("Failed to read {}", args.font_file.display()))?;

    let font = gfx_header::parse(&content)
        .with_context(|| format!("Failed to parse {}", args.font_file.display()))?
        .validate()
        .with_context(|| format!("{} is not a usable font", args.font_file.display()))?;

    info!(
        "Loaded {}: glyphs 0x{:02X}..=0x{:02X}, {} bitmap bytes",
        font.name,
        font.first,
        font.last,
        font.bitmap.len()
    );

    let wanted: WantedSet = args.chars.chars().collect();

    let default_blank = BlankGlyph::from_font(&font);
    let blank = BlankGlyph {
        x_advance: args.blank_advance.unwrap_or(default_blank.x_advance),
        y_offset: args.blank_y_offset.unwrap_or(default_blank.y_offset),
    };

    let mut shrunk = shrink(&font, &wanted, blank)?;
    if let Some(name) = args.name {
        shrunk.name = name;
    }

    // Rendered up front so a failure never leaves half a header behind.
    let header = render(&shrunk);

    match args.output {
        Some(path) => write(&path, header)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => stdout().lock().write_all(header.as_bytes())?,
    }

    Ok(())
}
