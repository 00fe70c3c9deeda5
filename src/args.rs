use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

/// Strips the glyphs a firmware never draws out of an Adafruit GFX font header.
#[derive(Parser)]
#[clap(version)]
pub struct Args {
    /// Font header to shrink, as written by `fontconvert`
    #[clap(long, short = 'f')]
    pub font_file: PathBuf,

    /// Every character to keep, e.g. "0123456789:"
    #[clap(long, short = 'c')]
    pub chars: String,

    /// xAdvance given to dropped glyphs [default: the font's space glyph]
    #[clap(long)]
    pub blank_advance: Option<u8>,

    /// yOffset given to dropped glyphs [default: the font's space glyph]
    #[clap(long, allow_hyphen_values = true)]
    pub blank_y_offset: Option<i8>,

    /// Name for the emitted declarations instead of the source font's
    #[clap(long, short = 'n')]
    pub name: Option<String>,

    /// Write the header here instead of stdout
    #[clap(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Log progress to stderr, repeat for more detail
    #[clap(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
