//! Shrinks Adafruit GFX style fonts down to the characters a firmware actually draws.
//!
//! ```rust
//! # use font_shrink::{parser::gfx_header, render::gfx_header::render, shrink::{shrink, BlankGlyph, WantedSet}};
//! let header = r#"
//! const uint8_t TinyBitmaps[] PROGMEM = { 0xF0, 0xAA, 0x55 };
//! const GFXglyph TinyGlyphs[] PROGMEM = {
//!   { 0, 0, 0, 2, 0, 1 },   // 0x20 ' '
//!   { 0, 2, 2, 3, 0, -2 },  // 0x21 '!'
//!   { 1, 4, 4, 5, 0, -4 } };// 0x22 '"'
//! const GFXfont Tiny PROGMEM = {
//!   (uint8_t  *)TinyBitmaps, (GFXglyph *)TinyGlyphs, 0x20, 0x22, 6 };
//! "#;
//!
//! let font = gfx_header::parse(header).unwrap().validate().unwrap();
//! let wanted: WantedSet = "\"".parse().unwrap();
//!
//! let shrunk = shrink(&font, &wanted, BlankGlyph::from_font(&font)).unwrap();
//! assert_eq!(shrunk.bitmap, [0x00, 0xAA, 0x55]);
//! assert_eq!((shrunk.first, shrunk.last), (0x22, 0x22));
//!
//! println!("{}", render(&shrunk));
//! ```

#[cfg(test)]
#[macro_use]
extern crate test_case;

#[macro_use]
extern crate log;

pub mod gfx;
pub mod parser;
pub mod render;
pub mod shrink;
