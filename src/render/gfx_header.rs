//! Writes a [`Font`] back out as an Adafruit GFX header.

use std::fmt::{self, Write};

use crate::gfx::Font;

/// Bitmap bytes per line, the same layout `fontconvert` uses.
const BYTES_PER_LINE: usize = 12;

/// Renders the bitmap, glyph and descriptor declarations, all placed in `PROGMEM`.
///
/// The bitmap array always ends with an extra `0x00`. Nothing reads it; it keeps every real value
/// followed by a comma.
pub fn render(font: &Font) -> String {
    let mut out = String::new();

    write_header(&mut out, font).expect("writing to a String cannot fail");

    out
}

fn write_header(out: &mut impl Write, font: &Font) -> fmt::Result {
    let name = &font.name;

    writeln!(out, "const uint8_t {name}Bitmaps[] PROGMEM = {{")?;
    for (i, byte) in font.bitmap.iter().enumerate() {
        let separator = if (i + 1) % BYTES_PER_LINE == 0 { '\n' } else { ' ' };
        write!(out, "0x{byte:02X},{separator}")?;
    }
    writeln!(out, "0x00 }};")?;
    writeln!(out)?;

    writeln!(out, "const GFXglyph {name}Glyphs[] PROGMEM = {{")?;
    for (index, glyph) in font.glyphs.iter().enumerate() {
        let close = if index + 1 == font.glyphs.len() { " };" } else { "," };
        let code = font.code_at(index);

        writeln!(
            out,
            "{{ {:4}, {:4}, {:4}, {:4}, {:4}, {:4} }}{close} // 0x{code:02X}{}",
            glyph.bitmap_offset,
            glyph.width,
            glyph.height,
            glyph.x_advance,
            glyph.x_offset,
            glyph.y_offset,
            Printable(code),
        )?;
    }
    writeln!(out)?;

    writeln!(out, "const GFXfont {name} PROGMEM = {{")?;
    writeln!(out, "(uint8_t  *){name}Bitmaps,")?;
    writeln!(out, "(GFXglyph *){name}Glyphs,")?;
    writeln!(
        out,
        "0x{:02X}, 0x{:02X}, {} }};",
        font.first, font.last, font.y_advance
    )
}

/// Quoted character for a glyph comment. Control codes would break the line, so they get none.
struct Printable(u32);

impl fmt::Display for Printable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match char::from_u32(self.0) {
            Some(c) if c == ' ' || c.is_ascii_graphic() => write!(f, " '{c}'"),
            _ => Ok(()),
        }
    }
}
