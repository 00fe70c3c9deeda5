//! Reads the C header produced by Adafruit's `fontconvert` tool.
//!
//! Three declarations are recognized, in any order, between whitespace, comments and
//! preprocessor lines. The `PROGMEM` qualifier is optional so headers that had it stripped for a
//! desktop compiler still load.
//!
//! ```rust
//! # use font_shrink::parser::gfx_header;
//! let header = r#"
//! #include <Adafruit_GFX.h>
//!
//! const uint8_t TinyBitmaps[] PROGMEM = { 0xF0 };
//!
//! const GFXglyph TinyGlyphs[] PROGMEM = {
//!   { 0, 0, 0, 2, 0, 1 },    // 0x20 ' '
//!   { 0, 2, 2, 3, 0, -2 } }; // 0x21 '!'
//!
//! const GFXfont Tiny PROGMEM = {
//!   (uint8_t  *)TinyBitmaps,
//!   (GFXglyph *)TinyGlyphs,
//!   0x20, 0x21, 6 };
//! "#;
//!
//! let font = gfx_header::parse(header).unwrap();
//!
//! assert_eq!(font.name, "Tiny");
//! assert_eq!(font.bitmap, [0xF0]);
//! assert_eq!(font.glyphs.len(), 2);
//! assert_eq!((font.first, font.last, font.y_advance), (0x20, 0x21, 6));
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_until, take_while, take_while1},
    character::complete::{char, digit1, hex_digit1, multispace1, not_line_ending},
    combinator::{cut, eof, map_res, opt, recognize, value, verify},
    error::ErrorKind,
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated, tuple},
    Finish, IResult,
};
use thiserror::Error;

use crate::gfx::{Glyph, RawFont};

const BITMAP_TYPE: &str = "uint8_t";
const GLYPH_TYPE: &str = "GFXglyph";
const FONT_TYPE: &str = "GFXfont";

/// Parses the whole header into an unchecked font. Call [`RawFont::validate`] before relying on
/// the offsets.
pub fn parse(input: &str) -> Result<RawFont, ParserError> {
    let (_, declarations) = declarations(input)
        .finish()
        .map_err(|e| ParserError::syntax(input, e.input, e.code))?;

    let mut bitmap = None;
    let mut glyphs = None;
    let mut font = None;

    for declaration in declarations {
        match declaration {
            Declaration::Bitmap { name, values } => {
                debug!("Found bitmap array {name} with {} bytes", values.len());
                set_once(&mut bitmap, (name, values), BITMAP_TYPE)?;
            }
            Declaration::Glyphs { name, records } => {
                debug!("Found glyph array {name} with {} glyphs", records.len());
                set_once(&mut glyphs, (name, records), GLYPH_TYPE)?;
            }
            Declaration::Font(descriptor) => {
                debug!("Found font descriptor {}", descriptor.name);
                set_once(&mut font, descriptor, FONT_TYPE)?;
            }
        }
    }

    let (bitmap_name, bitmap) = bitmap.ok_or(ParserError::MissingDeclaration(BITMAP_TYPE))?;
    let (glyphs_name, glyphs) = glyphs.ok_or(ParserError::MissingDeclaration(GLYPH_TYPE))?;
    let font = font.ok_or(ParserError::MissingDeclaration(FONT_TYPE))?;

    for (referenced, declared) in [(font.bitmap, bitmap_name), (font.glyphs, glyphs_name)] {
        if referenced != declared {
            return Err(ParserError::UnknownArray(referenced.to_owned()));
        }
    }

    let bitmap = bitmap
        .into_iter()
        .map(|v| narrow(v, "bitmap byte"))
        .collect::<Result<Vec<u8>, _>>()?;

    let glyphs = glyphs
        .into_iter()
        .map(glyph_from_record)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawFont::new(
        font.name,
        bitmap,
        glyphs,
        narrow(font.first, "first")?,
        narrow(font.last, "last")?,
        narrow(font.y_advance, "yAdvance")?,
    ))
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("Syntax error at line {line}, column {column}: {kind:?}")]
    Syntax {
        line: usize,
        column: usize,
        kind: ErrorKind,
    },
    #[error("No {0} declaration found")]
    MissingDeclaration(&'static str),
    #[error("More than one {0} declaration found")]
    DuplicateDeclaration(&'static str),
    #[error("Font descriptor references undeclared array {0}")]
    UnknownArray(String),
    #[error("Value {value} does not fit the {field} field")]
    OutOfRange { field: &'static str, value: i64 },
    #[error("Glyph record has {0} fields instead of 6")]
    GlyphFieldCount(usize),
}

impl ParserError {
    /// Converts nom's borrowed error into a position the user can look up.
    fn syntax(source: &str, rest: &str, kind: ErrorKind) -> Self {
        let consumed = &source[..source.len() - rest.len()];
        let line = consumed.matches('\n').count() + 1;
        let column = consumed.len() - consumed.rfind('\n').map_or(0, |i| i + 1) + 1;

        ParserError::Syntax { line, column, kind }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Declaration<'a> {
    Bitmap { name: &'a str, values: Vec<i64> },
    Glyphs { name: &'a str, records: Vec<Vec<i64>> },
    Font(Descriptor<'a>),
}

#[derive(Debug, PartialEq, Eq)]
struct Descriptor<'a> {
    name: &'a str,
    bitmap: &'a str,
    glyphs: &'a str,
    first: i64,
    last: i64,
    y_advance: i64,
}

fn set_once<T>(slot: &mut Option<T>, item: T, kind: &'static str) -> Result<(), ParserError> {
    if slot.replace(item).is_some() {
        return Err(ParserError::DuplicateDeclaration(kind));
    }

    Ok(())
}

fn narrow<T: TryFrom<i64>>(value: i64, field: &'static str) -> Result<T, ParserError> {
    T::try_from(value).map_err(|_| ParserError::OutOfRange { field, value })
}

fn glyph_from_record(record: Vec<i64>) -> Result<Glyph, ParserError> {
    let [bitmap_offset, width, height, x_advance, x_offset, y_offset] = record[..] else {
        return Err(ParserError::GlyphFieldCount(record.len()));
    };

    Ok(Glyph {
        bitmap_offset: narrow(bitmap_offset, "bitmapOffset")?,
        width: narrow(width, "width")?,
        height: narrow(height, "height")?,
        x_advance: narrow(x_advance, "xAdvance")?,
        x_offset: narrow(x_offset, "xOffset")?,
        y_offset: narrow(y_offset, "yOffset")?,
    })
}

fn declarations(input: &str) -> IResult<&str, Vec<Declaration>> {
    terminated(
        many0(alt((bitmap_declaration, glyph_declaration, font_declaration))),
        preceded(preceded_empty, eof),
    )(input)
}

/// `const uint8_t NameBitmaps[] PROGMEM = { 0x00, ... };`
fn bitmap_declaration(input: &str) -> IResult<&str, Declaration> {
    let (input, name) = array_head(BITMAP_TYPE)(input)?;
    let (input, values) = cut(terminated(braced_list(integer), symbol(';')))(input)?;

    Ok((input, Declaration::Bitmap { name, values }))
}

/// `const GFXglyph NameGlyphs[] PROGMEM = { { 0, 0, 0, 5, 0, 1 }, ... };`
fn glyph_declaration(input: &str) -> IResult<&str, Declaration> {
    let (input, name) = array_head(GLYPH_TYPE)(input)?;
    let (input, records) =
        cut(terminated(braced_list(braced_list(integer)), symbol(';')))(input)?;

    Ok((input, Declaration::Glyphs { name, records }))
}

/// `const GFXfont Name PROGMEM = { (uint8_t *)NameBitmaps, (GFXglyph *)NameGlyphs, 0x20, 0x7E, 24 };`
fn font_declaration(input: &str) -> IResult<&str, Declaration> {
    let (input, name) = preceded(qualifiers(FONT_TYPE), identifier)(input)?;
    let (input, (bitmap, glyphs, first, last, y_advance)) = cut(delimited(
        pair(opt(keyword("PROGMEM")), symbol('=')),
        delimited(
            symbol('{'),
            tuple((
                terminated(array_reference, symbol(',')),
                terminated(array_reference, symbol(',')),
                terminated(integer, symbol(',')),
                terminated(integer, symbol(',')),
                terminated(integer, opt(symbol(','))),
            )),
            symbol('}'),
        ),
        symbol(';'),
    ))(input)?;

    Ok((
        input,
        Declaration::Font(Descriptor {
            name,
            bitmap,
            glyphs,
            first,
            last,
            y_advance,
        }),
    ))
}

/// `[static] const <ty> <name>[] [PROGMEM] =`, returns the name.
fn array_head<'a>(ty: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input| {
        terminated(
            preceded(qualifiers(ty), identifier),
            tuple((
                symbol('['),
                symbol(']'),
                opt(keyword("PROGMEM")),
                symbol('='),
            )),
        )(input)
    }
}

fn qualifiers<'a>(ty: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, ()> {
    move |input| {
        value(
            (),
            tuple((opt(keyword("static")), keyword("const"), keyword(ty))),
        )(input)
    }
}

/// `{ item, item, ... }`, a trailing comma is allowed.
fn braced_list<'a, O>(
    item: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<O>> {
    delimited(
        symbol('{'),
        terminated(separated_list0(symbol(','), item), opt(symbol(','))),
        symbol('}'),
    )
}

/// `(uint8_t  *)NameBitmaps`, the cast is optional.
fn array_reference(input: &str) -> IResult<&str, &str> {
    preceded(
        opt(pair(symbol('('), terminated(take_until(")"), char(')')))),
        identifier,
    )(input)
}

/// A decimal or `0x` hex literal, decimals may be negative.
fn integer(input: &str) -> IResult<&str, i64> {
    preceded(
        preceded_empty,
        alt((
            map_res(preceded(tag_no_case("0x"), hex_digit1), |hex: &str| {
                i64::from_str_radix(hex, 16)
            }),
            map_res(recognize(pair(opt(char('-')), digit1)), str::parse::<i64>),
        )),
    )(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    preceded(
        preceded_empty,
        recognize(pair(
            take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        )),
    )(input)
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    verify(identifier, move |found: &str| found == word)
}

fn symbol<'a>(c: char) -> impl FnMut(&'a str) -> IResult<&'a str, char> {
    preceded(preceded_empty, char(c))
}

/// Returned input has no preceding whitespace, comments or preprocessor lines.
fn preceded_empty(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            line_comment,
            block_comment,
            directive,
        ))),
    )(input)
}

fn line_comment(input: &str) -> IResult<&str, ()> {
    value((), pair(tag("//"), not_line_ending))(input)
}

fn block_comment(input: &str) -> IResult<&str, ()> {
    value((), tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

/// `#pragma once`, `#include <Adafruit_GFX.h>` and the like.
fn directive(input: &str) -> IResult<&str, ()> {
    value((), pair(char('#'), not_line_ending))(input)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use nom::IResult;

    use super::{Declaration, Descriptor, ParserError};
    use crate::gfx::Glyph;

    #[test_case("0x7E" => Ok(("", 0x7E)); "hex")]
    #[test_case("0Xab" => Ok(("", 0xAB)); "hex upper prefix")]
    #[test_case("  56 }" => Ok((" }", 56)); "decimal with surroundings")]
    #[test_case("-25" => Ok(("", -25)); "negative")]
    #[test_case("/* x */ // y\n 3" => Ok(("", 3)); "after comments")]
    fn integer(input: &str) -> IResult<&str, i64> {
        super::integer(input)
    }

    #[test_case("FreeSans9pt7bGlyphs[]" => Ok(("[]", "FreeSans9pt7bGlyphs")); "array name")]
    #[test_case("_private" => Ok(("", "_private")); "underscore")]
    fn identifier(input: &str) -> IResult<&str, &str> {
        super::identifier(input)
    }

    #[test_case("" => Ok(("", ())); "empty input")]
    #[test_case("#pragma once\n#include <Adafruit_GFX.h>\n\nconst" => Ok(("const", ())); "preprocessor lines")]
    #[test_case("// 0x5C '\\'\n  }" => Ok(("}", ())); "glyph comment")]
    #[test_case("/* multi\n line */ x" => Ok(("x", ())); "block comment")]
    #[test_case("const // later" => Ok(("const // later", ())); "unchanged")]
    fn preceded_empty(input: &str) -> IResult<&str, ()> {
        super::preceded_empty(input)
    }

    #[test_case("(uint8_t  *)FontBitmaps" => Ok(("", "FontBitmaps")); "with cast")]
    #[test_case("FontGlyphs" => Ok(("", "FontGlyphs")); "without cast")]
    fn array_reference(input: &str) -> IResult<&str, &str> {
        super::array_reference(input)
    }

    #[test_case("const uint8_t FBitmaps[] PROGMEM = { 0x00, 0xFF };"
        => Ok(("", Declaration::Bitmap { name: "FBitmaps", values: vec![0x00, 0xFF] }));
        "bitmap")]
    #[test_case("static const uint8_t FBitmaps[] = {\n 0x01,\n};"
        => Ok(("", Declaration::Bitmap { name: "FBitmaps", values: vec![0x01] }));
        "bitmap without PROGMEM and trailing comma")]
    #[test_case("const GFXglyph FGlyphs[] PROGMEM = {\n  { 0, 0, 0, 5, 0, 1 },   // 0x20 ' '\n  { 0, 2, 9, 3, 1, -8 } }; // 0x21 '!'"
        => Ok((" // 0x21 '!'", Declaration::Glyphs {
            name: "FGlyphs",
            records: vec![vec![0, 0, 0, 5, 0, 1], vec![0, 2, 9, 3, 1, -8]],
        }));
        "glyphs")]
    #[test_case("const GFXfont F PROGMEM = {\n(uint8_t  *)FBitmaps,\n(GFXglyph *)FGlyphs,\n0x20, 0x7E, 56 };"
        => Ok(("", Declaration::Font(Descriptor {
            name: "F",
            bitmap: "FBitmaps",
            glyphs: "FGlyphs",
            first: 0x20,
            last: 0x7E,
            y_advance: 56,
        })));
        "font descriptor")]
    fn declaration(input: &str) -> IResult<&str, Declaration> {
        nom::branch::alt((
            super::bitmap_declaration,
            super::glyph_declaration,
            super::font_declaration,
        ))(input)
    }

    const TINY: &str = r#"
const uint8_t TinyBitmaps[] PROGMEM = { 0xF0, 0xAA, 0x55 };

const GFXglyph TinyGlyphs[] PROGMEM = {
  { 0, 0, 0, 2, 0, 1 },   // 0x20 ' '
  { 0, 2, 2, 3, 0, -2 },  // 0x21 '!'
  { 1, 4, 4, 5, 0, -4 } }; // 0x22 '"'

const GFXfont Tiny PROGMEM = {
  (uint8_t  *)TinyBitmaps,
  (GFXglyph *)TinyGlyphs,
  0x20, 0x22, 6 };

// Approx. 50 bytes
"#;

    #[test]
    fn parse_reads_all_declarations() {
        let font = super::parse(TINY).unwrap();

        assert_eq!(font.name, "Tiny");
        assert_eq!(font.bitmap, [0xF0, 0xAA, 0x55]);
        assert_eq!(
            font.glyphs[2],
            Glyph {
                bitmap_offset: 1,
                width: 4,
                height: 4,
                x_advance: 5,
                x_offset: 0,
                y_offset: -4,
            }
        );
        assert_eq!((font.first, font.last, font.y_advance), (0x20, 0x22, 6));
    }

    #[test]
    fn parse_accepts_any_declaration_order() {
        let (bitmap, rest) = TINY.split_at(TINY.find("const GFXglyph").unwrap());
        let reordered = format!("{rest}\n{bitmap}");

        assert_eq!(super::parse(&reordered), super::parse(TINY));
    }

    #[test_case("0x22, 6 };", "0x22, 6 ;" => (12, 17); "missing closing brace")]
    #[test_case("{ 1, 4, 4, 5, 0, -4 }", "{ 1, 4, 4 5, 0, -4 }" => (7, 3); "missing comma")]
    #[test_case("// Approx. 50 bytes", "Approx. 50 bytes" => (14, 1); "stray text")]
    fn parse_reports_syntax_error_position(from: &str, to: &str) -> (usize, usize) {
        match super::parse(&TINY.replace(from, to)) {
            Err(ParserError::Syntax { line, column, .. }) => (line, column),
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test_case(|s: &str| s.replace("const uint8_t TinyBitmaps[] PROGMEM = { 0xF0, 0xAA, 0x55 };", "")
        => ParserError::MissingDeclaration("uint8_t"); "missing bitmap")]
    #[test_case(|s: &str| format!("{s}\nconst uint8_t OtherBitmaps[] = {{ 0x00 }};")
        => ParserError::DuplicateDeclaration("uint8_t"); "two bitmaps")]
    #[test_case(|s: &str| s.replace("(uint8_t  *)TinyBitmaps", "(uint8_t  *)HugeBitmaps")
        => ParserError::UnknownArray("HugeBitmaps".to_string()); "descriptor names another array")]
    #[test_case(|s: &str| s.replace("0x55", "0x155")
        => ParserError::OutOfRange { field: "bitmap byte", value: 0x155 }; "byte too large")]
    #[test_case(|s: &str| s.replace("0, -4 }", "0, -200 }")
        => ParserError::OutOfRange { field: "yOffset", value: -200 }; "offset too small")]
    #[test_case(|s: &str| s.replace("{ 0, 2, 2, 3, 0, -2 }", "{ 0, 2, 2, 3, 0 }")
        => ParserError::GlyphFieldCount(5); "short glyph record")]
    fn parse_rejects(edit: fn(&str) -> String) -> ParserError {
        super::parse(&edit(TINY)).unwrap_err()
    }
}
