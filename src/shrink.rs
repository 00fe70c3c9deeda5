//! Drops the glyphs nobody asked for and repacks the bitmap buffer around the rest.

use std::{collections::BTreeSet, convert::Infallible, str::FromStr};

use thiserror::Error;

use crate::gfx::{Font, Glyph, SPACE};

/// The characters to keep. Membership is exact equality on the code point.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WantedSet(BTreeSet<u32>);

impl WantedSet {
    pub fn contains(&self, code: u32) -> bool {
        self.0.contains(&code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<char> for WantedSet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Self(iter.into_iter().map(u32::from).collect())
    }
}

impl FromStr for WantedSet {
    type Err = Infallible;

    /// Every character of the string is wanted, duplicates are harmless.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.chars().collect())
    }
}

/// Metrics given to every dropped glyph. Dropped glyphs have no bitmap, so these only matter if
/// the firmware still prints one of them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BlankGlyph {
    pub x_advance: u8,
    pub y_offset: i8,
}

impl BlankGlyph {
    /// Borrows the font's own idea of an empty glyph: its space if it has one, otherwise the first
    /// glyph without a bitmap.
    pub fn from_font(font: &Font) -> Self {
        font.glyph(SPACE as u32)
            .or_else(|| font.glyphs.iter().find(|g| g.is_blank()))
            .map(|g| Self {
                x_advance: g.x_advance,
                y_offset: g.y_offset,
            })
            .unwrap_or_default()
    }

    fn glyph(self) -> Glyph {
        Glyph {
            bitmap_offset: 0,
            width: 0,
            height: 0,
            x_advance: self.x_advance,
            x_offset: 0,
            y_offset: self.y_offset,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShrinkError {
    #[error("No characters were requested")]
    EmptyWantedSet,
    #[error(
        "None of the {requested} requested characters are in the font's range 0x{first:02X}..=0x{last:02X}"
    )]
    NothingSelected { requested: usize, first: u8, last: u8 },
    #[error("Glyph bitmap would start at offset {0}, past what a 16 bit offset can address")]
    BitmapTooLarge(usize),
}

/// Keeps only the `wanted` glyphs of `font`.
///
/// The result is a font in its own right: offset 0 of its bitmap is a reserved blank byte shared
/// by every dropped glyph, the kept bitmaps follow in code order, and its glyph table only spans
/// the lowest to the highest kept code.
pub fn shrink(font: &Font, wanted: &WantedSet, blank: BlankGlyph) -> Result<Font, ShrinkError> {
    if wanted.is_empty() {
        return Err(ShrinkError::EmptyWantedSet);
    }

    let mut bitmap = Vec::with_capacity(font.bitmap.len() + 1);
    bitmap.push(0x00);

    let mut glyphs = Vec::with_capacity(font.glyphs.len());
    let mut usable: Option<(usize, usize)> = None;
    let mut kept = 0;

    for (index, source) in font.glyphs.iter().enumerate() {
        let code = font.code_at(index);

        if !wanted.contains(code) {
            trace!("Dropping glyph 0x{code:02X}");
            glyphs.push(blank.glyph());
            continue;
        }

        let extent = font.extent(index);
        let bitmap_offset =
            u16::try_from(bitmap.len()).map_err(|_| ShrinkError::BitmapTooLarge(bitmap.len()))?;

        debug!(
            "Keeping glyph 0x{code:02X}: {} bytes from {} moved to {bitmap_offset}",
            extent.len(),
            extent.start
        );

        bitmap.extend_from_slice(&font.bitmap[extent]);
        glyphs.push(Glyph {
            bitmap_offset,
            ..*source
        });

        kept += 1;
        usable = Some(match usable {
            Some((first, _)) => (first, index),
            None => (index, index),
        });
    }

    let Some((first, last)) = usable else {
        return Err(ShrinkError::NothingSelected {
            requested: wanted.len(),
            first: font.first,
            last: font.last,
        });
    };

    info!(
        "Kept {} of {} glyphs, bitmap shrunk from {} to {} bytes",
        kept,
        font.glyphs.len(),
        font.bitmap.len(),
        bitmap.len()
    );

    glyphs.truncate(last + 1);
    glyphs.drain(..first);

    Ok(Font::assume_valid(
        font.name.clone(),
        bitmap,
        glyphs,
        font.first + first as u8,
        font.first + last as u8,
        font.y_advance,
    ))
}
