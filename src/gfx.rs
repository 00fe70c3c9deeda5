//! In-memory model of an Adafruit GFX font: a shared bitmap buffer, a glyph table indexed by
//! `code - first` and the descriptor fields around them.

use core::fmt::Debug;
use std::{marker::PhantomData, ops::Range};

use thiserror::Error;

/// A font that passed [`RawFont::validate`]. Glyph extents of this type are always in bounds.
pub type Font = GfxFont<Validated>;
/// A font as it was read from its source, no guarantees about the offsets.
pub type RawFont = GfxFont<Unchecked>;

/// The code the Adafruit `fontconvert` tool starts its tables at.
pub const SPACE: u8 = 0x20;

#[allow(private_bounds)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GfxFont<T: FontValidation> {
    /// Base name of the declarations, `FreeSans9pt7b` for `FreeSans9pt7bBitmaps` and friends.
    pub name: String,
    pub bitmap: Vec<u8>,
    pub glyphs: Vec<Glyph>,
    /// Code of `glyphs[0]`.
    pub first: u8,
    /// Code of the last glyph, inclusive.
    pub last: u8,
    /// Newline distance, copied through untouched.
    pub y_advance: u8,

    _validation: PhantomData<T>,
}

/// Data stored per glyph. Offsets are from the cursor position to the upper left corner.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub bitmap_offset: u16,
    pub width: u8,
    pub height: u8,
    pub x_advance: u8,
    pub x_offset: i8,
    pub y_offset: i8,
}

impl Glyph {
    /// Bytes used by a `width * height` bitmap packed MSB first with no row padding.
    pub fn packed_len(&self) -> usize {
        (self.width as usize * self.height as usize + 7) / 8
    }

    /// Blank glyphs (space and every dropped glyph) draw nothing and own no bitmap bytes,
    /// whatever their offset says.
    pub fn is_blank(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[allow(private_bounds)]
impl<T: FontValidation> GfxFont<T> {
    /// Character code of the glyph at `index`.
    pub fn code_at(&self, index: usize) -> u32 {
        self.first as u32 + index as u32
    }

    /// The glyph for `code`, if the font covers it.
    pub fn glyph(&self, code: u32) -> Option<&Glyph> {
        let index = code.checked_sub(self.first as u32)?;
        self.glyphs.get(index as usize)
    }

    /// Byte range of the glyph at `index` inside [`Self::bitmap`].
    ///
    /// The format only stores start offsets, so a glyph ends where the next non-blank glyph
    /// starts, or at the end of the buffer for the last one. Either way it never claims more than
    /// its packed size: spare bytes between glyphs and trailing padding belong to nobody.
    pub fn extent(&self, index: usize) -> Range<usize> {
        let glyph = &self.glyphs[index];
        let start = glyph.bitmap_offset as usize;

        if glyph.is_blank() {
            return start..start;
        }

        let bound = self.glyphs[index + 1..]
            .iter()
            .find(|g| !g.is_blank())
            .map_or(self.bitmap.len(), |g| g.bitmap_offset as usize);

        start..bound.min(start + glyph.packed_len())
    }
}

impl RawFont {
    pub fn new(
        name: impl Into<String>,
        bitmap: Vec<u8>,
        glyphs: Vec<Glyph>,
        first: u8,
        last: u8,
        y_advance: u8,
    ) -> Self {
        Self {
            name: name.into(),
            bitmap,
            glyphs,
            first,
            last,
            y_advance,
            _validation: PhantomData,
        }
    }

    pub fn validate(self) -> Result<Font, FontValidationError> {
        use FontValidationError::*;

        if self.name.is_empty() {
            return Err(EmptyName);
        }

        if self.first > self.last {
            return Err(InvertedRange {
                first: self.first,
                last: self.last,
            });
        }

        let expected = (self.last - self.first) as usize + 1;
        if self.glyphs.len() != expected {
            return Err(GlyphCountMismatch {
                expected,
                actual: self.glyphs.len(),
            });
        }

        let mut previous: Option<(u32, usize)> = None;

        for (index, glyph) in self.glyphs.iter().enumerate() {
            let code = self.code_at(index);
            let offset = glyph.bitmap_offset as usize;

            if offset > self.bitmap.len() {
                return Err(OffsetOutOfBounds {
                    code,
                    offset,
                    len: self.bitmap.len(),
                });
            }

            if glyph.is_blank() {
                continue;
            }

            if let Some((previous_code, previous_offset)) = previous {
                if offset < previous_offset {
                    return Err(NonMonotonicOffset {
                        code,
                        offset,
                        previous_code,
                        previous_offset,
                    });
                }
            }
            previous = Some((code, offset));
        }

        // Extents are only meaningful once every offset is known to be ordered.
        for (index, glyph) in self.glyphs.iter().enumerate() {
            let available = self.extent(index).len();

            if available < glyph.packed_len() {
                return Err(TruncatedBitmap {
                    code: self.code_at(index),
                    needed: glyph.packed_len(),
                    available,
                });
            }
        }

        Ok(Font {
            name: self.name,
            bitmap: self.bitmap,
            glyphs: self.glyphs,
            first: self.first,
            last: self.last,
            y_advance: self.y_advance,
            _validation: PhantomData,
        })
    }
}

impl Font {
    /// Wraps data the caller built to be consistent, such as the compactor's output.
    pub(crate) fn assume_valid(
        name: String,
        bitmap: Vec<u8>,
        glyphs: Vec<Glyph>,
        first: u8,
        last: u8,
        y_advance: u8,
    ) -> Self {
        Self {
            name,
            bitmap,
            glyphs,
            first,
            last,
            y_advance,
            _validation: PhantomData,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FontValidationError {
    #[error("Font has no name")]
    EmptyName,
    #[error("Font range is inverted: first 0x{first:02X} is after last 0x{last:02X}")]
    InvertedRange { first: u8, last: u8 },
    #[error("Font range needs {expected} glyphs but the glyph table has {actual}")]
    GlyphCountMismatch { expected: usize, actual: usize },
    #[error("Glyph 0x{code:02X} starts at offset {offset}, past the {len} byte bitmap")]
    OffsetOutOfBounds { code: u32, offset: usize, len: usize },
    #[error(
        "Glyph 0x{code:02X} starts at offset {offset}, before glyph 0x{previous_code:02X} at {previous_offset}"
    )]
    NonMonotonicOffset {
        code: u32,
        offset: usize,
        previous_code: u32,
        previous_offset: usize,
    },
    #[error("Glyph 0x{code:02X} needs {needed} bitmap bytes but only {available} are available")]
    TruncatedBitmap {
        code: u32,
        needed: usize,
        available: usize,
    },
}

trait FontValidation: Clone + PartialEq + Eq + Debug {}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Validated;
impl FontValidation for Validated {}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Unchecked;
impl FontValidation for Unchecked {}
