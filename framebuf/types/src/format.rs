/*!
    Pixel format and row layout types.
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Maximum number of channel tags in a pixel format.
pub const MAX_CHANNELS: usize = 4;

/// Widest image whose tightly packed rows fit an `i32` pitch in every format.
pub const MAX_WIDTH: u32 = i32::MAX as u32 / MAX_CHANNELS as u32;

/**
    Packed 8-bit-per-channel pixel format.

    An ordered sequence of one to four distinct channel tags such as `R`, `G`,
    `B` or `A`. The number of tags is the number of bytes per pixel when rows
    are tightly packed. Tags are single ASCII symbols; parsing is
    case-insensitive and stores them uppercase.

    Tags carry no meaning beyond their identity: `"RGB"` and `"XYZ"` are
    both valid three-byte formats, and converting between them only moves
    bytes whose tags match.
*/
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PixelFormat {
    // Unused slots stay zero so derived equality and hashing hold.
    tags: [u8; MAX_CHANNELS],
    len: u8,
}

impl PixelFormat {
    /// Single luminance channel.
    pub const GRAY: Self = Self::from_tags(*b"L\0\0\0", 1);
    /// Packed RGB, 24bpp.
    pub const RGB: Self = Self::from_tags(*b"RGB\0", 3);
    /// Packed BGR, 24bpp.
    pub const BGR: Self = Self::from_tags(*b"BGR\0", 3);
    /// Packed RGBA, 32bpp.
    pub const RGBA: Self = Self::from_tags(*b"RGBA", 4);
    /// Packed BGRA, 32bpp (common for display on macOS/Windows).
    pub const BGRA: Self = Self::from_tags(*b"BGRA", 4);
    /// Packed ARGB, 32bpp.
    pub const ARGB: Self = Self::from_tags(*b"ARGB", 4);
    /// Packed ABGR, 32bpp.
    pub const ABGR: Self = Self::from_tags(*b"ABGR", 4);

    const fn from_tags(tags: [u8; MAX_CHANNELS], len: u8) -> Self {
        Self { tags, len }
    }

    /**
        Parse a format string such as `"rgb"` or `"ARGB"`.

        # Errors

        Returns [`Error::Format`] if the string is empty, has more than four
        tags, contains a non-ASCII or whitespace tag, or repeats a tag.
    */
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::format("format string is empty"));
        }

        let count = s.chars().count();
        if count > MAX_CHANNELS {
            return Err(Error::format(format!(
                "format {s:?} has {count} channels, at most {MAX_CHANNELS} are supported"
            )));
        }

        let mut tags = [0u8; MAX_CHANNELS];
        for (i, c) in s.chars().enumerate() {
            if !c.is_ascii_graphic() {
                return Err(Error::format(format!(
                    "format {s:?} has invalid channel tag {c:?}"
                )));
            }
            let tag = c.to_ascii_uppercase() as u8;
            if tags[..i].contains(&tag) {
                return Err(Error::format(format!(
                    "format {s:?} repeats channel tag {:?}",
                    tag as char
                )));
            }
            tags[i] = tag;
        }

        Ok(Self {
            tags,
            len: count as u8,
        })
    }

    /**
        Returns the number of channels (1-4).
    */
    pub const fn channels(self) -> usize {
        self.len as usize
    }

    /**
        Returns the number of bytes per pixel when tightly packed.
    */
    pub const fn bytes_per_pixel(self) -> usize {
        self.len as usize
    }

    /**
        Returns the channel tags in order, as uppercase ASCII bytes.
    */
    pub fn tags(&self) -> &[u8] {
        &self.tags[..self.len as usize]
    }

    /**
        Returns the zero-based position of `tag` in this format, if present.

        Lookup is case-insensitive.
    */
    pub fn position(&self, tag: u8) -> Option<usize> {
        let tag = tag.to_ascii_uppercase();
        self.tags().iter().position(|&t| t == tag)
    }

    /**
        Returns true if this format contains the given tag.
    */
    pub fn contains(&self, tag: u8) -> bool {
        self.position(tag).is_some()
    }

    /**
        Returns the tightly packed row size in bytes for `width` pixels.
    */
    pub const fn packed_pitch(self, width: u32) -> usize {
        width as usize * self.len as usize
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &tag in self.tags() {
            write!(f, "{}", tag as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PixelFormat({self})")
    }
}

impl FromStr for PixelFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for PixelFormat {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&String> for PixelFormat {
    type Error = Error;

    fn try_from(s: &String) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PixelFormat {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<PixelFormat> for String {
    fn from(format: PixelFormat) -> Self {
        format.to_string()
    }
}

/**
    Returns `pitch` unchanged, or [`Error::InvalidPitch`] if it is zero.

    The sign of a pitch is the only record of row orientation, so a zero
    pitch cannot describe any layout.
*/
pub fn check_pitch(pitch: i32) -> Result<i32> {
    if pitch == 0 {
        Err(Error::InvalidPitch { pitch })
    } else {
        Ok(pitch)
    }
}

/**
    Byte layout of an image: pixel format plus signed row pitch.

    A negative pitch means rows are stored top-to-bottom; a positive pitch
    means the first stored row is the visually lowest one.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layout {
    /// Pixel format of each row.
    pub format: PixelFormat,
    /// Signed byte stride between consecutive rows.
    pub pitch: i32,
}

impl Layout {
    /**
        Create a new layout.
    */
    pub const fn new(format: PixelFormat, pitch: i32) -> Self {
        Self { format, pitch }
    }

    /**
        Tightly packed, bottom-to-top layout for `width` pixels.

        Widths above [`MAX_WIDTH`] are clamped to it.
    */
    pub const fn packed(format: PixelFormat, width: u32) -> Self {
        let width = if width > MAX_WIDTH { MAX_WIDTH } else { width };
        Self {
            format,
            pitch: format.packed_pitch(width) as i32,
        }
    }

    /**
        Tightly packed layout for `width` pixels with the row order of `pitch`.

        A zero `pitch` keeps the bottom-to-top order. Widths above
        [`MAX_WIDTH`] are clamped to it.
    */
    pub const fn tight(format: PixelFormat, width: u32, pitch: i32) -> Self {
        let packed = Self::packed(format, width);
        if pitch < 0 { packed.flipped() } else { packed }
    }

    /**
        Number of bytes in each stored row.
    */
    pub const fn row_bytes(self) -> usize {
        self.pitch.unsigned_abs() as usize
    }

    /**
        Returns true if rows are stored top-to-bottom.
    */
    pub const fn is_top_down(self) -> bool {
        self.pitch < 0
    }

    /**
        Same layout with the opposite row order.
    */
    pub const fn flipped(self) -> Self {
        Self {
            format: self.format,
            pitch: self.pitch.saturating_neg(),
        }
    }

    /**
        Total byte length of an image with `height` rows in this layout.
    */
    pub const fn len_for(self, height: u32) -> usize {
        height as usize * self.row_bytes()
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.format, self.pitch)
    }
}
