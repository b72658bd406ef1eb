/*!
    Error types for the framebuf crates.
*/

use std::convert::Infallible;

use thiserror::Error;

/**
    Error type for the framebuf crates.

    Lossy conversions (cropping rows to a shorter pitch, filling a missing
    channel from the first source channel) are not errors and never
    surface here.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Format string is empty, has more than four tags, or repeats a tag.
    #[error("format error: {message}")]
    Format { message: String },
    /// Pitch of zero, which has no orientation.
    #[error("invalid pitch: {pitch}")]
    InvalidPitch { pitch: i32 },
    /// Width or height of zero, or a width too large for an `i32` pitch.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// Byte length does not match `height * |pitch|`.
    #[error("invalid data: expected {expected} bytes, got {actual}")]
    InvalidData { expected: usize, actual: usize },
    /// Region does not fit inside its parent.
    #[error(
        "region {width}x{height} at ({x}, {y}) exceeds parent bounds {parent_width}x{parent_height}"
    )]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        parent_width: u32,
        parent_height: u32,
    },
}

impl From<Infallible> for Error {
    fn from(e: Infallible) -> Self {
        match e {}
    }
}

impl Error {
    /**
        Create a format error with the given message.
    */
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /**
        Returns true if this is a format error.
    */
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

/**
    Result type alias for the framebuf crates.
*/
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let e = Error::format("too many channels");
        assert_eq!(format!("{e}"), "format error: too many channels");

        let e = Error::InvalidPitch { pitch: 0 };
        assert_eq!(format!("{e}"), "invalid pitch: 0");

        let e = Error::InvalidData {
            expected: 12,
            actual: 10,
        };
        assert_eq!(format!("{e}"), "invalid data: expected 12 bytes, got 10");

        let e = Error::RegionOutOfBounds {
            x: 1,
            y: 1,
            width: 2,
            height: 2,
            parent_width: 2,
            parent_height: 2,
        };
        assert_eq!(
            format!("{e}"),
            "region 2x2 at (1, 1) exceeds parent bounds 2x2"
        );
    }

    #[test]
    fn error_is_format() {
        assert!(Error::format("x").is_format());
        assert!(!Error::InvalidPitch { pitch: 0 }.is_format());
    }
}
