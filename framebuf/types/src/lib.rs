/*!
    Shared types for the framebuf crates.

    This crate defines the vocabulary that crosses crate boundaries. It holds
    no conversion logic, so decoders can hand frames over by depending on it
    alone.

    # Layout Types

    - [`PixelFormat`] - Packed pixel formats of one to four channel tags
    - [`Layout`] - Pixel format plus signed row pitch

    # Decoder Handoff

    - [`DecodedFrame`] and [`VideoFormat`] - Decoded video frames and stream details
    - [`AudioData`] and [`AudioFormat`] - Decoded audio packets and stream details

    # Error Handling

    - [`Error`] and [`Result`] - Common error types
*/

mod error;
mod format;
mod frame;

pub use error::{Error, Result};
pub use format::{Layout, MAX_CHANNELS, MAX_WIDTH, PixelFormat, check_pitch};
pub use frame::{AudioData, AudioFormat, DecodedFrame, VideoFormat};
