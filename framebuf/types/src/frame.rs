/*!
    Frame and packet types delivered by an external decoder.
*/

use std::fmt;
use std::time::Duration;

use crate::{Layout, PixelFormat};

/**
    Video stream details.

    The sample aspect is the aspect ratio of a single pixel and has no
    relation to the aspect ratio of the image. A 640x480 image with sample
    aspect 2.0 should be displayed at 1280x480; scaling for display is the
    responsibility of the application.
*/
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoFormat {
    /// Width of the video image in pixels.
    pub width: u32,
    /// Height of the video image in pixels.
    pub height: u32,
    /// Aspect ratio (width over height) of a single pixel.
    pub sample_aspect: f32,
}

impl VideoFormat {
    /**
        Create a video format with square pixels.
    */
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sample_aspect: 1.0,
        }
    }

    /**
        Create a video format with the given sample aspect.
    */
    pub const fn with_sample_aspect(width: u32, height: u32, sample_aspect: f32) -> Self {
        Self {
            width,
            height,
            sample_aspect,
        }
    }

    /**
        Returns the size the image should be displayed at, widening or
        narrowing by the sample aspect.
    */
    pub fn display_size(&self) -> (u32, u32) {
        let width = (self.width as f32 * self.sample_aspect).round() as u32;
        (width, self.height)
    }
}

/**
    A single decoded video frame in a packed pixel format.

    `data` is laid out according to `format` and `pitch`, and is expected
    to be `height * |pitch|` bytes long.
*/
#[derive(Clone, Debug)]
pub struct DecodedFrame {
    /// Raw pixel data.
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format of the data.
    pub format: PixelFormat,
    /// Signed row pitch of the data.
    pub pitch: i32,
    /// Presentation time (None for frames without timing).
    pub timestamp: Option<Duration>,
}

impl DecodedFrame {
    /**
        Create a new decoded frame.
    */
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        pitch: i32,
        timestamp: Option<Duration>,
    ) -> Self {
        Self {
            data,
            width,
            height,
            format,
            pitch,
            timestamp,
        }
    }

    /**
        Returns the byte layout of this frame.
    */
    pub fn layout(&self) -> Layout {
        Layout::new(self.format, self.pitch)
    }

    /**
        Returns the expected data length in bytes.
    */
    pub fn expected_data_len(&self) -> usize {
        self.layout().len_for(self.height)
    }
}

/**
    Audio stream details.

    Carried alongside decoded frames for surrounding code; nothing in the
    framebuf crates processes audio.
*/
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioFormat {
    /// Number of channels: 1 for mono, 2 for stereo.
    pub channels: u16,
    /// Bits per sample.
    pub sample_size: u16,
    /// Samples per second, in Hz.
    pub sample_rate: u32,
}

impl AudioFormat {
    /**
        Create a new audio format.
    */
    pub const fn new(channels: u16, sample_size: u16, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_size,
            sample_rate,
        }
    }

    /**
        Returns the number of bytes for one sample across all channels.
    */
    pub const fn bytes_per_sample(self) -> usize {
        (self.sample_size as usize >> 3) * self.channels as usize
    }

    /**
        Returns the number of bytes for one second of audio.
    */
    pub const fn bytes_per_second(self) -> usize {
        self.bytes_per_sample() * self.sample_rate as usize
    }
}

impl fmt::Debug for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AudioFormat(channels={}, sample_size={}, sample_rate={})",
            self.channels, self.sample_size, self.sample_rate
        )
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/**
    A single packet of decoded audio.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct AudioData {
    /// Sample data, interleaved.
    pub data: Vec<u8>,
    /// Time of the first sample.
    pub timestamp: Duration,
    /// Total duration of the packet.
    pub duration: Duration,
}

impl AudioData {
    /**
        Create a new audio packet.
    */
    pub fn new(data: Vec<u8>, timestamp: Duration, duration: Duration) -> Self {
        Self {
            data,
            timestamp,
            duration,
        }
    }

    /**
        Size of the sample data in bytes.
    */
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /**
        Returns true if the packet holds no samples.
    */
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /**
        Returns the time just after the last sample.
    */
    pub fn end_time(&self) -> Duration {
        self.timestamp + self.duration
    }
}

// Ensure frames are Send + Sync
static_assertions::assert_impl_all!(DecodedFrame: Send, Sync);
static_assertions::assert_impl_all!(AudioData: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_format_display_size() {
        assert_eq!(VideoFormat::new(640, 480).display_size(), (640, 480));
        assert_eq!(
            VideoFormat::with_sample_aspect(640, 480, 2.0).display_size(),
            (1280, 480)
        );
    }

    #[test]
    fn decoded_frame_layout() {
        let frame = DecodedFrame::new(
            vec![0u8; 4 * 8],
            2,
            4,
            PixelFormat::BGRA,
            -8,
            Some(Duration::from_millis(40)),
        );

        assert_eq!(frame.layout(), Layout::new(PixelFormat::BGRA, -8));
        assert_eq!(frame.expected_data_len(), frame.data.len());
    }

    #[test]
    fn audio_format_byte_rates() {
        let format = AudioFormat::new(2, 16, 48000);
        assert_eq!(format.bytes_per_sample(), 4);
        assert_eq!(format.bytes_per_second(), 192_000);

        let mono8 = AudioFormat::new(1, 8, 22050);
        assert_eq!(mono8.bytes_per_sample(), 1);
    }

    #[test]
    fn audio_format_equality_and_display() {
        assert_eq!(AudioFormat::new(2, 16, 48000), AudioFormat::new(2, 16, 48000));
        assert_ne!(AudioFormat::new(2, 16, 48000), AudioFormat::new(1, 16, 48000));
        assert_eq!(
            AudioFormat::new(2, 16, 48000).to_string(),
            "AudioFormat(channels=2, sample_size=16, sample_rate=48000)"
        );
    }

    #[test]
    fn audio_data_timing() {
        let packet = AudioData::new(
            vec![0u8; 4096],
            Duration::from_millis(500),
            Duration::from_millis(20),
        );

        assert_eq!(packet.len(), 4096);
        assert!(!packet.is_empty());
        assert_eq!(packet.end_time(), Duration::from_millis(520));
    }
}
