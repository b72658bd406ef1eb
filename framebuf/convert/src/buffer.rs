/*!
    Owned pixel buffer with lazy, cached layout conversion.
*/

use std::borrow::Cow;

use framebuf_types::{DecodedFrame, Error, Layout, MAX_WIDTH, PixelFormat, Result, check_pitch};
use tracing::{debug, trace};

use crate::region::Region;
use crate::{rows, swizzle};

/**
    Resolve anything that converts into a [`PixelFormat`].

    Accepts `PixelFormat` itself as well as `&str` and `String`, so format
    strings can be passed directly and fail with [`Error::Format`].
*/
pub(crate) fn to_format<F>(format: F) -> Result<PixelFormat>
where
    F: TryInto<PixelFormat>,
    Error: From<F::Error>,
{
    Ok(format.try_into()?)
}

/**
    Convert `data` from one layout to another.

    Channel mapping always happens before pitch transcoding. Returns the input
    borrowed when the layouts are equal.
*/
pub(crate) fn convert(data: &[u8], width: u32, from: Layout, to: Layout) -> Cow<'_, [u8]> {
    if from == to {
        return Cow::Borrowed(data);
    }

    trace!(%from, %to, width, bytes = data.len(), "converting image data");

    let mut out = Cow::Borrowed(data);
    let mut pitch = from.pitch;
    if from.format != to.format {
        let (mapped, mapped_pitch) =
            swizzle::convert_channels(&out, width, pitch, from.format, to.format);
        out = Cow::Owned(mapped);
        pitch = mapped_pitch;
    }
    if pitch != to.pitch {
        let packed = to.format.packed_pitch(width);
        out = Cow::Owned(rows::transcode(&out, packed, pitch, to.pitch));
    }
    out
}

/**
    A decoded image held as raw bytes in a packed pixel format.

    The buffer tracks two layouts:

    - the *current* layout, describing the bytes actually stored, and
    - the *canonical* layout, the one [`data`](Self::data) presents.

    [`get_data`](Self::get_data) is a read-only projection into any layout and
    never changes what is stored. [`data`](Self::data) converts into the
    canonical layout once and keeps the result, so repeated reads are free.

    The stored bytes always satisfy `len == height * |pitch|`.

    Mutation needs `&mut self`; wrap the buffer in a
    [`SharedImageBuffer`](crate::SharedImageBuffer) to share it between
    threads.
*/
#[derive(Clone, Debug)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    current: Layout,
    data: Vec<u8>,
    canonical: Layout,
    generation: u64,
}

impl ImageBuffer {
    /**
        Create a buffer from raw bytes.

        When `pitch` is `None` the rows are taken to be tightly packed and
        stored bottom-to-top (`width * bytes per pixel`). The canonical
        layout starts out equal to the given layout.

        # Errors

        - [`Error::Format`] if `format` is not a valid format string.
        - [`Error::InvalidDimensions`] if `width` or `height` is zero, or
          `width` exceeds [`MAX_WIDTH`].
        - [`Error::InvalidPitch`] if `pitch` is `Some(0)`.
        - [`Error::InvalidData`] if `data` is not `height * |pitch|` bytes.
    */
    pub fn new<F>(
        width: u32,
        height: u32,
        format: F,
        pitch: Option<i32>,
        data: Vec<u8>,
    ) -> Result<Self>
    where
        F: TryInto<PixelFormat>,
        Error: From<F::Error>,
    {
        let format = to_format(format)?;
        if width == 0 || height == 0 || width > MAX_WIDTH {
            return Err(Error::InvalidDimensions { width, height });
        }
        let layout = match pitch {
            Some(pitch) => Layout::new(format, check_pitch(pitch)?),
            None => Layout::packed(format, width),
        };
        check_len(layout, height, &data)?;
        Ok(Self::from_parts(width, height, layout, data))
    }

    /**
        Create a buffer holding a frame delivered by a decoder.
    */
    pub fn from_frame(frame: DecodedFrame) -> Result<Self> {
        Self::new(
            frame.width,
            frame.height,
            frame.format,
            Some(frame.pitch),
            frame.data,
        )
    }

    /**
        Assemble a buffer whose data is already known to match `layout`.
    */
    pub(crate) fn from_parts(width: u32, height: u32, layout: Layout, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), layout.len_for(height));
        Self {
            width,
            height,
            current: layout,
            data,
            canonical: layout,
            generation: 0,
        }
    }

    /**
        Width of the image in pixels.
    */
    pub fn width(&self) -> u32 {
        self.width
    }

    /**
        Height of the image in pixels.
    */
    pub fn height(&self) -> u32 {
        self.height
    }

    /**
        Pixel format of the stored bytes.
    */
    pub fn format(&self) -> PixelFormat {
        self.current.format
    }

    /**
        Pitch of the stored bytes.
    */
    pub fn pitch(&self) -> i32 {
        self.current.pitch
    }

    /**
        Layout of the stored bytes.
    */
    pub fn layout(&self) -> Layout {
        self.current
    }

    /**
        Layout presented by [`data`](Self::data).
    */
    pub fn canonical_layout(&self) -> Layout {
        self.canonical
    }

    /**
        Counter bumped whenever the stored bytes are replaced.

        Anything derived from the pixels (uploaded textures, encoded
        thumbnails) should be rebuilt when this changes.
    */
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /**
        The stored bytes, in the current layout, without any conversion.
    */
    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    /**
        Consume the buffer, returning the stored bytes.
    */
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /**
        Returns the image in the requested format and pitch.

        Borrows the stored bytes when the request matches the current layout;
        otherwise converts into a new allocation. The buffer is never
        modified, even when a conversion happens.

        # Errors

        - [`Error::Format`] if `format` is not a valid format string.
        - [`Error::InvalidPitch`] if `pitch` is zero.
    */
    pub fn get_data<F>(&self, format: F, pitch: i32) -> Result<Cow<'_, [u8]>>
    where
        F: TryInto<PixelFormat>,
        Error: From<F::Error>,
    {
        let layout = Layout::new(to_format(format)?, check_pitch(pitch)?);
        Ok(self.get_layout(layout))
    }

    /**
        Like [`get_data`](Self::get_data), with an already validated layout.
    */
    pub fn get_layout(&self, layout: Layout) -> Cow<'_, [u8]> {
        convert(&self.data, self.width, self.current, layout)
    }

    /**
        Replace the stored bytes.

        The caller asserts that `data` is laid out as `format` and `pitch`;
        only its length is checked. The canonical layout is left alone, so
        the next [`data`](Self::data) read converts if they differ.

        # Errors

        - [`Error::Format`] if `format` is not a valid format string.
        - [`Error::InvalidPitch`] if `pitch` is zero.
        - [`Error::InvalidData`] if `data` is not `height * |pitch|` bytes.
    */
    pub fn set_data<F>(&mut self, format: F, pitch: i32, data: Vec<u8>) -> Result<()>
    where
        F: TryInto<PixelFormat>,
        Error: From<F::Error>,
    {
        let layout = Layout::new(to_format(format)?, check_pitch(pitch)?);
        check_len(layout, self.height, &data)?;
        self.current = layout;
        self.data = data;
        self.generation += 1;
        Ok(())
    }

    /**
        Change the layout presented by [`data`](Self::data).

        No bytes are touched; conversion is deferred until the next read.

        # Errors

        - [`Error::Format`] if `format` is not a valid format string.
        - [`Error::InvalidPitch`] if `pitch` is zero.
    */
    pub fn set_canonical_layout<F>(&mut self, format: F, pitch: i32) -> Result<()>
    where
        F: TryInto<PixelFormat>,
        Error: From<F::Error>,
    {
        self.canonical = Layout::new(to_format(format)?, check_pitch(pitch)?);
        Ok(())
    }

    /**
        Returns the image in the canonical layout.

        If the stored bytes are in a different layout they are converted once
        and stored, making the canonical layout the current one. Later reads
        return the stored bytes directly.
    */
    pub fn data(&mut self) -> &[u8] {
        if self.current != self.canonical {
            debug!(
                from = %self.current,
                to = %self.canonical,
                "refreshing canonical image data"
            );
            let converted = convert(&self.data, self.width, self.current, self.canonical);
            self.data = converted.into_owned();
            self.current = self.canonical;
        }
        &self.data
    }

    /**
        Replace the stored bytes with data in the canonical layout.

        Bumps the [`generation`](Self::generation) so derived caches are
        rebuilt.

        # Errors

        Returns [`Error::InvalidData`] if `data` is not `height * |pitch|`
        bytes for the canonical pitch.
    */
    pub fn set_canonical_data(&mut self, data: Vec<u8>) -> Result<()> {
        check_len(self.canonical, self.height, &data)?;
        self.current = self.canonical;
        self.data = data;
        self.generation += 1;
        Ok(())
    }

    /**
        Returns a lazy view of a sub-rectangle of this image.

        `x` and `y` address pixels in stored row order: with a positive pitch
        row 0 is the bottom of the image. Nothing is copied until the region
        is read.

        # Errors

        Returns [`Error::RegionOutOfBounds`] if the rectangle is empty or does
        not fit inside this image.
    */
    pub fn get_region(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Region<'_>> {
        Region::new(self, x, y, width, height)
    }
}

fn check_len(layout: Layout, height: u32, data: &[u8]) -> Result<()> {
    let expected = layout.len_for(height);
    if data.len() != expected {
        return Err(Error::InvalidData {
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

// Ensure buffers can move between threads
static_assertions::assert_impl_all!(ImageBuffer: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: [u8; 12] = [10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120];

    fn sample() -> ImageBuffer {
        ImageBuffer::new(2, 2, "RGB", Some(6), DATA.to_vec()).unwrap()
    }

    #[test]
    fn default_pitch_is_packed() {
        let buffer = ImageBuffer::new(2, 2, "rgb", None, DATA.to_vec()).unwrap();
        assert_eq!(buffer.pitch(), 6);
        assert_eq!(buffer.format(), PixelFormat::RGB);
        assert_eq!(buffer.canonical_layout(), buffer.layout());
    }

    #[test]
    fn new_validates_inputs() {
        assert!(matches!(
            ImageBuffer::new(0, 2, "RGB", None, vec![]),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(matches!(
            ImageBuffer::new(2, 2, "RGB", Some(0), vec![]),
            Err(Error::InvalidPitch { pitch: 0 })
        ));
        assert!(matches!(
            ImageBuffer::new(2, 2, "RGB", Some(6), vec![0; 10]),
            Err(Error::InvalidData {
                expected: 12,
                actual: 10
            })
        ));
        assert!(
            ImageBuffer::new(1, 1, "RGBAX", None, vec![0; 5])
                .unwrap_err()
                .is_format()
        );
    }

    #[test]
    fn new_rejects_width_without_i32_pitch() {
        // 2^29 pixels of RGBA would need a 2^31 byte pitch.
        assert_eq!(
            ImageBuffer::new(MAX_WIDTH + 1, 1, "L", Some(-1), vec![7]).unwrap_err(),
            Error::InvalidDimensions {
                width: 536_870_912,
                height: 1
            }
        );
        let widest = ImageBuffer::new(MAX_WIDTH, 1, "L", Some(-1), vec![7]).unwrap();
        assert_eq!(&*widest.get_data("L", -1).unwrap(), &[7]);
    }

    #[test]
    fn from_frame_keeps_layout() {
        let frame = DecodedFrame::new(DATA.to_vec(), 2, 2, PixelFormat::RGB, -6, None);
        let buffer = ImageBuffer::from_frame(frame).unwrap();
        assert_eq!(buffer.layout(), Layout::new(PixelFormat::RGB, -6));
        assert_eq!(buffer.raw_data(), DATA);
    }

    #[test]
    fn get_data_identity_borrows() {
        let buffer = sample();
        let data = buffer.get_data("RGB", 6).unwrap();
        assert!(matches!(data, Cow::Borrowed(_)));
        assert_eq!(&*data, DATA);
    }

    #[test]
    fn get_data_maps_then_pads() {
        let buffer = sample();
        let data = buffer.get_data("ARGB", 8).unwrap();
        assert_eq!(
            &*data,
            [10, 10, 20, 30, 40, 40, 50, 60, 70, 70, 80, 90, 100, 100, 110, 120]
        );
    }

    #[test]
    fn get_data_maps_then_flips() {
        let buffer = sample();
        let data = buffer.get_data(PixelFormat::BGR, -6).unwrap();
        assert_eq!(&*data, [90, 80, 70, 120, 110, 100, 30, 20, 10, 60, 50, 40]);
    }

    #[test]
    fn get_data_does_not_mutate() {
        let buffer = sample();
        let _ = buffer.get_data("BGR", -10).unwrap();
        assert_eq!(buffer.layout(), Layout::new(PixelFormat::RGB, 6));
        assert_eq!(buffer.raw_data(), DATA);
        assert_eq!(buffer.generation(), 0);
    }

    #[test]
    fn get_data_rejects_bad_requests() {
        let buffer = sample();
        assert!(buffer.get_data("RGBAX", 6).unwrap_err().is_format());
        assert_eq!(
            buffer.get_data("RGB", 0).unwrap_err(),
            Error::InvalidPitch { pitch: 0 }
        );
    }

    #[test]
    fn set_data_replaces_state() {
        let mut buffer = sample();
        buffer.set_data("BGRA", -8, vec![1; 16]).unwrap();
        assert_eq!(buffer.layout(), Layout::new(PixelFormat::BGRA, -8));
        assert_eq!(buffer.raw_data(), [1; 16]);
        assert_eq!(buffer.generation(), 1);
    }

    #[test]
    fn set_data_failure_leaves_state() {
        let mut buffer = sample();
        assert!(buffer.set_data("RGBAX", 10, vec![0; 20]).is_err());
        assert!(buffer.set_data("RGBA", 8, vec![0; 15]).is_err());
        assert_eq!(buffer.layout(), Layout::new(PixelFormat::RGB, 6));
        assert_eq!(buffer.raw_data(), DATA);
        assert_eq!(buffer.generation(), 0);
    }

    #[test]
    fn canonical_read_converts_once() {
        let mut buffer = sample();
        buffer.set_canonical_layout("RGB", -6).unwrap();
        // Deferred: nothing happens until read.
        assert_eq!(buffer.pitch(), 6);

        let data = buffer.data().to_vec();
        assert_eq!(data, [70, 80, 90, 100, 110, 120, 10, 20, 30, 40, 50, 60]);
        assert_eq!(buffer.layout(), Layout::new(PixelFormat::RGB, -6));
        assert_eq!(buffer.raw_data(), data);
        // Converting for the canonical view is not a content change.
        assert_eq!(buffer.generation(), 0);
    }

    #[test]
    fn canonical_read_after_set_data() {
        let mut buffer = sample();
        buffer
            .set_data("BGR", 6, vec![30, 20, 10, 60, 50, 40, 90, 80, 70, 120, 110, 100])
            .unwrap();
        assert_eq!(buffer.data(), DATA);
        assert_eq!(buffer.format(), PixelFormat::RGB);
    }

    #[test]
    fn canonical_write() {
        let mut buffer = sample();
        buffer.set_canonical_layout("L", 2).unwrap();
        buffer.set_canonical_data(vec![1, 2, 3, 4]).unwrap();
        assert_eq!(buffer.layout(), Layout::new(PixelFormat::GRAY, 2));
        assert_eq!(buffer.data(), [1, 2, 3, 4]);
        assert_eq!(buffer.generation(), 1);

        assert!(matches!(
            buffer.set_canonical_data(vec![1, 2, 3]),
            Err(Error::InvalidData { .. })
        ));
        assert_eq!(buffer.generation(), 1);
    }
}
