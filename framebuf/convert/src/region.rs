/*!
    Lazy sub-rectangle views over an [`ImageBuffer`].
*/

use std::borrow::Cow;

use framebuf_types::{Error, Layout, PixelFormat, Result};
use tracing::debug;

use crate::buffer::ImageBuffer;

#[derive(Clone, Debug)]
enum State<'a> {
    Pending {
        parent: &'a ImageBuffer,
        x: u32,
        y: u32,
    },
    Materialized(ImageBuffer),
}

/**
    A rectangular view into an [`ImageBuffer`].

    A region borrows its parent and copies nothing until its data is first
    read. At that point the rectangle is cut out into an independent
    [`ImageBuffer`] in the parent's format with a tight, positive pitch,
    the origin resets to `(0, 0)`, and the parent is released. From then on
    the region behaves exactly like that buffer.

    Regions of a pending region compose their offsets against the original
    parent, so the parent is only cropped once.
*/
#[derive(Clone, Debug)]
pub struct Region<'a> {
    state: State<'a>,
    width: u32,
    height: u32,
}

impl<'a> Region<'a> {
    pub(crate) fn new(
        parent: &'a ImageBuffer,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        check_bounds(x, y, width, height, parent.width(), parent.height())?;
        Ok(Self {
            state: State::Pending { parent, x, y },
            width,
            height,
        })
    }

    /**
        Left edge of the region within its parent; zero once materialized.
    */
    pub fn x(&self) -> u32 {
        match self.state {
            State::Pending { x, .. } => x,
            State::Materialized(_) => 0,
        }
    }

    /**
        Row offset of the region within its parent; zero once materialized.
    */
    pub fn y(&self) -> u32 {
        match self.state {
            State::Pending { y, .. } => y,
            State::Materialized(_) => 0,
        }
    }

    /**
        Width of the region in pixels.
    */
    pub fn width(&self) -> u32 {
        self.width
    }

    /**
        Height of the region in pixels.
    */
    pub fn height(&self) -> u32 {
        self.height
    }

    /**
        Returns true once the region owns its own bytes.
    */
    pub fn is_materialized(&self) -> bool {
        matches!(self.state, State::Materialized(_))
    }

    /**
        The buffer this region still borrows from, if not yet materialized.
    */
    pub fn parent(&self) -> Option<&'a ImageBuffer> {
        match self.state {
            State::Pending { parent, .. } => Some(parent),
            State::Materialized(_) => None,
        }
    }

    /**
        Returns a region of this region.

        Offsets are relative to this region. Before materialization they are
        added to this region's offsets and resolved against the original
        parent; afterwards they address the materialized buffer.

        # Errors

        Returns [`Error::RegionOutOfBounds`] if the rectangle is empty or does
        not fit inside this region.
    */
    pub fn get_region(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Region<'_>> {
        check_bounds(x, y, width, height, self.width, self.height)?;
        match &self.state {
            State::Pending {
                parent,
                x: px,
                y: py,
            } => Region::new(*parent, px + x, py + y, width, height),
            State::Materialized(buffer) => Region::new(buffer, x, y, width, height),
        }
    }

    /**
        Crop the region out of its parent, returning an independent buffer.
    */
    pub fn materialize(self) -> ImageBuffer {
        match self.state {
            State::Pending { parent, x, y } => crop(parent, x, y, self.width, self.height),
            State::Materialized(buffer) => buffer,
        }
    }

    /**
        Materialize in place if needed and return the owned buffer.
    */
    pub fn buffer(&mut self) -> &mut ImageBuffer {
        if let State::Pending { parent, x, y } = self.state {
            self.state = State::Materialized(crop(parent, x, y, self.width, self.height));
        }
        match &mut self.state {
            State::Materialized(buffer) => buffer,
            State::Pending { .. } => unreachable!("region was just materialized"),
        }
    }

    /**
        Pixel format of the region's data.
    */
    pub fn format(&self) -> PixelFormat {
        match &self.state {
            State::Pending { parent, .. } => parent.format(),
            State::Materialized(buffer) => buffer.format(),
        }
    }

    /**
        Returns the region in the requested format and pitch.

        Materializes the region first; see [`ImageBuffer::get_data`].
    */
    pub fn get_data<F>(&mut self, format: F, pitch: i32) -> Result<Cow<'_, [u8]>>
    where
        F: TryInto<PixelFormat>,
        Error: From<F::Error>,
    {
        self.buffer().get_data(format, pitch)
    }

    /**
        Replace the region's data.

        The region stops referring to its parent: `data` is taken as the
        whole content of the region, laid out as `format` and `pitch`.
    */
    pub fn set_data<F>(&mut self, format: F, pitch: i32, data: Vec<u8>) -> Result<()>
    where
        F: TryInto<PixelFormat>,
        Error: From<F::Error>,
    {
        if let State::Materialized(buffer) = &mut self.state {
            return buffer.set_data(format, pitch, data);
        }
        let buffer = ImageBuffer::new(self.width, self.height, format, Some(pitch), data)?;
        self.state = State::Materialized(buffer);
        Ok(())
    }

    /**
        Returns the region in its canonical layout.

        Materializes the region first; see [`ImageBuffer::data`].
    */
    pub fn data(&mut self) -> &[u8] {
        self.buffer().data()
    }

    /**
        Replace the region's data with bytes in its canonical layout.

        Materializes the region first; see [`ImageBuffer::set_canonical_data`].
    */
    pub fn set_canonical_data(&mut self, data: Vec<u8>) -> Result<()> {
        self.buffer().set_canonical_data(data)
    }
}

impl From<Region<'_>> for ImageBuffer {
    fn from(region: Region<'_>) -> Self {
        region.materialize()
    }
}

fn check_bounds(
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    parent_width: u32,
    parent_height: u32,
) -> Result<()> {
    let fits = |offset: u32, len: u32, max: u32| {
        len > 0 && offset.checked_add(len).is_some_and(|end| end <= max)
    };
    if fits(x, width, parent_width) && fits(y, height, parent_height) {
        Ok(())
    } else {
        Err(Error::RegionOutOfBounds {
            x,
            y,
            width,
            height,
            parent_width,
            parent_height,
        })
    }
}

/**
    Copy a rectangle out of `parent` into a new tightly packed buffer.

    The parent is first brought to a tightly packed version of its current
    format, keeping its row order, so rows and columns can be sliced
    directly. The result always has a positive pitch.
*/
fn crop(parent: &ImageBuffer, x: u32, y: u32, width: u32, height: u32) -> ImageBuffer {
    let current = parent.layout();
    let format = current.format;
    let bpp = format.bytes_per_pixel();
    let packed = format.packed_pitch(parent.width());
    let tight = Layout::tight(format, parent.width(), current.pitch);

    debug!(
        x,
        y,
        width,
        height,
        parent = %current,
        "materializing region"
    );

    let source = parent.get_layout(tight);
    let start = x as usize * bpp;
    let end = (x + width) as usize * bpp;

    let mut data = Vec::with_capacity(format.packed_pitch(width) * height as usize);
    for row in source
        .chunks_exact(packed)
        .skip(y as usize)
        .take(height as usize)
    {
        data.extend_from_slice(&row[start..end]);
    }

    ImageBuffer::from_parts(width, height, Layout::packed(format, width), data)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3x3 RGB, one byte value per pixel repeated across channels, rows
    // padded to 12 bytes with 0xee.
    fn padded_3x3() -> ImageBuffer {
        let mut data = Vec::new();
        for row in 0..3u8 {
            for col in 0..3u8 {
                let v = row * 10 + col;
                data.extend_from_slice(&[v, v, v]);
            }
            data.extend_from_slice(&[0xee; 3]);
        }
        ImageBuffer::new(3, 3, "RGB", Some(12), data).unwrap()
    }

    #[test]
    fn region_is_lazy() {
        let parent = padded_3x3();
        let region = parent.get_region(1, 1, 2, 2).unwrap();
        assert!(!region.is_materialized());
        assert_eq!((region.x(), region.y()), (1, 1));
        assert!(region.parent().is_some());
    }

    #[test]
    fn region_bounds_checked() {
        let parent = padded_3x3();
        assert!(matches!(
            parent.get_region(2, 0, 2, 1),
            Err(Error::RegionOutOfBounds { .. })
        ));
        assert!(parent.get_region(0, 0, 0, 1).is_err());
        assert!(parent.get_region(u32::MAX, 0, 2, 1).is_err());
    }

    #[test]
    fn materialize_crops_and_packs() {
        let parent = padded_3x3();
        let buffer = parent.get_region(1, 1, 2, 2).unwrap().materialize();
        assert_eq!(buffer.layout(), Layout::new(PixelFormat::RGB, 6));
        assert_eq!(
            buffer.raw_data(),
            [11, 11, 11, 12, 12, 12, 21, 21, 21, 22, 22, 22]
        );
        assert_eq!(buffer.canonical_layout(), buffer.layout());
    }

    #[test]
    fn read_materializes_and_resets_origin() {
        let parent = padded_3x3();
        let mut region = parent.get_region(2, 0, 1, 3).unwrap();
        assert_eq!(region.data(), [2, 2, 2, 12, 12, 12, 22, 22, 22]);
        assert!(region.is_materialized());
        assert_eq!((region.x(), region.y()), (0, 0));
        assert!(region.parent().is_none());
        // Parent untouched.
        assert_eq!(parent.pitch(), 12);
    }

    #[test]
    fn region_get_data_converts() {
        let parent = padded_3x3();
        let mut region = parent.get_region(0, 2, 2, 1).unwrap();
        let data = region.get_data("GR", -4).unwrap();
        assert_eq!(&*data, [20, 20, 21, 21]);
    }

    #[test]
    fn top_down_parent_crops_in_stored_order() {
        let parent = ImageBuffer::new(1, 3, "L", Some(-2), vec![1, 0, 2, 0, 3, 0]).unwrap();
        let buffer = parent.get_region(0, 1, 1, 2).unwrap().materialize();
        assert_eq!(buffer.pitch(), 1);
        assert_eq!(buffer.raw_data(), [2, 3]);
    }

    #[test]
    fn nested_regions_compose_offsets() {
        let parent = padded_3x3();
        let outer = parent.get_region(1, 1, 2, 2).unwrap();
        let inner = outer.get_region(1, 0, 1, 2).unwrap();
        assert_eq!((inner.x(), inner.y()), (2, 1));
        assert!(std::ptr::eq(inner.parent().unwrap(), &parent));
        assert_eq!(inner.materialize().raw_data(), [12, 12, 12, 22, 22, 22]);
        assert!(outer.get_region(1, 1, 2, 1).is_err());
    }

    #[test]
    fn nested_region_of_materialized() {
        let parent = padded_3x3();
        let mut outer = parent.get_region(1, 1, 2, 2).unwrap();
        outer.buffer();
        let inner = outer.get_region(1, 1, 1, 1).unwrap();
        assert_eq!((inner.x(), inner.y()), (1, 1));
        assert_eq!(inner.materialize().raw_data(), [22, 22, 22]);
    }

    #[test]
    fn set_data_on_pending_region() {
        let parent = padded_3x3();
        let mut region = parent.get_region(0, 0, 1, 1).unwrap();
        region.set_data("BGR", 3, vec![1, 2, 3]).unwrap();
        assert!(region.is_materialized());
        assert_eq!(region.get_data("RGB", 3).unwrap().as_ref(), [3, 2, 1]);
        assert!(region.set_data("RGB", 3, vec![0; 4]).is_err());
    }

    #[test]
    fn materialized_region_starts_fresh_generation() {
        let mut parent = padded_3x3();
        parent.set_data("RGB", 9, vec![0; 27]).unwrap();
        assert_eq!(parent.generation(), 1);
        let mut region = parent.get_region(0, 0, 1, 1).unwrap();
        assert_eq!(region.buffer().generation(), 0);
        region.set_canonical_data(vec![5, 5, 5]).unwrap();
        assert_eq!(region.buffer().generation(), 1);
    }

    #[test]
    fn region_into_buffer() {
        let parent = padded_3x3();
        let buffer: ImageBuffer = parent.get_region(0, 0, 3, 3).unwrap().into();
        assert_eq!(buffer.raw_data(), parent.get_data("RGB", 9).unwrap().as_ref());
    }
}
