/*!
    Pixel buffer storage and layout conversion for the framebuf crates.

    Decoders hand over frames as raw bytes in some packed format and pitch;
    consumers want them in another. This crate stores the bytes once and
    converts on demand:

    - **Channels**: any reordering of up to four channel tags (`RGB` → `ARGB`)
    - **Pitch**: row padding, cropping, and top-down / bottom-up flips
    - **Regions**: lazy sub-rectangles that compose with both of the above

    # Example

    ```
    use framebuf_convert::ImageBuffer;

    let pixels = vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120];
    let mut image = ImageBuffer::new(2, 2, "RGB", Some(6), pixels)?;

    // Read-only projection, the buffer keeps its RGB bytes.
    let argb = image.get_data("ARGB", 8)?;
    assert_eq!(argb.len(), 16);

    // Canonical reads convert once and cache the result.
    image.set_canonical_layout("BGR", -6)?;
    let _bgr = image.data();
    assert_eq!(image.pitch(), -6);

    // Regions copy nothing until read.
    let region = image.get_region(1, 0, 1, 2)?;
    let cropped = region.materialize();
    assert_eq!(cropped.pitch(), 3);
    # Ok::<(), framebuf_convert::Error>(())
    ```

    # Channel Fallback

    A target channel that does not exist in the source is filled from the
    source's *first* channel. Converting `RGB` to `ARGB` therefore copies the
    red byte into alpha. See [`swizzle::resolve`].

    # Padding

    Growing the pitch pads every row with zero bytes. Shrinking it below the
    packed row size silently drops pixel data.
*/

pub use framebuf_types::{DecodedFrame, Error, Layout, PixelFormat, Result};

mod buffer;
mod region;
mod shared;

pub mod rows;
pub mod swizzle;

pub use buffer::ImageBuffer;
pub use region::Region;
pub use shared::SharedImageBuffer;
