/*!
    Channel mapping between packed pixel formats.
*/

use framebuf_types::{Layout, MAX_CHANNELS, MAX_WIDTH, PixelFormat, Result};
use tracing::debug;

/**
    Source channel lookup for every channel of a target format.

    Indices are 1-based positions into the source format. A target channel
    whose tag does not exist in the source reads from the source's first
    channel, so converting `RGB` to `ARGB` fills alpha with the red byte
    rather than with zero or full opacity. Callers relying on a neutral
    alpha must fill it themselves.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Permutation {
    sources: [u8; MAX_CHANNELS],
    len: u8,
    fallbacks: u8,
}

impl Permutation {
    /**
        Returns the 1-based source index for each target channel.
    */
    pub fn indices(&self) -> &[u8] {
        &self.sources[..self.len as usize]
    }

    /**
        Number of target channels, which is also the target bytes per pixel.
    */
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /**
        Returns true if there are no target channels. A permutation built by
        [`resolve`] has one entry per target channel, so this is never the
        case for one.
    */
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /**
        Number of target channels that fell back to the first source channel.
    */
    pub fn fallbacks(&self) -> usize {
        self.fallbacks as usize
    }

    /**
        Returns true if every target channel reads the source channel at the
        same position, i.e. the bytes would not move.
    */
    pub fn is_identity(&self, source_bpp: usize) -> bool {
        self.len() == source_bpp
            && self
                .indices()
                .iter()
                .enumerate()
                .all(|(i, &s)| s as usize == i + 1)
    }

    /**
        Reorder every complete source pixel in `src` into `dst`.

        `src` is read in strides of `source_bpp` bytes and `dst` written in
        strides of [`len`](Self::len) bytes. Conversion stops at whichever
        slice runs out of whole pixels first; trailing partial pixels are
        left untouched.
    */
    pub fn apply_row(&self, src: &[u8], source_bpp: usize, dst: &mut [u8]) {
        let indices = self.indices();
        for (src_px, dst_px) in src
            .chunks_exact(source_bpp)
            .zip(dst.chunks_exact_mut(indices.len()))
        {
            for (d, &s) in dst_px.iter_mut().zip(indices) {
                *d = src_px[s as usize - 1];
            }
        }
    }
}

/**
    Compute which source channel supplies each channel of `target`.
*/
pub fn resolve(source: PixelFormat, target: PixelFormat) -> Permutation {
    let mut sources = [0u8; MAX_CHANNELS];
    let mut fallbacks = 0;
    for (slot, &tag) in sources.iter_mut().zip(target.tags()) {
        *slot = match source.position(tag) {
            Some(p) => p as u8 + 1,
            None => {
                fallbacks += 1;
                1
            }
        };
    }
    Permutation {
        sources,
        len: target.channels() as u8,
        fallbacks,
    }
}

/**
    Like [`resolve`], but takes raw format strings.

    # Errors

    Returns [`Error::Format`](framebuf_types::Error::Format) if either string
    is not a valid format, most notably when it has more than four tags.
*/
pub fn resolve_str(source: &str, target: &str) -> Result<Permutation> {
    Ok(resolve(PixelFormat::parse(source)?, PixelFormat::parse(target)?))
}

/**
    Convert every row of an image from `source` to `target` channel order.

    Returns the converted bytes and their pitch. Output rows are always
    tightly packed (`width * target bpp`) and keep the orientation (sign)
    of `pitch`. Any row padding in the input is dropped. Rows shorter than
    the packed source width only convert their complete pixels; the rest of
    the output row is zero.
*/
pub fn convert_channels(
    data: &[u8],
    width: u32,
    pitch: i32,
    source: PixelFormat,
    target: PixelFormat,
) -> (Vec<u8>, i32) {
    let width = width.min(MAX_WIDTH);
    let permutation = resolve(source, target);
    if permutation.fallbacks() > 0 {
        let missing: String = target
            .tags()
            .iter()
            .filter(|&&tag| !source.contains(tag))
            .map(|&tag| tag as char)
            .collect();
        debug!(
            %source,
            %target,
            %missing,
            "target channels missing from source, filling from first source channel"
        );
    }

    let row_bytes = pitch.unsigned_abs() as usize;
    if row_bytes == 0 {
        return (Vec::new(), 0);
    }
    let source_bpp = source.bytes_per_pixel();
    let source_packed = source.packed_pitch(width);
    let output = Layout::tight(target, width, pitch);
    let target_packed = output.row_bytes();
    let rows = data.len() / row_bytes;

    if row_bytes == source_packed && permutation.is_identity(source_bpp) {
        return (data[..rows * row_bytes].to_vec(), output.pitch);
    }

    let mut out = vec![0u8; rows * target_packed];
    if row_bytes == source_packed {
        // Rows are tightly packed, convert the whole image in one pass.
        permutation.apply_row(&data[..rows * row_bytes], source_bpp, &mut out);
    } else {
        let used = row_bytes.min(source_packed);
        for (src_row, dst_row) in data
            .chunks_exact(row_bytes)
            .zip(out.chunks_exact_mut(target_packed))
        {
            permutation.apply_row(&src_row[..used], source_bpp, dst_row);
        }
    }

    (out, output.pitch)
}
