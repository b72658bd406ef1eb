use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use framebuf_convert::{ImageBuffer, Layout};
use tracing::{debug, info};

use crate::args::{ConvertArgs, CropArgs, InspectArgs, TargetArgs};
use crate::frame_spec::FrameSpec;

pub fn convert(args: &ConvertArgs) -> Result<()> {
    let spec = args.source.resolve()?;
    let image = load_image(&args.input, &spec)?;

    let target = target_layout(&image, &args.target);
    write_image(&image, target, &args.output, &args.target)?;

    info!(
        "Converted {} ({}) -> {} ({})",
        args.input.display(),
        image.layout(),
        args.output.display(),
        target
    );
    Ok(())
}

pub fn crop(args: &CropArgs) -> Result<()> {
    let spec = args.source.resolve()?;
    let image = load_image(&args.input, &spec)?;

    let cropped = image
        .get_region(args.x, args.y, args.crop_width, args.crop_height)
        .context("invalid crop rectangle")?
        .materialize();

    let target = target_layout(&cropped, &args.target);
    write_image(&cropped, target, &args.output, &args.target)?;

    info!(
        "Cropped {}x{} at ({}, {}) from {} -> {} ({})",
        args.crop_width,
        args.crop_height,
        args.x,
        args.y,
        args.input.display(),
        args.output.display(),
        target
    );
    Ok(())
}

pub fn inspect(args: &InspectArgs) -> Result<()> {
    let spec = args.source.resolve()?;
    print!("{}", describe(&spec));

    if let Some(input) = &args.input {
        let len = fs::metadata(input)
            .with_context(|| format!("failed to read {}", input.display()))?
            .len();
        let expected = spec.layout().len_for(spec.height) as u64;
        if len != expected {
            bail!(
                "{} is {len} bytes, layout expects {expected}",
                input.display()
            );
        }
        println!("input:       {} ({len} bytes, ok)", input.display());
    }
    Ok(())
}

/// Human readable summary of a frame layout.
pub fn describe(spec: &FrameSpec) -> String {
    let layout = spec.layout();
    let packed = spec.format.packed_pitch(spec.width);
    let row = layout.row_bytes();
    let order = if layout.is_top_down() {
        "top-down"
    } else {
        "bottom-up"
    };

    let mut out = String::new();
    out.push_str(&format!("size:        {}x{}\n", spec.width, spec.height));
    out.push_str(&format!(
        "format:      {} ({} bytes per pixel)\n",
        spec.format,
        spec.format.bytes_per_pixel()
    ));
    out.push_str(&format!("pitch:       {} ({order})\n", layout.pitch));
    out.push_str(&format!("packed row:  {packed} bytes\n"));
    if row >= packed {
        out.push_str(&format!("row padding: {} bytes\n", row - packed));
    } else {
        out.push_str(&format!("row crop:    {} bytes missing\n", packed - row));
    }
    out.push_str(&format!("frame size:  {} bytes\n", layout.len_for(spec.height)));
    out
}

fn load_image(path: &Path, spec: &FrameSpec) -> Result<ImageBuffer> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    debug!(path = %path.display(), bytes = data.len(), "loaded raw frame");

    ImageBuffer::new(spec.width, spec.height, spec.format, spec.pitch, data)
        .with_context(|| format!("{} does not match the frame layout", path.display()))
}

/// Requested layout, defaulting to a tight pitch in the image's row order.
fn target_layout(image: &ImageBuffer, target: &TargetArgs) -> Layout {
    let format = target.to_format.unwrap_or(image.format());
    let layout = match target.to_pitch {
        Some(pitch) => Layout::new(format, pitch),
        None => Layout::tight(format, image.width(), image.pitch()),
    };
    if target.flip { layout.flipped() } else { layout }
}

fn write_image(
    image: &ImageBuffer,
    layout: Layout,
    path: &Path,
    target: &TargetArgs,
) -> Result<()> {
    let data = image.get_data(layout.format, layout.pitch)?;
    fs::write(path, &data).with_context(|| format!("failed to write {}", path.display()))?;

    if let Some(frame_path) = &target.write_frame {
        FrameSpec::from_layout(image.width(), image.height(), layout).save(frame_path)?;
    }
    Ok(())
}
