use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use framebuf_types::PixelFormat;

use crate::frame_spec::FrameSpec;

#[derive(Parser, Debug)]
#[command(name = "framebuf")]
#[command(about = "Convert raw video frame dumps between pixel layouts")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reorder channels and change the row pitch of a raw frame
    Convert(ConvertArgs),
    /// Cut a rectangle out of a raw frame
    Crop(CropArgs),
    /// Print the layout of a raw frame
    Inspect(InspectArgs),
}

/// Geometry of the input frame, from flags and/or a JSON descriptor.
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// JSON frame descriptor with width, height, format and optional pitch
    #[arg(long)]
    pub frame: Option<PathBuf>,

    /// Frame width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Frame height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Pixel format, e.g. RGB, BGRA, ARGB
    #[arg(short, long)]
    pub format: Option<PixelFormat>,

    /// Signed row pitch in bytes; negative means rows are stored top-down
    #[arg(short, long, allow_negative_numbers = true)]
    pub pitch: Option<i32>,
}

impl SourceArgs {
    /// Merge the descriptor file (if any) with explicit flags, flags winning.
    pub fn resolve(&self) -> Result<FrameSpec> {
        let base = self.frame.as_deref().map(FrameSpec::load).transpose()?;

        let width = self
            .width
            .or(base.map(|b| b.width))
            .context("missing frame width (use --width or --frame)")?;
        let height = self
            .height
            .or(base.map(|b| b.height))
            .context("missing frame height (use --height or --frame)")?;
        let format = self
            .format
            .or(base.map(|b| b.format))
            .context("missing pixel format (use --format or --frame)")?;
        let pitch = self.pitch.or(base.and_then(|b| b.pitch));

        Ok(FrameSpec {
            width,
            height,
            format,
            pitch,
        })
    }
}

/// Requested output layout.
#[derive(Args, Debug, Default)]
pub struct TargetArgs {
    /// Output pixel format (defaults to the input format)
    #[arg(long)]
    pub to_format: Option<PixelFormat>,

    /// Output row pitch (defaults to tightly packed, keeping the input row order)
    #[arg(long, allow_negative_numbers = true)]
    pub to_pitch: Option<i32>,

    /// Reverse the row order of the output
    #[arg(long)]
    pub flip: bool,

    /// Write a JSON frame descriptor for the output next to it
    #[arg(long)]
    pub write_frame: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Raw input frame
    #[arg(short, long)]
    pub input: PathBuf,

    /// Raw output frame
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args, Debug)]
pub struct CropArgs {
    /// Raw input frame
    #[arg(short, long)]
    pub input: PathBuf,

    /// Raw output frame
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Left edge of the rectangle
    #[arg(short, long, default_value_t = 0)]
    pub x: u32,

    /// First stored row of the rectangle
    #[arg(short, long, default_value_t = 0)]
    pub y: u32,

    /// Rectangle width in pixels
    #[arg(long)]
    pub crop_width: u32,

    /// Rectangle height in pixels
    #[arg(long)]
    pub crop_height: u32,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Raw frame to check against the layout
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,
}
