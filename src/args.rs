// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::{ArgAction, Parser};
use edgefirst_fimc::{
    format::PixelFormat,
    geometry::{Rect, Rotation},
    revision::HwRevision,
    session::OverlayMode,
};
use std::str::FromStr;

/// FIMC overlay operating modes.
#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Copy)]
pub enum ModeSetting {
    /// Destructive overlay into a single buffer
    Single,
    /// Destructive overlay cycling through buffers
    Multi,
    /// Automatic DMA into the framebuffer
    Dma,
}

impl From<ModeSetting> for OverlayMode {
    fn from(mode: ModeSetting) -> Self {
        match mode {
            ModeSetting::Single => OverlayMode::SingleBuffer,
            ModeSetting::Multi => OverlayMode::MultiBuffer,
            ModeSetting::Dma => OverlayMode::DmaAuto,
        }
    }
}

/// Command-line arguments for the FIMC transform tool.
///
/// Runs a single scale/rotate/color-convert pass from physical source memory
/// into the overlay destination. Arguments can be given on the command line
/// or through environment variables.
///
/// # Example
///
/// ```bash
/// # Convert a 640x480 NV12 frame at 0x40000000 to RGB565, rotated 90 degrees
/// edgefirst-fimc --device 1 --src-addr 0x40000000 --src-format nv12 \
///     --dst-size 480 640 --dst-format rgb565 --rotation 90
///
/// # Only check the geometry for a legacy FIMC and print the result
/// edgefirst-fimc --dry-run --revision 0x43 --src-size 630 480
/// ```
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// FIMC device number, opens /dev/video<N>
    #[arg(short, long, env = "FIMC_DEVICE", default_value = "1")]
    pub device: u32,

    /// Overlay mode
    #[arg(short, long, env = "FIMC_MODE", default_value = "single", value_enum)]
    pub mode: ModeSetting,

    /// Number of overlay buffers
    #[arg(long, env = "FIMC_BUFFERS", default_value = "1")]
    pub buffers: u32,

    /// Source frame size (width height)
    #[arg(
        long,
        env = "SRC_SIZE",
        default_value = "640 480",
        value_delimiter = ' ',
        num_args = 2
    )]
    pub src_size: Vec<u32>,

    /// Source crop (x y width height), defaults to the full frame
    #[arg(long, value_delimiter = ' ', num_args = 4)]
    pub src_crop: Option<Vec<u32>>,

    /// Source pixel format
    #[arg(long, env = "SRC_FORMAT", default_value = "nv12", value_parser = parse_format)]
    pub src_format: PixelFormat,

    /// Physical address of the source luma (or packed) plane
    #[arg(long, env = "SRC_ADDR", default_value = "0", value_parser = parse_addr)]
    pub src_addr: u32,

    /// Physical address of the source Cb plane
    #[arg(long, value_parser = parse_addr)]
    pub src_cb: Option<u32>,

    /// Physical address of the source Cr plane
    #[arg(long, value_parser = parse_addr)]
    pub src_cr: Option<u32>,

    /// Destination frame size (width height)
    #[arg(
        long,
        env = "DST_SIZE",
        default_value = "640 480",
        value_delimiter = ' ',
        num_args = 2
    )]
    pub dst_size: Vec<u32>,

    /// Destination crop (x y width height), defaults to the full frame
    #[arg(long, value_delimiter = ' ', num_args = 4)]
    pub dst_crop: Option<Vec<u32>>,

    /// Destination pixel format
    #[arg(long, env = "DST_FORMAT", default_value = "rgb565", value_parser = parse_format)]
    pub dst_format: PixelFormat,

    /// Physical address of the destination, defaults to the driver's
    /// reserved memory
    #[arg(long, env = "DST_ADDR", value_parser = parse_addr)]
    pub dst_addr: Option<u32>,

    /// Rotation in degrees (0, 90, 180 or 270)
    #[arg(short, long, env = "ROTATION", default_value = "0", value_parser = parse_rotation)]
    pub rotation: Rotation,

    /// Accept corrected crops instead of failing on misaligned geometry
    #[arg(short, long)]
    pub force: bool,

    /// Enable global alpha with this value
    #[arg(long)]
    pub global_alpha: Option<u8>,

    /// Enable the 24-bit color key
    #[arg(long, value_parser = parse_addr)]
    pub color_key: Option<u32>,

    /// Validate and derive parameters without opening the device, printing
    /// the result as JSON
    #[arg(long)]
    pub dry_run: bool,

    /// FIMC revision assumed by --dry-run
    #[arg(long, default_value = "0x43", value_parser = parse_revision)]
    pub revision: HwRevision,

    /// Round the frame sizes down to the preferred alignment of the revision
    #[arg(long)]
    pub align: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Forward logs to the systemd journal
    #[arg(long, env = "JOURNALD")]
    pub journald: bool,

    /// Enable Tracy profiler for performance analysis
    #[arg(long, env = "TRACY")]
    pub tracy: bool,
}

impl Args {
    pub fn src_crop(&self) -> Rect {
        crop_or_frame(self.src_crop.as_deref(), &self.src_size)
    }

    pub fn dst_crop(&self) -> Rect {
        crop_or_frame(self.dst_crop.as_deref(), &self.dst_size)
    }
}

fn crop_or_frame(crop: Option<&[u32]>, size: &[u32]) -> Rect {
    match crop {
        Some([x, y, w, h]) => Rect::new(*x, *y, *w, *h),
        _ => Rect::new(0, 0, size[0], size[1]),
    }
}

/// Parses an address or key, decimal or `0x` prefixed hex.
pub fn parse_addr(s: &str) -> Result<u32, String> {
    let res = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    res.map_err(|e| format!("invalid address {}: {}", s, e))
}

fn parse_format(s: &str) -> Result<PixelFormat, String> {
    PixelFormat::from_str(s).map_err(|e| e.to_string())
}

fn parse_rotation(s: &str) -> Result<Rotation, String> {
    let degrees: u32 = s.parse().map_err(|e| format!("invalid rotation {}: {}", s, e))?;
    Rotation::try_from(degrees).map_err(|e| e.to_string())
}

fn parse_revision(s: &str) -> Result<HwRevision, String> {
    parse_addr(s).map(HwRevision)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses() {
        assert_eq!(parse_addr("0x4000"), Ok(0x4000));
        assert_eq!(parse_addr("1024"), Ok(1024));
        assert!(parse_addr("0xZZ").is_err());
    }

    #[test]
    fn crop_defaults_to_frame() {
        let args = Args::parse_from(["edgefirst-fimc", "--src-size", "320", "240"]);
        assert_eq!(args.src_crop(), Rect::new(0, 0, 320, 240));
        assert_eq!(args.src_format, PixelFormat::YCbCr420Sp);
        assert_eq!(args.rotation, Rotation::Rotation0);

        let args = Args::parse_from([
            "edgefirst-fimc",
            "--dst-crop",
            "8",
            "8",
            "64",
            "32",
            "--rotation",
            "270",
        ]);
        assert_eq!(args.dst_crop(), Rect::new(8, 8, 64, 32));
        assert_eq!(args.rotation, Rotation::Rotation270);
    }
}
