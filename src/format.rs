// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Pixel formats understood by the FIMC.
//!
//! [`lookup`] is the YUV format catalog the geometry code uses to find the
//! bits per pixel and plane count of a V4L2 format. [`PixelFormat`] is the
//! format identifier callers of the HAL use, it maps onto V4L2 fourcc codes
//! including the RGB formats which are outside the catalog.

use crate::error::{Error, Result};
use fimc_sys::*;

pub use fimc_sys::FourCC;

/// Catalog entry for a YUV pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormatDescriptor {
    pub fourcc: FourCC,
    pub name: &'static str,
    /// Average bits per pixel across all planes.
    pub bpp: u32,
    /// Number of memory planes (1, 2 or 3).
    pub planes: u32,
}

const fn entry(fourcc: FourCC, name: &'static str, bpp: u32, planes: u32) -> PixelFormatDescriptor {
    PixelFormatDescriptor {
        fourcc,
        name,
        bpp,
        planes,
    }
}

static CATALOG: [PixelFormatDescriptor; 15] = [
    entry(V4L2_PIX_FMT_NV12, "YUV420 2-plane CbCr", 12, 2),
    entry(V4L2_PIX_FMT_NV12T, "YUV420 2-plane CbCr tiled", 12, 2),
    entry(V4L2_PIX_FMT_NV21, "YUV420 2-plane CrCb", 12, 2),
    entry(V4L2_PIX_FMT_NV21X, "YUV420 2-plane CbCr MSB", 12, 2),
    entry(V4L2_PIX_FMT_NV12X, "YUV420 2-plane CrCb MSB", 12, 2),
    entry(V4L2_PIX_FMT_YUV420, "YUV420 3-plane", 12, 3),
    entry(V4L2_PIX_FMT_YUYV, "YUV422 packed YCbYCr", 16, 1),
    entry(V4L2_PIX_FMT_YVYU, "YUV422 packed YCrYCb", 16, 1),
    entry(V4L2_PIX_FMT_UYVY, "YUV422 packed CbYCrY", 16, 1),
    entry(V4L2_PIX_FMT_VYUY, "YUV422 packed CrYCbY", 16, 1),
    entry(V4L2_PIX_FMT_NV16, "YUV422 2-plane CbCr", 16, 2),
    entry(V4L2_PIX_FMT_NV61, "YUV422 2-plane CrCb", 16, 2),
    entry(V4L2_PIX_FMT_NV16X, "YUV422 2-plane CbCr MSB", 16, 2),
    entry(V4L2_PIX_FMT_NV61X, "YUV422 2-plane CrCb MSB", 16, 2),
    entry(V4L2_PIX_FMT_YUV422P, "YUV422 3-plane", 16, 3),
];

/// Finds the catalog entry for a V4L2 fourcc.
///
/// Returns `None` for formats outside the catalog (RGB formats among them),
/// see [`planes_or_default`].
pub fn lookup(fourcc: FourCC) -> Option<&'static PixelFormatDescriptor> {
    CATALOG.iter().find(|d| d.fourcc == fourcc)
}

/// Returns every catalog entry.
pub fn catalog() -> &'static [PixelFormatDescriptor] {
    &CATALOG
}

/// Plane count of `fourcc`, formats outside the catalog are single plane.
pub fn planes_or_default(fourcc: FourCC) -> u32 {
    lookup(fourcc).map_or(1, |d| d.planes)
}

/// Pixel formats accepted by the HAL.
///
/// The discriminants are the Android graphics HAL codes, vendor formats use
/// the `0x100` range.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PixelFormat {
    Rgba8888 = 0x1,
    Rgbx8888 = 0x2,
    Rgb888 = 0x3,
    Rgb565 = 0x4,
    Bgra8888 = 0x5,
    Rgba5551 = 0x6,
    Rgba4444 = 0x7,
    /// YUV 4:2:2 semi-planar CbCr
    YCbCr422Sp = 0x10,
    /// YUV 4:2:0 semi-planar CrCb
    YCrCb420Sp = 0x11,
    /// YUV 4:2:2 packed YCbYCr
    YCbCr422I = 0x14,
    /// YUV 4:2:0 planar with the Cr plane before Cb
    Yv12 = 0x3231_5659,
    /// YUV 4:2:0 planar
    YCbCr420P = 0x101,
    /// YUV 4:2:2 planar
    YCbCr422P = 0x102,
    /// YUV 4:2:0 semi-planar CbCr
    YCbCr420Sp = 0x103,
    /// YUV 4:2:0 semi-planar CbCr, 64x32 macroblock tiled
    YCbCr420SpTiled = 0x104,
    /// YUV 4:2:2 semi-planar CrCb
    YCrCb422Sp = 0x105,
    /// YUV 4:2:2 packed YCrYCb
    YCrCb422I = 0x106,
    /// YUV 4:2:2 packed CbYCrY
    CbYCrY422I = 0x107,
    /// YUV 4:2:2 packed CrYCbY
    CrYCbY422I = 0x108,
}

impl PixelFormat {
    const ALL: [PixelFormat; 19] = [
        PixelFormat::Rgba8888,
        PixelFormat::Rgbx8888,
        PixelFormat::Rgb888,
        PixelFormat::Rgb565,
        PixelFormat::Bgra8888,
        PixelFormat::Rgba5551,
        PixelFormat::Rgba4444,
        PixelFormat::YCbCr422Sp,
        PixelFormat::YCrCb420Sp,
        PixelFormat::YCbCr422I,
        PixelFormat::Yv12,
        PixelFormat::YCbCr420P,
        PixelFormat::YCbCr422P,
        PixelFormat::YCbCr420Sp,
        PixelFormat::YCbCr420SpTiled,
        PixelFormat::YCrCb422Sp,
        PixelFormat::YCrCb422I,
        PixelFormat::CbYCrY422I,
        PixelFormat::CrYCbY422I,
    ];

    /// Converts a raw HAL format code.
    pub fn from_hal(code: u32) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| *f as u32 == code)
            .ok_or_else(|| Error::UnsupportedFormat(format!("0x{:x}", code)))
    }

    /// V4L2 format the FIMC is programmed with for this HAL format.
    pub fn fourcc(self) -> FourCC {
        match self {
            PixelFormat::Rgba8888 | PixelFormat::Rgbx8888 => V4L2_PIX_FMT_RGB32,
            PixelFormat::Rgb888 => V4L2_PIX_FMT_RGB24,
            PixelFormat::Rgb565 => V4L2_PIX_FMT_RGB565,
            PixelFormat::Bgra8888 => V4L2_PIX_FMT_BGR32,
            PixelFormat::Rgba5551 => V4L2_PIX_FMT_RGB555X,
            PixelFormat::Rgba4444 => V4L2_PIX_FMT_RGB444,
            PixelFormat::YCbCr422Sp => V4L2_PIX_FMT_NV16,
            PixelFormat::YCrCb422Sp => V4L2_PIX_FMT_NV61,
            PixelFormat::YCrCb420Sp => V4L2_PIX_FMT_NV21,
            PixelFormat::YCbCr420Sp => V4L2_PIX_FMT_NV12,
            PixelFormat::YCbCr420SpTiled => V4L2_PIX_FMT_NV12T,
            // YV12 is programmed as YUV420, the chroma planes are swapped
            // when the source addresses are assigned.
            PixelFormat::Yv12 | PixelFormat::YCbCr420P => V4L2_PIX_FMT_YUV420,
            PixelFormat::YCbCr422P => V4L2_PIX_FMT_YUV422P,
            PixelFormat::YCbCr422I => V4L2_PIX_FMT_YUYV,
            PixelFormat::YCrCb422I => V4L2_PIX_FMT_YVYU,
            PixelFormat::CbYCrY422I => V4L2_PIX_FMT_UYVY,
            PixelFormat::CrYCbY422I => V4L2_PIX_FMT_VYUY,
        }
    }

    /// True when the format stores the Cr plane before the Cb plane.
    pub fn swaps_cb_cr(self) -> bool {
        self == PixelFormat::Yv12
    }

    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::Rgba8888 => "rgba8888",
            PixelFormat::Rgbx8888 => "rgbx8888",
            PixelFormat::Rgb888 => "rgb888",
            PixelFormat::Rgb565 => "rgb565",
            PixelFormat::Bgra8888 => "bgra8888",
            PixelFormat::Rgba5551 => "rgba5551",
            PixelFormat::Rgba4444 => "rgba4444",
            PixelFormat::YCbCr422Sp => "nv16",
            PixelFormat::YCrCb420Sp => "nv21",
            PixelFormat::YCbCr422I => "yuyv",
            PixelFormat::Yv12 => "yv12",
            PixelFormat::YCbCr420P => "yuv420",
            PixelFormat::YCbCr422P => "yuv422p",
            PixelFormat::YCbCr420Sp => "nv12",
            PixelFormat::YCbCr420SpTiled => "nv12t",
            PixelFormat::YCrCb422Sp => "nv61",
            PixelFormat::YCrCb422I => "yvyu",
            PixelFormat::CbYCrY422I => "uyvy",
            PixelFormat::CrYCbY422I => "vyuy",
        }
    }
}

impl std::str::FromStr for PixelFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnsupportedFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        for (i, a) in PixelFormat::ALL.iter().enumerate() {
            for b in &PixelFormat::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
                assert_ne!(*a as u32, *b as u32);
            }
        }
    }

    #[test]
    fn catalog_fourccs_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            assert!(CATALOG[i + 1..].iter().all(|b| b.fourcc != a.fourcc));
        }
    }
}
