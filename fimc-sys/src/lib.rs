// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Low-level bindings for the Samsung FIMC post-processor V4L2 driver.
//!
//! The structures are translated from `include/uapi/linux/videodev2.h` and
//! the vendor FIMC header. Only the subset of V4L2 used to drive the FIMC as
//! a memory-to-memory scaler is present. The ioctl wrappers are generated
//! with the `nix` ioctl macros and are `unsafe`: callers must pass a file
//! descriptor for an open video node and a pointer to a properly initialized
//! structure of the matching type.

#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]

use core::fmt;
use libc::{c_int, c_ulong, c_void, timeval};

/// Four character code identifying a V4L2 pixel format.
///
/// The code is stored as the four ASCII bytes in memory order, which is the
/// little endian layout V4L2 expects when converted to a `u32`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct FourCC(pub [u8; 4]);

impl From<FourCC> for u32 {
    fn from(value: FourCC) -> Self {
        u32::from_le_bytes(value.0)
    }
}

impl From<u32> for FourCC {
    fn from(value: u32) -> Self {
        FourCC(value.to_le_bytes())
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "FourCC({} 0x{:08x})", self, u32::from(*self))
    }
}

// Standard V4L2 pixel formats.
pub const V4L2_PIX_FMT_RGB565: FourCC = FourCC(*b"RGBP");
pub const V4L2_PIX_FMT_RGB555X: FourCC = FourCC(*b"RGBQ");
pub const V4L2_PIX_FMT_RGB444: FourCC = FourCC(*b"R444");
pub const V4L2_PIX_FMT_RGB24: FourCC = FourCC(*b"RGB3");
pub const V4L2_PIX_FMT_RGB32: FourCC = FourCC(*b"RGB4");
pub const V4L2_PIX_FMT_BGR32: FourCC = FourCC(*b"BGR4");
pub const V4L2_PIX_FMT_NV12: FourCC = FourCC(*b"NV12");
pub const V4L2_PIX_FMT_NV21: FourCC = FourCC(*b"NV21");
pub const V4L2_PIX_FMT_NV16: FourCC = FourCC(*b"NV16");
pub const V4L2_PIX_FMT_NV61: FourCC = FourCC(*b"NV61");
pub const V4L2_PIX_FMT_YUV420: FourCC = FourCC(*b"YU12");
pub const V4L2_PIX_FMT_YUV422P: FourCC = FourCC(*b"422P");
pub const V4L2_PIX_FMT_YUYV: FourCC = FourCC(*b"YUYV");
pub const V4L2_PIX_FMT_YVYU: FourCC = FourCC(*b"YVYU");
pub const V4L2_PIX_FMT_UYVY: FourCC = FourCC(*b"UYVY");
pub const V4L2_PIX_FMT_VYUY: FourCC = FourCC(*b"VYUY");

// Samsung vendor pixel formats.
pub const V4L2_PIX_FMT_NV12T: FourCC = FourCC(*b"TV12");
pub const V4L2_PIX_FMT_NV12X: FourCC = FourCC(*b"N12X");
pub const V4L2_PIX_FMT_NV21X: FourCC = FourCC(*b"N21X");
pub const V4L2_PIX_FMT_NV16X: FourCC = FourCC(*b"N16X");
pub const V4L2_PIX_FMT_NV61X: FourCC = FourCC(*b"N61X");

pub const V4L2_CAP_VIDEO_CAPTURE: u32 = 0x0000_0001;
pub const V4L2_CAP_VIDEO_OUTPUT: u32 = 0x0000_0002;
pub const V4L2_CAP_VIDEO_OVERLAY: u32 = 0x0000_0004;
pub const V4L2_CAP_STREAMING: u32 = 0x0400_0000;

pub const V4L2_BUF_TYPE_VIDEO_CAPTURE: u32 = 1;
pub const V4L2_BUF_TYPE_VIDEO_OUTPUT: u32 = 2;
pub const V4L2_BUF_TYPE_VIDEO_OVERLAY: u32 = 3;

pub const V4L2_MEMORY_MMAP: u32 = 1;
pub const V4L2_MEMORY_USERPTR: u32 = 2;

pub const V4L2_FIELD_ANY: u32 = 0;
pub const V4L2_FIELD_NONE: u32 = 1;

pub const V4L2_FBUF_FLAG_CHROMAKEY: u32 = 0x0004;
pub const V4L2_FBUF_FLAG_GLOBAL_ALPHA: u32 = 0x0010;

pub const V4L2_CID_PRIVATE_BASE: u32 = 0x0800_0000;
pub const V4L2_CID_ROTATION: u32 = V4L2_CID_PRIVATE_BASE;
pub const V4L2_CID_OVLY_MODE: u32 = V4L2_CID_PRIVATE_BASE + 9;
pub const V4L2_CID_DST_INFO: u32 = V4L2_CID_PRIVATE_BASE + 10;
pub const V4L2_CID_RESERVED_MEM_BASE_ADDR: u32 = V4L2_CID_PRIVATE_BASE + 20;
pub const V4L2_CID_FIMC_VERSION: u32 = V4L2_CID_PRIVATE_BASE + 21;

/// Overlay operating modes accepted by `V4L2_CID_OVLY_MODE`.
pub const FIMC_OVLY_NOT_FIXED: u32 = 0x0;
pub const FIMC_OVLY_FIFO: u32 = 0x1;
pub const FIMC_OVLY_DMA_AUTO: u32 = 0x2;
pub const FIMC_OVLY_DMA_MANUAL: u32 = 0x3;
pub const FIMC_OVLY_NONE_SINGLE_BUF: u32 = 0x4;
pub const FIMC_OVLY_NONE_MULTI_BUF: u32 = 0x5;

/// Device node prefix, the FIMC index is appended.
pub const PFX_NODE_FIMC: &str = "/dev/video";

/// FIMC revision reported by drivers without `V4L2_CID_FIMC_VERSION`.
pub const FIMC_DEFAULT_VERSION: u32 = 0x43;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct v4l2_capability {
    pub driver: [u8; 16],
    pub card: [u8; 32],
    pub bus_info: [u8; 32],
    pub version: u32,
    pub capabilities: u32,
    pub device_caps: u32,
    pub reserved: [u32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct v4l2_rect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct v4l2_pix_format {
    pub width: u32,
    pub height: u32,
    pub pixelformat: u32,
    pub field: u32,
    pub bytesperline: u32,
    pub sizeimage: u32,
    pub colorspace: u32,
    pub priv_: u32,
    pub flags: u32,
    pub ycbcr_enc: u32,
    pub quantization: u32,
    pub xfer_func: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct v4l2_clip {
    pub c: v4l2_rect,
    pub next: *mut v4l2_clip,
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct v4l2_window {
    pub w: v4l2_rect,
    pub field: u32,
    pub chromakey: u32,
    pub clips: *mut v4l2_clip,
    pub clipcount: u32,
    pub bitmap: *mut c_void,
    pub global_alpha: u8,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub union v4l2_format_fmt {
    pub pix: v4l2_pix_format,
    pub win: v4l2_window,
    pub raw_data: [u8; 200],
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct v4l2_format {
    pub type_: u32,
    pub fmt: v4l2_format_fmt,
}

impl Default for v4l2_format {
    fn default() -> Self {
        // SAFETY: all-zero is a valid bit pattern for every union member.
        unsafe { std::mem::zeroed() }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct v4l2_crop {
    pub type_: u32,
    pub c: v4l2_rect,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct v4l2_control {
    pub id: u32,
    pub value: i32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct v4l2_requestbuffers {
    pub count: u32,
    pub type_: u32,
    pub memory: u32,
    pub capabilities: u32,
    pub flags: u8,
    pub reserved: [u8; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct v4l2_timecode {
    pub type_: u32,
    pub flags: u32,
    pub frames: u8,
    pub seconds: u8,
    pub minutes: u8,
    pub hours: u8,
    pub userbits: [u8; 4],
}

#[repr(C)]
#[derive(Copy, Clone)]
pub union v4l2_buffer_m {
    pub offset: u32,
    pub userptr: c_ulong,
    pub planes: *mut c_void,
    pub fd: i32,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct v4l2_buffer {
    pub index: u32,
    pub type_: u32,
    pub bytesused: u32,
    pub flags: u32,
    pub field: u32,
    pub timestamp: timeval,
    pub timecode: v4l2_timecode,
    pub sequence: u32,
    pub memory: u32,
    pub m: v4l2_buffer_m,
    pub length: u32,
    pub reserved2: u32,
    pub request_fd: i32,
}

impl Default for v4l2_buffer {
    fn default() -> Self {
        // SAFETY: plain C structure, zero is valid for every field.
        unsafe { std::mem::zeroed() }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct v4l2_framebuffer_fmt {
    pub width: u32,
    pub height: u32,
    pub pixelformat: u32,
    pub field: u32,
    pub bytesperline: u32,
    pub sizeimage: u32,
    pub colorspace: u32,
    pub priv_: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct v4l2_framebuffer {
    pub capability: u32,
    pub flags: u32,
    pub base: *mut c_void,
    pub fmt: v4l2_framebuffer_fmt,
}

impl Default for v4l2_framebuffer {
    fn default() -> Self {
        Self {
            capability: 0,
            flags: 0,
            base: std::ptr::null_mut(),
            fmt: v4l2_framebuffer_fmt::default(),
        }
    }
}

/// Plane descriptor the FIMC driver reads through `userptr` on queue, and
/// through `V4L2_CID_DST_INFO` for the overlay destination.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct fimc_buf {
    pub base: [u32; 3],
    pub length: [usize; 3],
}

nix::ioctl_read!(vidioc_querycap, b'V', 0, v4l2_capability);
nix::ioctl_readwrite!(vidioc_g_fmt, b'V', 4, v4l2_format);
nix::ioctl_readwrite!(vidioc_s_fmt, b'V', 5, v4l2_format);
nix::ioctl_readwrite!(vidioc_reqbufs, b'V', 8, v4l2_requestbuffers);
nix::ioctl_readwrite!(vidioc_querybuf, b'V', 9, v4l2_buffer);
nix::ioctl_read!(vidioc_g_fbuf, b'V', 10, v4l2_framebuffer);
nix::ioctl_write_ptr!(vidioc_s_fbuf, b'V', 11, v4l2_framebuffer);
nix::ioctl_readwrite!(vidioc_qbuf, b'V', 15, v4l2_buffer);
nix::ioctl_readwrite!(vidioc_dqbuf, b'V', 17, v4l2_buffer);
nix::ioctl_write_ptr!(vidioc_streamon, b'V', 18, c_int);
nix::ioctl_write_ptr!(vidioc_streamoff, b'V', 19, c_int);
nix::ioctl_readwrite!(vidioc_g_ctrl, b'V', 27, v4l2_control);
nix::ioctl_readwrite!(vidioc_s_ctrl, b'V', 28, v4l2_control);
nix::ioctl_readwrite!(vidioc_g_crop, b'V', 59, v4l2_crop);
nix::ioctl_write_ptr!(vidioc_s_crop, b'V', 60, v4l2_crop);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourcc_round_trip_is_little_endian() {
        assert_eq!(u32::from(V4L2_PIX_FMT_NV12), 0x3231_564e);
        assert_eq!(FourCC::from(0x3231_564e), V4L2_PIX_FMT_NV12);
        assert_eq!(V4L2_PIX_FMT_YUV422P.to_string(), "422P");
    }

    #[test]
    fn format_union_is_two_hundred_bytes() {
        assert_eq!(std::mem::size_of::<v4l2_format_fmt>(), 200);
        assert_eq!(std::mem::size_of::<v4l2_pix_format>(), 48);
        assert_eq!(std::mem::size_of::<v4l2_requestbuffers>(), 20);
    }
}
