// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! The control channel to the FIMC kernel driver.
//!
//! [`DeviceChannel`] is the narrow set of driver operations a
//! [`TransformSession`](crate::session::TransformSession) needs.
//! [`V4l2Device`] implements it with V4L2 ioctls on a `/dev/video*` node.

use crate::{
    format::FourCC,
    geometry::Rect,
    params::{PlaneAddressSet, MAX_PLANES},
};
use fimc_sys::*;
use libc::{c_int, c_ulong, c_void};
use std::{
    fs::{File, OpenOptions},
    io,
    os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd},
    path::{Path, PathBuf},
};
use tracing::debug;

/// V4L2 buffer queues used by the FIMC.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferType {
    /// Memory to device, the transform source.
    Output,
    Capture,
    /// Device to framebuffer, the transform destination.
    Overlay,
}

impl BufferType {
    pub fn raw(self) -> u32 {
        match self {
            BufferType::Output => V4L2_BUF_TYPE_VIDEO_OUTPUT,
            BufferType::Capture => V4L2_BUF_TYPE_VIDEO_CAPTURE,
            BufferType::Overlay => V4L2_BUF_TYPE_VIDEO_OVERLAY,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Memory {
    Mmap,
    UserPtr,
}

impl Memory {
    pub fn raw(self) -> u32 {
        match self {
            Memory::Mmap => V4L2_MEMORY_MMAP,
            Memory::UserPtr => V4L2_MEMORY_USERPTR,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Any,
    None,
}

impl Field {
    fn raw(self) -> u32 {
        match self {
            Field::Any => V4L2_FIELD_ANY,
            Field::None => V4L2_FIELD_NONE,
        }
    }
}

/// Named integer controls of the FIMC driver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Control {
    /// Rotation in degrees.
    Rotation,
    /// Overlay operating mode, see [`OverlayMode`](crate::session::OverlayMode).
    OverlayMode,
    /// Physical base address of the driver's reserved output memory.
    ReservedMemBase,
    /// FIMC hardware revision code.
    Version,
}

impl Control {
    pub fn id(self) -> u32 {
        match self {
            Control::Rotation => V4L2_CID_ROTATION,
            Control::OverlayMode => V4L2_CID_OVLY_MODE,
            Control::ReservedMemBase => V4L2_CID_RESERVED_MEM_BASE_ADDR,
            Control::Version => V4L2_CID_FIMC_VERSION,
        }
    }
}

/// Frame format of the output or capture queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct PixFormat {
    pub width: u32,
    pub height: u32,
    pub fourcc: FourCC,
    pub field: Field,
}

/// Placement and blending of the overlay window.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Window {
    pub rect: Rect,
    pub global_alpha: u8,
    pub chromakey: u32,
}

/// Framebuffer the overlay writes into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Framebuffer {
    pub base: u32,
    pub width: u32,
    pub height: u32,
    pub fourcc: FourCC,
    pub flags: u32,
}

/// Size and mmap offset of a driver allocated buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct BufferInfo {
    pub length: u32,
    pub offset: u32,
}

/// Operations on the FIMC driver.
///
/// Every operation is a single blocking request to the driver. Failures are
/// reported as they come, no retries are made.
pub trait DeviceChannel {
    /// V4L2 capability flags of the device.
    fn capabilities(&mut self) -> io::Result<u32>;

    fn format(&mut self, buf: BufferType) -> io::Result<PixFormat>;

    /// Programs the frame format of the output or capture queue.
    fn set_format(&mut self, buf: BufferType, fmt: &PixFormat) -> io::Result<()>;

    fn window(&mut self) -> io::Result<Window>;

    fn set_window(&mut self, win: &Window) -> io::Result<()>;

    fn framebuffer(&mut self) -> io::Result<Framebuffer>;

    fn set_framebuffer(&mut self, fb: &Framebuffer) -> io::Result<()>;

    fn crop(&mut self, buf: BufferType) -> io::Result<Rect>;

    fn set_crop(&mut self, buf: BufferType, rect: Rect) -> io::Result<()>;

    fn control(&mut self, ctrl: Control) -> io::Result<i32>;

    fn set_control(&mut self, ctrl: Control, value: i32) -> io::Result<()>;

    /// Hands the overlay destination plane addresses to the driver.
    fn set_destination_planes(&mut self, addrs: [u32; MAX_PLANES]) -> io::Result<()>;

    /// Requests a pool of `count` buffers, zero releases the pool. Returns
    /// the number of buffers the driver allocated.
    fn request_buffers(&mut self, buf: BufferType, memory: Memory, count: u32) -> io::Result<u32>;

    /// Queries a driver allocated (MMAP) buffer.
    fn query_buffer(&mut self, buf: BufferType, index: u32) -> io::Result<BufferInfo>;

    fn queue(
        &mut self,
        buf: BufferType,
        memory: Memory,
        index: u32,
        planes: &PlaneAddressSet,
        num_planes: u32,
    ) -> io::Result<()>;

    /// Waits for a processed buffer and returns its index.
    fn dequeue(&mut self, buf: BufferType, memory: Memory, num_planes: u32) -> io::Result<u32>;

    fn stream_on(&mut self, buf: BufferType) -> io::Result<()>;

    fn stream_off(&mut self, buf: BufferType) -> io::Result<()>;
}

/// FIMC video node opened for V4L2 ioctls.
///
/// The node is closed when the device is dropped.
#[derive(Debug)]
pub struct V4l2Device {
    file: File,
    path: PathBuf,
}

impl V4l2Device {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        debug!("opened {}", path.display());
        Ok(Self { file, path })
    }

    /// Opens FIMC number `index`, `/dev/video<index>`.
    pub fn open_index(index: u32) -> io::Result<Self> {
        Self::open(format!("{}{}", PFX_NODE_FIMC, index))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    fn g_fmt(&self, buf: BufferType) -> io::Result<v4l2_format> {
        let mut fmt = v4l2_format {
            type_: buf.raw(),
            ..Default::default()
        };
        unsafe { vidioc_g_fmt(self.raw_fd(), &mut fmt) }?;
        Ok(fmt)
    }

    fn s_fmt(&self, fmt: &mut v4l2_format) -> io::Result<()> {
        unsafe { vidioc_s_fmt(self.raw_fd(), fmt) }?;
        Ok(())
    }
}

impl AsFd for V4l2Device {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl AsRawFd for V4l2Device {
    fn as_raw_fd(&self) -> RawFd {
        self.raw_fd()
    }
}

impl From<v4l2_rect> for Rect {
    fn from(r: v4l2_rect) -> Self {
        Rect {
            x: r.left.max(0) as u32,
            y: r.top.max(0) as u32,
            width: r.width,
            height: r.height,
        }
    }
}

impl From<Rect> for v4l2_rect {
    fn from(r: Rect) -> Self {
        v4l2_rect {
            left: r.x as i32,
            top: r.y as i32,
            width: r.width,
            height: r.height,
        }
    }
}

impl DeviceChannel for V4l2Device {
    fn capabilities(&mut self) -> io::Result<u32> {
        let mut cap = v4l2_capability::default();
        unsafe { vidioc_querycap(self.raw_fd(), &mut cap) }?;
        Ok(cap.capabilities)
    }

    fn format(&mut self, buf: BufferType) -> io::Result<PixFormat> {
        let fmt = self.g_fmt(buf)?;
        let pix = unsafe { fmt.fmt.pix };
        Ok(PixFormat {
            width: pix.width,
            height: pix.height,
            fourcc: FourCC::from(pix.pixelformat),
            field: if pix.field == V4L2_FIELD_NONE {
                Field::None
            } else {
                Field::Any
            },
        })
    }

    fn set_format(&mut self, buf: BufferType, fmt: &PixFormat) -> io::Result<()> {
        if buf == BufferType::Overlay {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "overlay is programmed through the window",
            ));
        }
        let mut v4l2 = self.g_fmt(buf)?;
        v4l2.fmt.pix.width = fmt.width;
        v4l2.fmt.pix.height = fmt.height;
        v4l2.fmt.pix.pixelformat = u32::from(fmt.fourcc);
        v4l2.fmt.pix.field = fmt.field.raw();
        self.s_fmt(&mut v4l2)
    }

    fn window(&mut self) -> io::Result<Window> {
        let fmt = self.g_fmt(BufferType::Overlay)?;
        let win = unsafe { fmt.fmt.win };
        Ok(Window {
            rect: win.w.into(),
            global_alpha: win.global_alpha,
            chromakey: win.chromakey,
        })
    }

    fn set_window(&mut self, win: &Window) -> io::Result<()> {
        let mut fmt = self.g_fmt(BufferType::Overlay)?;
        fmt.fmt.win.w = win.rect.into();
        fmt.fmt.win.global_alpha = win.global_alpha;
        fmt.fmt.win.chromakey = win.chromakey;
        self.s_fmt(&mut fmt)
    }

    fn framebuffer(&mut self) -> io::Result<Framebuffer> {
        let mut fbuf = v4l2_framebuffer::default();
        unsafe { vidioc_g_fbuf(self.raw_fd(), &mut fbuf) }?;
        Ok(Framebuffer {
            base: fbuf.base as usize as u32,
            width: fbuf.fmt.width,
            height: fbuf.fmt.height,
            fourcc: FourCC::from(fbuf.fmt.pixelformat),
            flags: fbuf.flags,
        })
    }

    fn set_framebuffer(&mut self, fb: &Framebuffer) -> io::Result<()> {
        let mut fbuf = v4l2_framebuffer::default();
        unsafe { vidioc_g_fbuf(self.raw_fd(), &mut fbuf) }?;
        fbuf.base = fb.base as usize as *mut c_void;
        fbuf.flags = fb.flags;
        fbuf.fmt.width = fb.width;
        fbuf.fmt.height = fb.height;
        fbuf.fmt.pixelformat = u32::from(fb.fourcc);
        unsafe { vidioc_s_fbuf(self.raw_fd(), &fbuf) }?;
        Ok(())
    }

    fn crop(&mut self, buf: BufferType) -> io::Result<Rect> {
        let mut crop = v4l2_crop {
            type_: buf.raw(),
            ..Default::default()
        };
        unsafe { vidioc_g_crop(self.raw_fd(), &mut crop) }?;
        Ok(crop.c.into())
    }

    fn set_crop(&mut self, buf: BufferType, rect: Rect) -> io::Result<()> {
        let crop = v4l2_crop {
            type_: buf.raw(),
            c: rect.into(),
        };
        unsafe { vidioc_s_crop(self.raw_fd(), &crop) }?;
        Ok(())
    }

    fn control(&mut self, ctrl: Control) -> io::Result<i32> {
        let mut vc = v4l2_control {
            id: ctrl.id(),
            value: 0,
        };
        unsafe { vidioc_g_ctrl(self.raw_fd(), &mut vc) }?;
        Ok(vc.value)
    }

    fn set_control(&mut self, ctrl: Control, value: i32) -> io::Result<()> {
        let mut vc = v4l2_control {
            id: ctrl.id(),
            value,
        };
        unsafe { vidioc_s_ctrl(self.raw_fd(), &mut vc) }?;
        Ok(())
    }

    fn set_destination_planes(&mut self, addrs: [u32; MAX_PLANES]) -> io::Result<()> {
        let dst = fimc_buf {
            base: addrs,
            length: [0; MAX_PLANES],
        };
        // The FIMC driver is 32-bit, the control value carries the pointer.
        let mut vc = v4l2_control {
            id: V4L2_CID_DST_INFO,
            value: &dst as *const fimc_buf as usize as i32,
        };
        unsafe { vidioc_s_ctrl(self.raw_fd(), &mut vc) }?;
        Ok(())
    }

    fn request_buffers(&mut self, buf: BufferType, memory: Memory, count: u32) -> io::Result<u32> {
        let mut req = v4l2_requestbuffers {
            count,
            type_: buf.raw(),
            memory: memory.raw(),
            ..Default::default()
        };
        unsafe { vidioc_reqbufs(self.raw_fd(), &mut req) }?;
        Ok(req.count)
    }

    fn query_buffer(&mut self, buf: BufferType, index: u32) -> io::Result<BufferInfo> {
        let mut v4l2 = v4l2_buffer {
            index,
            type_: buf.raw(),
            memory: V4L2_MEMORY_MMAP,
            ..Default::default()
        };
        unsafe { vidioc_querybuf(self.raw_fd(), &mut v4l2) }?;
        Ok(BufferInfo {
            length: v4l2.length,
            offset: unsafe { v4l2.m.offset },
        })
    }

    fn queue(
        &mut self,
        buf: BufferType,
        memory: Memory,
        index: u32,
        planes: &PlaneAddressSet,
        num_planes: u32,
    ) -> io::Result<()> {
        let lengths = planes.lengths();
        let fimc = fimc_buf {
            base: planes.raw_addrs(),
            length: lengths.map(|l| l as usize),
        };
        let mut v4l2 = v4l2_buffer {
            index,
            type_: buf.raw(),
            memory: memory.raw(),
            length: num_planes,
            m: v4l2_buffer_m {
                userptr: &fimc as *const fimc_buf as c_ulong,
            },
            ..Default::default()
        };
        unsafe { vidioc_qbuf(self.raw_fd(), &mut v4l2) }?;
        Ok(())
    }

    fn dequeue(&mut self, buf: BufferType, memory: Memory, num_planes: u32) -> io::Result<u32> {
        let mut v4l2 = v4l2_buffer {
            type_: buf.raw(),
            memory: memory.raw(),
            length: num_planes,
            ..Default::default()
        };
        unsafe { vidioc_dqbuf(self.raw_fd(), &mut v4l2) }?;
        Ok(v4l2.index)
    }

    fn stream_on(&mut self, buf: BufferType) -> io::Result<()> {
        let type_ = buf.raw() as c_int;
        unsafe { vidioc_streamon(self.raw_fd(), &type_) }?;
        Ok(())
    }

    fn stream_off(&mut self, buf: BufferType) -> io::Result<()> {
        let type_ = buf.raw() as c_int;
        unsafe { vidioc_streamoff(self.raw_fd(), &type_) }?;
        Ok(())
    }
}
