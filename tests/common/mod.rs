// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Recording stand-in for the FIMC driver.

#![allow(dead_code)]

use edgefirst_fimc::{
    device::{
        BufferInfo, BufferType, Control, DeviceChannel, Framebuffer, Memory, PixFormat, Window,
    },
    geometry::Rect,
    params::{PlaneAddressSet, MAX_PLANES},
};
use fimc_sys::{V4L2_CAP_STREAMING, V4L2_CAP_VIDEO_OUTPUT};
use std::{cell::RefCell, io, rc::Rc};

pub const RESERVED_BASE: u32 = 0x5e00_0000;

/// Driver requests seen by the mock, shared so they can be inspected after
/// the session owning the device is gone.
pub type CallLog = Rc<RefCell<Vec<&'static str>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Queued {
    pub index: u32,
    pub addrs: [u32; MAX_PLANES],
    pub lengths: [u32; MAX_PLANES],
    pub planes: u32,
}

pub struct MockDevice {
    pub log: CallLog,
    /// Requests that fail with an I/O error.
    pub failing: Vec<&'static str>,
    pub caps: u32,
    pub version: Option<i32>,
    pub reserved_base: u32,
    pub output: PixFormat,
    pub output_crop: Rect,
    pub capture_crop: Rect,
    pub framebuffer: Framebuffer,
    pub window: Window,
    pub dst_planes: [u32; MAX_PLANES],
    pub controls: Vec<(Control, i32)>,
    pub pool_requests: Vec<u32>,
    pub granted: Option<u32>,
    pub queued: Option<Queued>,
    pub streaming: bool,
}

impl MockDevice {
    /// Legacy FIMC (revision 0x43).
    pub fn new() -> Self {
        Self::with_version(Some(0x43))
    }

    pub fn with_version(version: Option<i32>) -> Self {
        MockDevice {
            log: Rc::new(RefCell::new(Vec::new())),
            failing: Vec::new(),
            caps: V4L2_CAP_STREAMING | V4L2_CAP_VIDEO_OUTPUT,
            version,
            reserved_base: RESERVED_BASE,
            output: PixFormat::default(),
            output_crop: Rect::default(),
            capture_crop: Rect::new(0, 0, 800, 480),
            framebuffer: Framebuffer::default(),
            window: Window::default(),
            dst_planes: [0; MAX_PLANES],
            controls: Vec::new(),
            pool_requests: Vec::new(),
            granted: None,
            queued: None,
            streaming: false,
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.log.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.log.borrow().len()
    }

    /// Last value written to `ctrl`.
    pub fn control_value(&self, ctrl: Control) -> Option<i32> {
        self.controls
            .iter()
            .rev()
            .find(|(c, _)| *c == ctrl)
            .map(|(_, v)| *v)
    }

    fn request(&mut self, op: &'static str) -> io::Result<()> {
        self.log.borrow_mut().push(op);
        if self.failing.contains(&op) {
            Err(io::Error::new(io::ErrorKind::Other, format!("{} rejected", op)))
        } else {
            Ok(())
        }
    }
}

impl DeviceChannel for MockDevice {
    fn capabilities(&mut self) -> io::Result<u32> {
        self.request("querycap")?;
        Ok(self.caps)
    }

    fn format(&mut self, _buf: BufferType) -> io::Result<PixFormat> {
        self.request("g_fmt")?;
        Ok(self.output)
    }

    fn set_format(&mut self, buf: BufferType, fmt: &PixFormat) -> io::Result<()> {
        self.request("s_fmt")?;
        if buf == BufferType::Overlay {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "overlay"));
        }
        self.output = *fmt;
        Ok(())
    }

    fn window(&mut self) -> io::Result<Window> {
        self.request("g_window")?;
        Ok(self.window)
    }

    fn set_window(&mut self, win: &Window) -> io::Result<()> {
        self.request("s_window")?;
        self.window = *win;
        Ok(())
    }

    fn framebuffer(&mut self) -> io::Result<Framebuffer> {
        self.request("g_fbuf")?;
        Ok(self.framebuffer)
    }

    fn set_framebuffer(&mut self, fb: &Framebuffer) -> io::Result<()> {
        self.request("s_fbuf")?;
        self.framebuffer = *fb;
        Ok(())
    }

    fn crop(&mut self, buf: BufferType) -> io::Result<Rect> {
        self.request("g_crop")?;
        Ok(match buf {
            BufferType::Capture => self.capture_crop,
            _ => self.output_crop,
        })
    }

    fn set_crop(&mut self, _buf: BufferType, rect: Rect) -> io::Result<()> {
        self.request("s_crop")?;
        self.output_crop = rect;
        Ok(())
    }

    fn control(&mut self, ctrl: Control) -> io::Result<i32> {
        match ctrl {
            Control::Version => {
                self.request("g_ctrl_version")?;
                self.version
                    .ok_or_else(|| io::Error::from_raw_os_error(libc::EINVAL))
            }
            Control::ReservedMemBase => {
                self.request("g_ctrl_base")?;
                Ok(self.reserved_base as i32)
            }
            _ => {
                self.request("g_ctrl")?;
                Ok(self.control_value(ctrl).unwrap_or(0))
            }
        }
    }

    fn set_control(&mut self, ctrl: Control, value: i32) -> io::Result<()> {
        self.request("s_ctrl")?;
        self.controls.push((ctrl, value));
        Ok(())
    }

    fn set_destination_planes(&mut self, addrs: [u32; MAX_PLANES]) -> io::Result<()> {
        self.request("dst_info")?;
        self.dst_planes = addrs;
        Ok(())
    }

    fn request_buffers(&mut self, _buf: BufferType, _memory: Memory, count: u32) -> io::Result<u32> {
        self.request("reqbufs")?;
        self.pool_requests.push(count);
        Ok(self.granted.unwrap_or(count))
    }

    fn query_buffer(&mut self, _buf: BufferType, index: u32) -> io::Result<BufferInfo> {
        self.request("querybuf")?;
        Ok(BufferInfo {
            length: 0x1000,
            offset: index * 0x1000,
        })
    }

    fn queue(
        &mut self,
        _buf: BufferType,
        _memory: Memory,
        index: u32,
        planes: &PlaneAddressSet,
        num_planes: u32,
    ) -> io::Result<()> {
        self.request("qbuf")?;
        self.queued = Some(Queued {
            index,
            addrs: planes.raw_addrs(),
            lengths: planes.lengths(),
            planes: num_planes,
        });
        Ok(())
    }

    fn dequeue(&mut self, _buf: BufferType, _memory: Memory, _num_planes: u32) -> io::Result<u32> {
        self.request("dqbuf")?;
        self.queued
            .take()
            .map(|q| q.index)
            .ok_or_else(|| io::Error::from_raw_os_error(libc::EAGAIN))
    }

    fn stream_on(&mut self, _buf: BufferType) -> io::Result<()> {
        self.request("streamon")?;
        self.streaming = true;
        Ok(())
    }

    fn stream_off(&mut self, _buf: BufferType) -> io::Result<()> {
        self.request("streamoff")?;
        self.streaming = false;
        Ok(())
    }
}
