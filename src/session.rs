// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! FIMC transform session.
//!
//! A [`TransformSession`] drives one FIMC through the configuration sequence
//! `create` → `set_src_params` → `set_src_addr` → `set_dst_params` →
//! `set_dst_addr` → `draw`. Each step validates its input, programs the
//! driver and only then commits the new state, a failed step leaves the
//! previously accepted geometry in place.

use crate::{
    device::{
        BufferInfo, BufferType, Control, DeviceChannel, Field, Framebuffer, Memory, PixFormat,
        V4l2Device, Window,
    },
    error::{Error, Result},
    format::{self, PixelFormat},
    geometry::{validate_destination, FrameGeometry, Rect, Rotation, Validation},
    params::{self, PlaneAddressSet, MAX_DST_BUFFERS},
    revision::{GeometryRules, HwRevision},
};
use fimc_sys::*;
use std::io;
use tracing::{debug, error, info, instrument, warn};

/// Number of buffers in the source (output queue) pool.
pub const SRC_BUFFERS: u32 = 1;

/// Lifecycle of a session.
///
/// States are ordered, a session in a later state has completed every step
/// of the earlier ones.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    Uninitialized,
    Created,
    SourceConfigured,
    FullyConfigured,
    /// A conversion is in flight, or stopping the stream after one failed.
    Streaming,
}

/// How the FIMC hands results to the overlay.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum OverlayMode {
    /// Destructive overlay into a single buffer.
    #[default]
    SingleBuffer,
    /// Destructive overlay cycling through multiple buffers.
    MultiBuffer,
    /// The FIMC DMAs into the framebuffer automatically.
    DmaAuto,
}

impl OverlayMode {
    /// Value written to the overlay mode control.
    pub fn raw(self) -> u32 {
        match self {
            OverlayMode::SingleBuffer => FIMC_OVLY_NONE_SINGLE_BUF,
            OverlayMode::MultiBuffer => FIMC_OVLY_NONE_MULTI_BUF,
            OverlayMode::DmaAuto => FIMC_OVLY_DMA_AUTO,
        }
    }
}

impl TryFrom<u32> for OverlayMode {
    type Error = Error;

    fn try_from(mode: u32) -> Result<Self> {
        match mode {
            0 => Ok(OverlayMode::SingleBuffer),
            1 => Ok(OverlayMode::MultiBuffer),
            2 => Ok(OverlayMode::DmaAuto),
            _ => Err(Error::InvalidMode(mode)),
        }
    }
}

/// Overlay blending state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct BlendState {
    pub global_alpha_enabled: bool,
    pub global_alpha: u8,
    pub color_key_enabled: bool,
    /// 24-bit RGB color key.
    pub color_key: u32,
    pub local_alpha_enabled: bool,
}

impl BlendState {
    fn fbuf_flags(&self) -> u32 {
        let mut flags = 0;
        if self.global_alpha_enabled {
            flags |= V4L2_FBUF_FLAG_GLOBAL_ALPHA;
        }
        if self.color_key_enabled {
            flags |= V4L2_FBUF_FLAG_CHROMAKEY;
        }
        flags
    }
}

/// Accepted destination request and the geometry programmed for it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Destination {
    /// Destination as requested, after alignment correction.
    frame: FrameGeometry,
    rotation: Rotation,
    /// Post-rotation geometry handed to the driver.
    programmed: FrameGeometry,
}

/// One FIMC configured for memory to overlay transforms.
pub struct TransformSession<D: DeviceChannel> {
    device: D,
    state: SessionState,
    mode: OverlayMode,
    num_buffers: u32,
    revision: HwRevision,
    rules: &'static dyn GeometryRules,
    src: Option<FrameGeometry>,
    src_buffer: Option<PlaneAddressSet>,
    dst: Option<Destination>,
    dst_buffers: [Option<PlaneAddressSet>; MAX_DST_BUFFERS],
    active_dst: Option<usize>,
    reserved_base: u32,
    out_addr: u32,
    external_out_mem: bool,
    rotation: Rotation,
    blend: BlendState,
}

/// Logs a failed driver request and converts it to [`Error::Device`].
fn check<T>(op: &'static str, res: io::Result<T>) -> Result<T> {
    res.map_err(|e| {
        error!("{} failed: {}", op, e);
        Error::device(op, e)
    })
}

impl TransformSession<V4l2Device> {
    /// Opens `/dev/video<index>` and creates a session on it.
    pub fn open(index: u32, mode: OverlayMode, num_buffers: u32) -> Result<Self> {
        let device = check("open", V4l2Device::open_index(index))?;
        let mut session = TransformSession::new(device);
        session.create(mode, num_buffers)?;
        Ok(session)
    }
}

impl<D: DeviceChannel> TransformSession<D> {
    /// Wraps `device` in an uninitialized session, no request is made until
    /// [`create`](Self::create).
    pub fn new(device: D) -> Self {
        let revision = HwRevision::default();
        TransformSession {
            device,
            state: SessionState::Uninitialized,
            mode: OverlayMode::default(),
            num_buffers: 0,
            revision,
            rules: revision.rules(),
            src: None,
            src_buffer: None,
            dst: None,
            dst_buffers: [None; MAX_DST_BUFFERS],
            active_dst: None,
            reserved_base: 0,
            out_addr: 0,
            external_out_mem: false,
            rotation: Rotation::default(),
            blend: BlendState::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn hw_revision(&self) -> HwRevision {
        self.revision
    }

    /// Geometry rules of the detected hardware revision.
    pub fn rules(&self) -> &'static dyn GeometryRules {
        self.rules
    }

    pub fn mode(&self) -> OverlayMode {
        self.mode
    }

    pub fn num_buffers(&self) -> u32 {
        self.num_buffers
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn blend(&self) -> BlendState {
        self.blend
    }

    /// Accepted source geometry.
    pub fn src(&self) -> Option<FrameGeometry> {
        self.src
    }

    pub fn src_buffer(&self) -> Option<PlaneAddressSet> {
        self.src_buffer
    }

    /// Destination geometry as programmed into the driver, after rotation.
    pub fn dst(&self) -> Option<FrameGeometry> {
        self.dst.map(|d| d.programmed)
    }

    /// True when the overlay writes to memory other than the driver's
    /// reserved buffer.
    pub fn uses_external_memory(&self) -> bool {
        self.external_out_mem
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    fn require_created(&self) -> Result<()> {
        match self.state {
            SessionState::Uninitialized => Err(Error::NotCreated),
            _ => Ok(()),
        }
    }

    fn require_idle(&self) -> Result<()> {
        self.require_created()?;
        match self.state {
            SessionState::Streaming => Err(Error::Streaming),
            _ => Ok(()),
        }
    }

    /// Probes the driver and prepares the session for configuration.
    ///
    /// The device must support streaming video output. The driver's reserved
    /// output memory becomes destination slot 0. Drivers which do not report
    /// a revision are treated as revision 0x43.
    pub fn create(&mut self, mode: OverlayMode, num_buffers: u32) -> Result<()> {
        if self.state != SessionState::Uninitialized {
            return Err(Error::AlreadyCreated);
        }

        let caps = check("VIDIOC_QUERYCAP", self.device.capabilities())?;
        if caps & V4L2_CAP_STREAMING == 0 {
            error!("device has no streaming support");
            return Err(Error::MissingCapability("streaming"));
        }
        if caps & V4L2_CAP_VIDEO_OUTPUT == 0 {
            error!("device has no video output support");
            return Err(Error::MissingCapability("video output"));
        }

        check("VIDIOC_G_FMT", self.device.format(BufferType::Output))?;

        let base = check(
            "VIDIOC_G_CTRL(RESERVED_MEM_BASE_ADDR)",
            self.device.control(Control::ReservedMemBase),
        )? as u32;

        let revision = match self.device.control(Control::Version) {
            Ok(v) => HwRevision(v as u32),
            Err(e) => {
                warn!("FIMC version unavailable ({}), assuming {}", e, HwRevision::DEFAULT);
                HwRevision::DEFAULT
            }
        };

        check(
            "VIDIOC_S_CTRL(OVLY_MODE)",
            self.device.set_control(Control::OverlayMode, mode.raw() as i32),
        )?;

        self.mode = mode;
        self.num_buffers = num_buffers;
        self.revision = revision;
        self.rules = revision.rules();
        self.reserved_base = base;
        self.out_addr = base;
        self.external_out_mem = false;
        self.dst_buffers = [None; MAX_DST_BUFFERS];
        self.dst_buffers[0] = Some(PlaneAddressSet::new(base, None, None));
        self.active_dst = Some(0);
        self.src = None;
        self.src_buffer = None;
        self.dst = None;
        self.state = SessionState::Created;

        debug!(
            "created {:?} session, revision {} ({}), reserved memory 0x{:x}",
            mode,
            revision,
            self.rules.name(),
            base
        );
        Ok(())
    }

    /// Stops streaming if needed and releases the source buffer pool.
    ///
    /// The session returns to [`SessionState::Uninitialized`] and can be
    /// created again.
    pub fn destroy(&mut self) -> Result<()> {
        self.require_created()?;

        if self.state == SessionState::Streaming {
            check("VIDIOC_STREAMOFF", self.device.stream_off(BufferType::Output))?;
            self.state = SessionState::FullyConfigured;
        }

        check(
            "VIDIOC_REQBUFS(0)",
            self.device
                .request_buffers(BufferType::Output, Memory::UserPtr, 0),
        )?;

        self.out_addr = 0;
        self.src = None;
        self.src_buffer = None;
        self.dst = None;
        self.dst_buffers = [None; MAX_DST_BUFFERS];
        self.active_dst = None;
        self.state = SessionState::Uninitialized;
        debug!("session destroyed");
        Ok(())
    }

    /// Configures the source frame.
    ///
    /// The crop is checked against the rules of the hardware revision. A
    /// crop that violates a correctable rule is replaced by the nearest
    /// accepted crop when `force` is set and rejected with
    /// [`Error::Misaligned`] otherwise. Returns the crop that was programmed.
    ///
    /// Repeating the accepted configuration is a no-op. Reconfiguring
    /// releases the previous source buffer pool first; should programming
    /// then fail the session is left in [`SessionState::Created`].
    pub fn set_src_params(
        &mut self,
        width: u32,
        height: u32,
        crop: Rect,
        format: PixelFormat,
        force: bool,
    ) -> Result<Rect> {
        self.require_idle()?;

        let fourcc = format.fourcc();
        let accepted = match self
            .rules
            .validate_source(width, height, crop, fourcc, true)
        {
            Validation::Valid => crop,
            Validation::Misaligned(fixed) if force => {
                warn!("source crop changed from {} to {}", crop, fixed);
                fixed
            }
            Validation::Misaligned(fixed) => {
                error!("invalid source crop {}, nearest valid is {}", crop, fixed);
                return Err(Error::Misaligned {
                    requested: crop,
                    suggested: fixed,
                });
            }
            Validation::Rejected(e) => {
                error!("invalid source frame {}x{}: {}", width, height, e);
                return Err(e.into());
            }
        };

        let geometry = FrameGeometry {
            width,
            height,
            crop: accepted,
            fourcc,
        };

        if self.state >= SessionState::SourceConfigured && self.src == Some(geometry) {
            return Ok(accepted);
        }

        let was_full = self.state == SessionState::FullyConfigured;
        if self.state >= SessionState::SourceConfigured {
            check(
                "VIDIOC_REQBUFS(0)",
                self.device
                    .request_buffers(BufferType::Output, Memory::UserPtr, 0),
            )?;
            self.src = None;
            self.src_buffer = None;
            self.state = SessionState::Created;
        }

        let pix = PixFormat {
            width,
            height,
            fourcc,
            field: Field::None,
        };
        check(
            "VIDIOC_S_FMT(output)",
            self.device.set_format(BufferType::Output, &pix),
        )?;
        check(
            "VIDIOC_S_CROP(output)",
            self.device.set_crop(BufferType::Output, accepted),
        )?;
        let granted = check(
            "VIDIOC_REQBUFS",
            self.device
                .request_buffers(BufferType::Output, Memory::UserPtr, SRC_BUFFERS),
        )?;
        if granted < SRC_BUFFERS {
            error!("driver granted {} of {} source buffers", granted, SRC_BUFFERS);
            return Err(Error::ShortAllocation {
                requested: SRC_BUFFERS,
                granted,
            });
        }

        self.src = Some(geometry);
        self.state = if was_full {
            SessionState::FullyConfigured
        } else {
            SessionState::SourceConfigured
        };
        debug!("source {}", geometry);
        Ok(accepted)
    }

    /// Reads the source format and crop back from the driver.
    pub fn get_src_params(&mut self) -> Result<FrameGeometry> {
        self.require_created()?;
        let pix = check("VIDIOC_G_FMT(output)", self.device.format(BufferType::Output))?;
        let crop = check("VIDIOC_G_CROP(output)", self.device.crop(BufferType::Output))?;
        Ok(FrameGeometry {
            width: pix.width,
            height: pix.height,
            crop,
            fourcc: pix.fourcc,
        })
    }

    /// Sets the physical addresses of the source buffer.
    ///
    /// Missing chroma addresses are derived from the source geometry, see
    /// [`params::source_planes`]. `format` selects the chroma order, YV12
    /// stores Cr before Cb.
    pub fn set_src_addr(
        &mut self,
        y: u32,
        cb: Option<u32>,
        cr: Option<u32>,
        format: PixelFormat,
    ) -> Result<PlaneAddressSet> {
        self.require_created()?;
        let src = self.src.ok_or(Error::Precondition("source parameters"))?;

        let planes = params::source_planes(&src, y, cb, cr, format.swaps_cb_cr());
        debug!("source planes {:x?}", planes.raw_addrs());
        self.src_buffer = Some(planes);
        Ok(planes)
    }

    /// Configures the destination frame for the current rotation.
    ///
    /// An odd 4:2:0 crop height is floored when `force` is set and rejected
    /// with [`Error::Misaligned`] otherwise. Returns the crop as requested
    /// (before rotation) after correction.
    ///
    /// When programming the driver fails the session drops back to
    /// [`SessionState::SourceConfigured`], the previously accepted
    /// destination is kept.
    pub fn set_dst_params(
        &mut self,
        width: u32,
        height: u32,
        crop: Rect,
        format: PixelFormat,
        force: bool,
    ) -> Result<Rect> {
        self.require_idle()?;
        if self.state < SessionState::SourceConfigured {
            return Err(Error::Precondition("source parameters"));
        }

        let fourcc = format.fourcc();
        let accepted =
            match validate_destination(width, height, crop, fourcc, self.rotation, true) {
                Validation::Valid => crop,
                Validation::Misaligned(fixed) if force => {
                    warn!("destination crop changed from {} to {}", crop, fixed);
                    fixed
                }
                Validation::Misaligned(fixed) => {
                    error!("invalid destination crop {}, nearest valid is {}", crop, fixed);
                    return Err(Error::Misaligned {
                        requested: crop,
                        suggested: fixed,
                    });
                }
                Validation::Rejected(e) => {
                    error!(
                        "invalid destination frame {}x{} at {} degrees: {}",
                        width,
                        height,
                        self.rotation.degrees(),
                        e
                    );
                    return Err(e.into());
                }
            };

        let frame = FrameGeometry {
            width,
            height,
            crop: accepted,
            fourcc,
        };

        if self.state == SessionState::FullyConfigured
            && self
                .dst
                .is_some_and(|d| d.frame == frame && d.rotation == self.rotation)
        {
            return Ok(accepted);
        }

        let programmed =
            params::destination_geometry(width, height, accepted, fourcc, self.rotation, self.rules);
        let planes = self
            .active_dst
            .and_then(|i| self.dst_buffers[i])
            .unwrap_or_default();

        if let Err(e) = self.program_overlay(&programmed, self.out_addr, &planes) {
            self.state = SessionState::SourceConfigured;
            return Err(e);
        }

        self.dst = Some(Destination {
            frame,
            rotation: self.rotation,
            programmed,
        });
        self.state = SessionState::FullyConfigured;
        debug!("destination {} programmed as {}", frame, programmed);
        Ok(accepted)
    }

    /// Reads the overlay window and framebuffer back from the driver.
    pub fn get_dst_params(&mut self) -> Result<FrameGeometry> {
        self.require_created()?;
        let win = check("VIDIOC_G_FMT(overlay)", self.device.window())?;
        let fb = check("VIDIOC_G_FBUF", self.device.framebuffer())?;
        Ok(FrameGeometry {
            width: fb.width,
            height: fb.height,
            crop: win.rect,
            fourcc: fb.fourcc,
        })
    }

    /// Stores destination slot `index` and points the overlay at it.
    pub fn set_dst_addr(
        &mut self,
        y: u32,
        cb: Option<u32>,
        cr: Option<u32>,
        index: usize,
    ) -> Result<()> {
        self.require_idle()?;
        if index >= MAX_DST_BUFFERS {
            return Err(Error::BufferIndex {
                index,
                max: MAX_DST_BUFFERS - 1,
            });
        }
        let dst = match self.dst {
            Some(dst) if self.state == SessionState::FullyConfigured => dst,
            _ => return Err(Error::Precondition("destination parameters")),
        };

        let planes = PlaneAddressSet::new(y, cb, cr);
        if let Err(e) = self.program_overlay(&dst.programmed, y, &planes) {
            self.state = SessionState::SourceConfigured;
            return Err(e);
        }

        self.dst_buffers[index] = Some(planes);
        self.active_dst = Some(index);
        self.out_addr = y;
        self.external_out_mem = y != 0 && y != self.reserved_base;
        debug!("destination slot {} planes {:x?}", index, planes.raw_addrs());
        Ok(())
    }

    /// Returns destination slot `index`.
    pub fn dst_buffer(&self, index: usize) -> Result<Option<PlaneAddressSet>> {
        self.require_created()?;
        self.dst_buffers
            .get(index)
            .copied()
            .ok_or(Error::BufferIndex {
                index,
                max: MAX_DST_BUFFERS - 1,
            })
    }

    /// Sets the rotation applied by the next destination configuration.
    ///
    /// Changing the angle of a fully configured session invalidates the
    /// destination, `set_dst_params` must run again before `draw`.
    pub fn set_rotation(&mut self, rotation: Rotation) -> Result<()> {
        self.require_created()?;
        check(
            "VIDIOC_S_CTRL(ROTATION)",
            self.device
                .set_control(Control::Rotation, rotation.degrees() as i32),
        )?;
        if rotation != self.rotation && self.state == SessionState::FullyConfigured {
            debug!(
                "rotation changed to {}, destination needs reconfiguring",
                rotation.degrees()
            );
            self.state = SessionState::SourceConfigured;
        }
        self.rotation = rotation;
        Ok(())
    }

    pub fn set_global_alpha(&mut self, enable: bool, alpha: u8) -> Result<()> {
        self.require_idle()?;
        if self.blend.global_alpha_enabled == enable && self.blend.global_alpha == alpha {
            return Ok(());
        }

        self.update_fbuf_flag(V4L2_FBUF_FLAG_GLOBAL_ALPHA, enable)?;
        if enable {
            let mut win = check("VIDIOC_G_FMT(overlay)", self.device.window())?;
            win.global_alpha = alpha;
            check("VIDIOC_S_FMT(overlay)", self.device.set_window(&win))?;
        }

        self.blend.global_alpha_enabled = enable;
        self.blend.global_alpha = alpha;
        Ok(())
    }

    /// Enables or disables the color key, only the low 24 bits of `key`
    /// are used.
    pub fn set_color_key(&mut self, enable: bool, key: u32) -> Result<()> {
        self.require_idle()?;
        let key = key & 0x00FF_FFFF;
        if self.blend.color_key_enabled == enable && self.blend.color_key == key {
            return Ok(());
        }

        self.update_fbuf_flag(V4L2_FBUF_FLAG_CHROMAKEY, enable)?;
        if enable {
            let mut win = check("VIDIOC_G_FMT(overlay)", self.device.window())?;
            win.chromakey = key;
            check("VIDIOC_S_FMT(overlay)", self.device.set_window(&win))?;
        }

        self.blend.color_key_enabled = enable;
        self.blend.color_key = key;
        Ok(())
    }

    /// Records per-pixel alpha blending, the driver has no control for it.
    pub fn set_local_alpha(&mut self, enable: bool) -> Result<()> {
        self.require_idle()?;
        self.blend.local_alpha_enabled = enable;
        Ok(())
    }

    fn update_fbuf_flag(&mut self, flag: u32, enable: bool) -> Result<()> {
        let mut fb = check("VIDIOC_G_FBUF", self.device.framebuffer())?;
        if enable {
            fb.flags |= flag;
        } else {
            fb.flags &= !flag;
        }
        check("VIDIOC_S_FBUF", self.device.set_framebuffer(&fb))
    }

    /// Programs rotation, framebuffer, destination planes and window.
    fn program_overlay(
        &mut self,
        dst: &FrameGeometry,
        base: u32,
        planes: &PlaneAddressSet,
    ) -> Result<()> {
        check(
            "VIDIOC_S_CTRL(ROTATION)",
            self.device
                .set_control(Control::Rotation, self.rotation.degrees() as i32),
        )?;

        let fb = Framebuffer {
            base,
            width: dst.width,
            height: dst.height,
            fourcc: dst.fourcc,
            flags: self.blend.fbuf_flags(),
        };
        check("VIDIOC_S_FBUF", self.device.set_framebuffer(&fb))?;

        check(
            "VIDIOC_S_CTRL(DST_INFO)",
            self.device.set_destination_planes(planes.raw_addrs()),
        )?;

        let win = Window {
            rect: dst.crop,
            global_alpha: self.blend.global_alpha,
            chromakey: self.blend.color_key,
        };
        check("VIDIOC_S_FMT(overlay)", self.device.set_window(&win))
    }

    /// Runs one conversion of source buffer `src_index` into destination
    /// slot `dst_index`.
    ///
    /// Blocks until the driver returns the source buffer. Streaming is
    /// always stopped again before returning, also when the conversion
    /// failed.
    #[instrument(skip(self))]
    pub fn draw(&mut self, src_index: u32, dst_index: usize) -> Result<()> {
        self.require_idle()?;
        if self.state < SessionState::SourceConfigured {
            return Err(Error::Precondition("source parameters"));
        }
        if self.state < SessionState::FullyConfigured {
            return Err(Error::Precondition("destination parameters"));
        }
        let (Some(src), Some(dst)) = (self.src, self.dst) else {
            return Err(Error::Precondition("destination parameters"));
        };
        let src_buffer = self.src_buffer.ok_or(Error::Precondition("source address"))?;

        if src_index >= SRC_BUFFERS {
            return Err(Error::BufferIndex {
                index: src_index as usize,
                max: (SRC_BUFFERS - 1) as usize,
            });
        }
        let slot = self
            .dst_buffers
            .get(dst_index)
            .copied()
            .ok_or(Error::BufferIndex {
                index: dst_index,
                max: MAX_DST_BUFFERS - 1,
            })?
            .ok_or(Error::Precondition("destination address"))?;

        if self.active_dst != Some(dst_index) {
            let base = slot.raw_addrs()[0];
            if let Err(e) = self.program_overlay(&dst.programmed, base, &slot) {
                self.state = SessionState::SourceConfigured;
                return Err(e);
            }
            self.active_dst = Some(dst_index);
            self.out_addr = base;
            self.external_out_mem = base != 0 && base != self.reserved_base;
        }

        let planes = format::planes_or_default(src.fourcc);

        check("VIDIOC_STREAMON", self.device.stream_on(BufferType::Output))?;
        self.state = SessionState::Streaming;

        let res = self.convert(src_index, &src_buffer, planes);

        match self.device.stream_off(BufferType::Output) {
            Ok(()) => self.state = SessionState::FullyConfigured,
            Err(e) => {
                error!("VIDIOC_STREAMOFF failed: {}", e);
                if res.is_ok() {
                    return Err(Error::device("VIDIOC_STREAMOFF", e));
                }
            }
        }
        res
    }

    fn convert(&mut self, index: u32, buffer: &PlaneAddressSet, planes: u32) -> Result<()> {
        check(
            "VIDIOC_QBUF",
            self.device
                .queue(BufferType::Output, Memory::UserPtr, index, buffer, planes),
        )?;
        let done = check(
            "VIDIOC_DQBUF",
            self.device
                .dequeue(BufferType::Output, Memory::UserPtr, planes),
        )?;
        debug!("source buffer {} done", done);
        Ok(())
    }

    /// Queries a driver allocated buffer of `buf`.
    pub fn query_buffer(&mut self, buf: BufferType, index: u32) -> Result<BufferInfo> {
        self.require_created()?;
        check("VIDIOC_QUERYBUF", self.device.query_buffer(buf, index))
    }

    /// Logs the output format, output crop and capture crop the driver
    /// currently holds.
    pub fn dump_state(&mut self) -> Result<()> {
        self.require_created()?;

        let pix = check("VIDIOC_G_FMT(output)", self.device.format(BufferType::Output))?;
        info!(
            "output format {}x{} {} field {:?}",
            pix.width, pix.height, pix.fourcc, pix.field
        );

        let crop = check("VIDIOC_G_CROP(output)", self.device.crop(BufferType::Output))?;
        info!("output crop {}", crop);

        let crop = check("VIDIOC_G_CROP(capture)", self.device.crop(BufferType::Capture))?;
        info!("capture crop {}", crop);

        info!(
            "state {:?} revision {} rotation {} blend {:?}",
            self.state,
            self.revision,
            self.rotation.degrees(),
            self.blend
        );
        Ok(())
    }
}

impl<D: DeviceChannel> Drop for TransformSession<D> {
    fn drop(&mut self) {
        if self.state != SessionState::Uninitialized {
            if let Err(e) = self.destroy() {
                warn!("destroy failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_are_ordered() {
        assert!(SessionState::Created < SessionState::SourceConfigured);
        assert!(SessionState::FullyConfigured < SessionState::Streaming);
    }

    #[test]
    fn overlay_modes() {
        assert_eq!(OverlayMode::try_from(0).ok(), Some(OverlayMode::SingleBuffer));
        assert_eq!(OverlayMode::DmaAuto.raw(), FIMC_OVLY_DMA_AUTO);
        assert!(matches!(OverlayMode::try_from(3), Err(Error::InvalidMode(3))));
    }

    #[test]
    fn blend_flags() {
        let blend = BlendState {
            global_alpha_enabled: true,
            color_key_enabled: true,
            ..Default::default()
        };
        assert_eq!(
            blend.fbuf_flags(),
            V4L2_FBUF_FLAG_GLOBAL_ALPHA | V4L2_FBUF_FLAG_CHROMAKEY
        );
        assert_eq!(BlendState::default().fbuf_flags(), 0);
    }
}
