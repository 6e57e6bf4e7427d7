// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! # EdgeFirst FIMC Scaler HAL
//!
//! This library drives the FIMC fixed-function scaler, rotator and color
//! space converter found on Samsung Exynos SoCs. It validates source and
//! destination geometry against the alignment rules of the detected hardware
//! revision, derives the values the kernel driver is programmed with and
//! triggers one memory to overlay conversion at a time.
//!
//! ## Features
//!
//! - **Geometry Validation**: Checks crops against the per-revision source
//!   rules and the rotation aware destination rules, optionally correcting
//!   them to the nearest accepted values.
//! - **Parameter Derivation**: Computes plane addresses for multi-plane YUV
//!   formats and the post-rotation destination rectangle.
//! - **V4L2 Integration**: Programs the FIMC through V4L2 ioctls on
//!   `/dev/video*`, behind the [`device::DeviceChannel`] trait.
//!
//! ## Example
//!
//! ```no_run
//! use edgefirst_fimc::{
//!     format::PixelFormat,
//!     geometry::{Rect, Rotation},
//!     session::{OverlayMode, TransformSession},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut fimc = TransformSession::open(1, OverlayMode::SingleBuffer, 1)?;
//!
//! // 640x480 NV12 source at a physical address, chroma follows the luma
//! fimc.set_src_params(640, 480, Rect::new(0, 0, 640, 480), PixelFormat::YCbCr420Sp, false)?;
//! fimc.set_src_addr(0x4000_0000, None, None, PixelFormat::YCbCr420Sp)?;
//!
//! // Rotated RGB565 destination in the driver's reserved memory
//! fimc.set_rotation(Rotation::Rotation90)?;
//! fimc.set_dst_params(480, 640, Rect::new(0, 0, 480, 640), PixelFormat::Rgb565, false)?;
//!
//! fimc.draw(0, 0)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Platform Requirements
//!
//! - **Linux**: Samsung FIMC V4L2 driver exposing the overlay destination
//!   and the FIMC private controls.
//!
//! ## Safety
//!
//! This library uses `unsafe` code for the V4L2 ioctls. All unsafe
//! operations are isolated to [`device`] and the `fimc-sys` crate.

pub mod device;
pub mod error;
pub mod format;
pub mod geometry;
pub mod params;
pub mod revision;
pub mod session;

pub use error::{Error, GeometryError, Result};
pub use format::FourCC;
