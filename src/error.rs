// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Error types for FIMC sessions.

use crate::geometry::Rect;
use std::io;
use thiserror::Error;

/// Geometry the hardware cannot process at all, no corrected value exists.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    #[error("frame height {height} is below the minimum of {min}")]
    FrameTooShort { height: u32, min: u32 },

    #[error("frame width {width} is not a multiple of {align}")]
    FrameWidthMisaligned { width: u32, align: u32 },
}

/// Errors returned by [`TransformSession`](crate::session::TransformSession)
/// operations.
///
/// A failing call never commits new geometry, so the session can be retried
/// by re-issuing the same sequence of calls.
#[derive(Error, Debug)]
pub enum Error {
    #[error("session is not created")]
    NotCreated,

    #[error("session is already created")]
    AlreadyCreated,

    /// A required earlier step of the configuration sequence was skipped.
    #[error("{0} must be set first")]
    Precondition(&'static str),

    /// Blending cannot be reconfigured while the device is streaming.
    #[error("operation not permitted while streaming")]
    Streaming,

    #[error("unsupported pixel format {0}")]
    UnsupportedFormat(String),

    #[error("unsupported rotation {0}, expected 0, 90, 180 or 270")]
    InvalidRotation(u32),

    #[error("unsupported overlay mode {0}")]
    InvalidMode(u32),

    #[error("buffer index {index} out of range (max {max})")]
    BufferIndex { index: usize, max: usize },

    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),

    /// The requested crop violates a correctable alignment rule and the
    /// caller did not allow the correction to be applied.
    #[error("crop {requested} is not aligned, nearest valid crop is {suggested}")]
    Misaligned { requested: Rect, suggested: Rect },

    #[error("device has no {0} support")]
    MissingCapability(&'static str),

    #[error("driver allocated {granted} buffers, {requested} requested")]
    ShortAllocation { requested: u32, granted: u32 },

    #[error("{op} failed: {source}")]
    Device {
        op: &'static str,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn device(op: &'static str, source: io::Error) -> Self {
        Self::Device { op, source }
    }
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
