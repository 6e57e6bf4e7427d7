// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Crop geometry and the alignment checks the FIMC imposes on it.
//!
//! Source rules depend on the hardware revision and live in
//! [`crate::revision`]. Destination rules are the same on every revision and
//! are implemented here by [`validate_destination`].

use crate::{
    error::{Error, GeometryError},
    format::FourCC,
    revision::HwRevision,
};
use core::fmt;
use fimc_sys::{V4L2_PIX_FMT_NV12, V4L2_PIX_FMT_NV12T, V4L2_PIX_FMT_NV21, V4L2_PIX_FMT_YUV420};

/// Smallest frame and crop height the scaler accepts.
pub const MIN_HEIGHT: u32 = 8;

/// Smallest crop width accepted when the frame is at least this wide.
pub const MIN_WIDTH: u32 = 16;

/// Rectangular region within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: u32,
    /// Y coordinate of top-left corner
    pub y: u32,
    /// Width of the rectangle in pixels
    pub width: u32,
    /// Height of the rectangle in pixels
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// One endpoint of a transform: the full frame, the crop within it and the
/// V4L2 format of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    pub crop: Rect,
    pub fourcc: FourCC,
}

impl FrameGeometry {
    /// Number of luma samples in the full frame.
    pub fn frame_size(&self) -> u32 {
        self.width.wrapping_mul(self.height)
    }
}

impl fmt::Display for FrameGeometry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}x{} {} crop {}",
            self.width, self.height, self.fourcc, self.crop
        )
    }
}

/// Image rotation angles supported by the FIMC.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Rotation {
    /// No rotation (0 degrees)
    #[default]
    Rotation0,
    /// Rotate 90 degrees clockwise
    Rotation90,
    /// Rotate 180 degrees
    Rotation180,
    /// Rotate 270 degrees clockwise (90 degrees counter-clockwise)
    Rotation270,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Rotation0 => 0,
            Rotation::Rotation90 => 90,
            Rotation::Rotation180 => 180,
            Rotation::Rotation270 => 270,
        }
    }

    /// True for the quarter turns, where the hardware consumes the
    /// destination with width and height exchanged.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Rotation90 | Rotation::Rotation270)
    }
}

impl TryFrom<u32> for Rotation {
    type Error = Error;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Rotation0),
            90 => Ok(Rotation::Rotation90),
            180 => Ok(Rotation::Rotation180),
            270 => Ok(Rotation::Rotation270),
            _ => Err(Error::InvalidRotation(degrees)),
        }
    }
}

/// Outcome of checking a crop against the hardware rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Every rule is satisfied.
    Valid,
    /// A correctable rule is violated. Holds the floored crop when
    /// correction was requested, otherwise the unmodified request.
    Misaligned(Rect),
    /// The frame itself cannot be processed, no correction is attempted.
    Rejected(GeometryError),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    /// Crop resulting from the check, `requested` unless it was corrected.
    pub fn crop_or(&self, requested: Rect) -> Rect {
        match self {
            Validation::Misaligned(crop) => *crop,
            _ => requested,
        }
    }

    /// Builds the result from a crop that was checked and floored in place.
    pub(crate) fn conclude(requested: Rect, fixed: Rect, valid: bool, correct: bool) -> Self {
        if valid {
            Validation::Valid
        } else if correct {
            Validation::Misaligned(fixed)
        } else {
            Validation::Misaligned(requested)
        }
    }
}

/// Rounds `value` down to a multiple of `n`.
///
/// Powers of two are masked, other values use the remainder. Both give the
/// same result.
pub fn floor_to_multiple(value: u32, n: u32) -> u32 {
    if n <= 1 {
        value
    } else if n.is_power_of_two() {
        value & !(n - 1)
    } else {
        value - value % n
    }
}

/// Checks a source crop for `revision`.
///
/// With `correct` set the returned [`Validation::Misaligned`] carries the
/// nearest crop the hardware accepts, the result is still reported as not
/// valid so the caller can tell the request was changed.
pub fn validate_source(
    width: u32,
    height: u32,
    crop: Rect,
    fourcc: FourCC,
    revision: HwRevision,
    correct: bool,
) -> Validation {
    revision
        .rules()
        .validate_source(width, height, crop, fourcc, correct)
}

/// Formats whose chroma is subsampled vertically, the rotated crop height
/// must be even for these.
fn is_yuv420(fourcc: FourCC) -> bool {
    matches!(
        fourcc,
        V4L2_PIX_FMT_NV12 | V4L2_PIX_FMT_NV21 | V4L2_PIX_FMT_NV12T | V4L2_PIX_FMT_YUV420
    )
}

/// Checks a destination crop.
///
/// The hardware writes the destination after rotation, so for quarter turns
/// width and height are exchanged before the rules are applied. The frame
/// rules (rotated height of at least 8, rotated width a multiple of 8) are
/// hard failures; an odd rotated crop height on 4:2:0 formats is floored.
pub fn validate_destination(
    width: u32,
    height: u32,
    crop: Rect,
    fourcc: FourCC,
    rotation: Rotation,
    correct: bool,
) -> Validation {
    let (rot_width, rot_height) = if rotation.swaps_axes() {
        (height, width)
    } else {
        (width, height)
    };

    if rot_height < MIN_HEIGHT {
        return Validation::Rejected(GeometryError::FrameTooShort {
            height: rot_height,
            min: MIN_HEIGHT,
        });
    }

    if rot_width % 8 != 0 {
        return Validation::Rejected(GeometryError::FrameWidthMisaligned {
            width: rot_width,
            align: 8,
        });
    }

    let mut fixed = crop;
    let mut valid = true;
    if is_yuv420(fourcc) {
        let rot_crop_height = if rotation.swaps_axes() {
            &mut fixed.width
        } else {
            &mut fixed.height
        };
        if *rot_crop_height % 2 != 0 {
            *rot_crop_height = floor_to_multiple(*rot_crop_height, 2);
            valid = false;
        }
    }

    Validation::conclude(crop, fixed, valid, correct)
}
