// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Hardware revision specific rules.
//!
//! The FIMC revision is read from the driver once when a session is created
//! and selects a [`GeometryRules`] implementation which is then used for
//! every source check and destination placement.

use crate::{
    error::GeometryError,
    format::FourCC,
    geometry::{floor_to_multiple, Rect, Validation, MIN_HEIGHT, MIN_WIDTH},
};
use core::fmt;
use fimc_sys::*;

/// FIMC revision code as reported by `V4L2_CID_FIMC_VERSION`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HwRevision(pub u32);

impl HwRevision {
    /// FIMC 5.0, relaxed source alignment.
    pub const V50: HwRevision = HwRevision(0x50);

    /// Revision assumed when the driver cannot report one.
    pub const DEFAULT: HwRevision = HwRevision(FIMC_DEFAULT_VERSION);

    /// Selects the rules for this revision.
    pub fn rules(self) -> &'static dyn GeometryRules {
        if self == Self::V50 {
            &Fimc50
        } else {
            &FimcLegacy
        }
    }
}

impl Default for HwRevision {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for HwRevision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Alignment rules that differ between FIMC revisions.
pub trait GeometryRules: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Checks a source crop within a `width` x `height` frame.
    ///
    /// When `correct` is false the returned crop is always the requested one.
    fn validate_source(
        &self,
        width: u32,
        height: u32,
        crop: Rect,
        fourcc: FourCC,
        correct: bool,
    ) -> Validation;

    /// Whether quarter-turn destinations need the y offset compensation.
    fn rotated_offset_quirk(&self) -> bool;

    /// Preferred line width for `fourcc`, rounded down.
    fn aligned_width(&self, fourcc: FourCC, width: u32) -> u32;

    /// Preferred height for `fourcc`, rounded down.
    fn aligned_height(&self, fourcc: FourCC, height: u32) -> u32 {
        match fourcc {
            V4L2_PIX_FMT_NV21 | V4L2_PIX_FMT_NV12 | V4L2_PIX_FMT_NV12T | V4L2_PIX_FMT_YUV420 => {
                floor_to_multiple(height, 2)
            }
            _ => height,
        }
    }
}

/// Raises crops below the minimum extents, for frames large enough to hold
/// them. Returns false when anything was changed.
fn raise_to_minimums(width: u32, height: u32, crop: &mut Rect) -> bool {
    let mut valid = true;

    if height >= MIN_HEIGHT && crop.height < MIN_HEIGHT {
        crop.height = MIN_HEIGHT;
        valid = false;
    }

    if width >= MIN_WIDTH && crop.width < MIN_WIDTH {
        crop.width = MIN_WIDTH;
        valid = false;
    }

    valid
}

/// FIMC 5.0.
#[derive(Debug)]
pub struct Fimc50;

impl GeometryRules for Fimc50 {
    fn name(&self) -> &'static str {
        "fimc-5.0"
    }

    fn validate_source(
        &self,
        width: u32,
        height: u32,
        crop: Rect,
        fourcc: FourCC,
        correct: bool,
    ) -> Validation {
        let mut fixed = crop;
        let mut valid = raise_to_minimums(width, height, &mut fixed);

        if fourcc == V4L2_PIX_FMT_YUV422P {
            if fixed.height % 2 != 0 {
                fixed.height = floor_to_multiple(fixed.height, 2);
                valid = false;
            }
            if fixed.width % 2 != 0 {
                fixed.width = floor_to_multiple(fixed.width, 2);
                valid = false;
            }
        }

        Validation::conclude(crop, fixed, valid, correct)
    }

    fn rotated_offset_quirk(&self) -> bool {
        false
    }

    fn aligned_width(&self, fourcc: FourCC, width: u32) -> u32 {
        match fourcc {
            V4L2_PIX_FMT_YUYV | V4L2_PIX_FMT_UYVY | V4L2_PIX_FMT_NV61 | V4L2_PIX_FMT_NV16
            | V4L2_PIX_FMT_YUV422P | V4L2_PIX_FMT_NV21 | V4L2_PIX_FMT_NV12
            | V4L2_PIX_FMT_NV12T | V4L2_PIX_FMT_YUV420 => floor_to_multiple(width, 2),
            _ => width,
        }
    }
}

/// Every revision before 5.0.
#[derive(Debug)]
pub struct FimcLegacy;

impl GeometryRules for FimcLegacy {
    fn name(&self) -> &'static str {
        "fimc-legacy"
    }

    fn validate_source(
        &self,
        width: u32,
        height: u32,
        crop: Rect,
        _fourcc: FourCC,
        correct: bool,
    ) -> Validation {
        if height < MIN_HEIGHT {
            return Validation::Rejected(GeometryError::FrameTooShort {
                height,
                min: MIN_HEIGHT,
            });
        }

        if width % 16 != 0 {
            return Validation::Rejected(GeometryError::FrameWidthMisaligned { width, align: 16 });
        }

        let mut fixed = crop;
        let mut valid = raise_to_minimums(width, height, &mut fixed);

        if fixed.width % 16 != 0 {
            fixed.width = floor_to_multiple(fixed.width, 16);
            valid = false;
        }

        Validation::conclude(crop, fixed, valid, correct)
    }

    fn rotated_offset_quirk(&self) -> bool {
        true
    }

    fn aligned_width(&self, fourcc: FourCC, width: u32) -> u32 {
        match fourcc {
            V4L2_PIX_FMT_RGB565 => floor_to_multiple(width, 8),
            V4L2_PIX_FMT_RGB32 => floor_to_multiple(width, 4),
            V4L2_PIX_FMT_YUYV | V4L2_PIX_FMT_UYVY => floor_to_multiple(width, 4),
            V4L2_PIX_FMT_NV61 | V4L2_PIX_FMT_NV16 => floor_to_multiple(width, 8),
            V4L2_PIX_FMT_YUV422P => floor_to_multiple(width, 16),
            V4L2_PIX_FMT_NV21 | V4L2_PIX_FMT_NV12 | V4L2_PIX_FMT_NV12T => {
                floor_to_multiple(width, 8)
            }
            V4L2_PIX_FMT_YUV420 => floor_to_multiple(width, 16),
            _ => width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_selects_rules() {
        assert_eq!(HwRevision(0x50).rules().name(), "fimc-5.0");
        assert_eq!(HwRevision(0x43).rules().name(), "fimc-legacy");
        assert_eq!(HwRevision::default().rules().name(), "fimc-legacy");
        assert!(!HwRevision::V50.rules().rotated_offset_quirk());
        assert!(HwRevision(0x45).rules().rotated_offset_quirk());
    }

    #[test]
    fn minimums_only_apply_to_large_frames() {
        let mut crop = Rect::new(0, 0, 4, 4);
        assert!(raise_to_minimums(8, 4, &mut crop));
        assert_eq!(crop, Rect::new(0, 0, 4, 4));
        assert!(!raise_to_minimums(32, 32, &mut crop));
        assert_eq!(crop, Rect::new(0, 0, 16, 8));
    }
}
