// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Derivation of the values the FIMC is programmed with.
//!
//! These functions assume the geometry has already been accepted by the
//! checks in [`crate::geometry`]. They do not validate again; invalid input
//! produces well defined (wrapping) but meaningless numbers.

use crate::{
    format::{self, FourCC},
    geometry::{FrameGeometry, Rect, Rotation},
    revision::GeometryRules,
};

/// Maximum number of memory planes of any supported format.
pub const MAX_PLANES: usize = 3;

/// Number of destination buffer slots a session tracks.
pub const MAX_DST_BUFFERS: usize = 3;

/// Physical plane addresses of one buffer.
///
/// Slots are explicitly unset rather than zero. The driver receives zero for
/// unset slots, see [`PlaneAddressSet::raw_addrs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaneAddressSet {
    addrs: [Option<u32>; MAX_PLANES],
    lengths: [u32; MAX_PLANES],
}

impl PlaneAddressSet {
    pub fn new(y: u32, cb: Option<u32>, cr: Option<u32>) -> Self {
        Self {
            addrs: [Some(y), cb, cr],
            lengths: [0; MAX_PLANES],
        }
    }

    pub fn addr(&self, plane: usize) -> Option<u32> {
        self.addrs.get(plane).copied().flatten()
    }

    pub fn addrs(&self) -> [Option<u32>; MAX_PLANES] {
        self.addrs
    }

    /// Addresses as handed to the driver.
    pub fn raw_addrs(&self) -> [u32; MAX_PLANES] {
        self.addrs.map(|a| a.unwrap_or(0))
    }

    /// Byte length of each plane, zero where unknown.
    pub fn lengths(&self) -> [u32; MAX_PLANES] {
        self.lengths
    }
}

/// Byte lengths of the planes of a `frame` pixel buffer in `fourcc`.
fn plane_lengths(fourcc: FourCC, frame: u32) -> [u32; MAX_PLANES] {
    match format::lookup(fourcc) {
        Some(d) if d.planes == 1 => [frame.wrapping_mul(d.bpp) / 8, 0, 0],
        Some(d) if d.planes == 2 => [frame, frame.wrapping_mul(d.bpp - 8) / 8, 0],
        Some(d) => {
            let chroma = frame.wrapping_mul(d.bpp - 8) / 16;
            [frame, chroma, chroma]
        }
        None => [0; MAX_PLANES],
    }
}

/// Derives the source plane addresses.
///
/// Plane 0 is always `y`. With `swap_cb_cr` the explicit chroma addresses
/// are slotted Cr first. Formats with two or more planes get plane 1 placed
/// directly after the luma plane when it was not supplied. Three plane
/// formats with an unset third slot derive the remaining chroma address from
/// the frame size: a quarter frame for 4:2:0, half a frame for 4:2:2.
pub fn source_planes(
    src: &FrameGeometry,
    y: u32,
    cb: Option<u32>,
    cr: Option<u32>,
    swap_cb_cr: bool,
) -> PlaneAddressSet {
    let desc = format::lookup(src.fourcc);
    let planes = desc.map_or(1, |d| d.planes);
    let frame = src.frame_size();

    // 32-bit bus addresses
    let mut addrs = if swap_cb_cr {
        [Some(y), cr, cb]
    } else {
        [Some(y), cb, cr]
    };

    if planes >= 2 && addrs[1].is_none() {
        addrs[1] = Some(y.wrapping_add(frame));
    }

    if let Some(d) = desc.filter(|_| planes == 3) {
        if addrs[2].is_none() {
            let offset = if d.bpp == 12 { frame >> 2 } else { frame >> 1 };
            if swap_cb_cr {
                // Slot 1 is derived from the unset slot 2, which reads as
                // zero; slot 2 stays unset.
                addrs[1] = Some(addrs[2].unwrap_or(0).wrapping_add(offset));
            } else {
                addrs[2] = addrs[1].map(|a| a.wrapping_add(offset));
            }
        }
    }

    PlaneAddressSet {
        addrs,
        lengths: plane_lengths(src.fourcc, frame),
    }
}

/// Computes the destination geometry the overlay target is programmed with.
///
/// The hardware is given post-rotation geometry. For 180 degrees the crop
/// origin is mirrored within the frame. For quarter turns the frame and
/// crop axes are exchanged and the origin is recomputed from the
/// pre-rotation crop; revisions with the rotated offset quirk add
/// `crop.width - rotated.height` to the y origin.
pub fn destination_geometry(
    width: u32,
    height: u32,
    crop: Rect,
    fourcc: FourCC,
    rotation: Rotation,
    rules: &dyn GeometryRules,
) -> FrameGeometry {
    match rotation {
        Rotation::Rotation90 | Rotation::Rotation270 => {
            let (x, y) = if rotation == Rotation::Rotation90 {
                (crop.y, width.wrapping_sub(crop.x.wrapping_add(crop.width)))
            } else {
                (height.wrapping_sub(crop.y.wrapping_add(crop.height)), crop.x)
            };

            let mut rotated = Rect::new(x, y, crop.height, crop.width);
            if rules.rotated_offset_quirk() {
                rotated.y = rotated
                    .y
                    .wrapping_add(crop.width.wrapping_sub(rotated.height));
            }

            FrameGeometry {
                width: height,
                height: width,
                crop: rotated,
                fourcc,
            }
        }
        Rotation::Rotation180 => FrameGeometry {
            width,
            height,
            crop: Rect::new(
                width.wrapping_sub(crop.x.wrapping_add(crop.width)),
                height.wrapping_sub(crop.y.wrapping_add(crop.height)),
                crop.width,
                crop.height,
            ),
            fourcc,
        },
        Rotation::Rotation0 => FrameGeometry {
            width,
            height,
            crop,
            fourcc,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fimc_sys::{V4L2_PIX_FMT_NV16, V4L2_PIX_FMT_RGB565, V4L2_PIX_FMT_YUV422P, V4L2_PIX_FMT_YUYV};

    #[test]
    fn lengths_follow_subsampling() {
        assert_eq!(plane_lengths(V4L2_PIX_FMT_YUYV, 100), [200, 0, 0]);
        assert_eq!(plane_lengths(V4L2_PIX_FMT_NV16, 100), [100, 100, 0]);
        assert_eq!(plane_lengths(V4L2_PIX_FMT_YUV422P, 100), [100, 50, 50]);
        assert_eq!(plane_lengths(V4L2_PIX_FMT_RGB565, 100), [0, 0, 0]);
    }

    #[test]
    fn unset_slots_reach_driver_as_zero() {
        let planes = PlaneAddressSet::new(0x1000, None, Some(0x3000));
        assert_eq!(planes.raw_addrs(), [0x1000, 0, 0x3000]);
        assert_eq!(planes.addr(1), None);
        assert_eq!(planes.addr(7), None);
    }
}
