// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use edgefirst_fimc::{
    format::{self, FourCC, PixelFormat},
    geometry::{validate_destination, validate_source, Rect, Rotation, Validation},
    revision::HwRevision,
    GeometryError,
};
use fimc_sys::*;
use std::error::Error;

const LEGACY: HwRevision = HwRevision(0x43);

#[test]
fn test_catalog() {
    let catalog = format::catalog();
    assert_eq!(catalog.len(), 15);

    for desc in catalog {
        assert!((1..=3).contains(&desc.planes), "{}", desc.name);
        assert!(desc.bpp == 12 || desc.bpp == 16, "{}", desc.name);
    }

    let nv12 = format::lookup(V4L2_PIX_FMT_NV12).map(|d| (d.bpp, d.planes));
    assert_eq!(nv12, Some((12, 2)));
    let yuyv = format::lookup(V4L2_PIX_FMT_YUYV).map(|d| (d.bpp, d.planes));
    assert_eq!(yuyv, Some((16, 1)));
    let yuv422p = format::lookup(V4L2_PIX_FMT_YUV422P).map(|d| (d.bpp, d.planes));
    assert_eq!(yuv422p, Some((16, 3)));
    let yuv420 = format::lookup(V4L2_PIX_FMT_YUV420).map(|d| (d.bpp, d.planes));
    assert_eq!(yuv420, Some((12, 3)));

    assert!(format::lookup(V4L2_PIX_FMT_RGB565).is_none());
    assert_eq!(format::planes_or_default(V4L2_PIX_FMT_RGB565), 1);
    assert_eq!(format::planes_or_default(FourCC(*b"XXXX")), 1);
}

#[test]
fn test_hal_formats() -> Result<(), Box<dyn Error>> {
    assert_eq!(PixelFormat::from_hal(0x4)?, PixelFormat::Rgb565);
    assert_eq!(PixelFormat::from_hal(0x3231_5659)?, PixelFormat::Yv12);
    assert!(PixelFormat::from_hal(0x999).is_err());

    assert_eq!(PixelFormat::Yv12.fourcc(), V4L2_PIX_FMT_YUV420);
    assert!(PixelFormat::Yv12.swaps_cb_cr());
    assert!(!PixelFormat::YCbCr420P.swaps_cb_cr());
    assert_eq!(PixelFormat::YCrCb420Sp.fourcc(), V4L2_PIX_FMT_NV21);
    assert_eq!(PixelFormat::Rgbx8888.fourcc(), V4L2_PIX_FMT_RGB32);

    assert_eq!("NV12".parse::<PixelFormat>()?, PixelFormat::YCbCr420Sp);
    assert!("bogus".parse::<PixelFormat>().is_err());
    Ok(())
}

#[test]
fn test_source_report_only() {
    let requests = [
        (100, 100, Rect::new(0, 0, 100, 5)),
        (640, 480, Rect::new(0, 0, 630, 477)),
        (640, 480, Rect::new(3, 5, 7, 3)),
        (32, 4, Rect::new(0, 0, 31, 4)),
    ];
    let fourccs = [V4L2_PIX_FMT_NV12, V4L2_PIX_FMT_YUV422P, V4L2_PIX_FMT_RGB565];

    for revision in [HwRevision::V50, LEGACY] {
        for (width, height, crop) in requests {
            for fourcc in fourccs {
                let res = validate_source(width, height, crop, fourcc, revision, false);
                assert_eq!(res.crop_or(crop), crop, "{} {}x{} {}", revision, width, height, crop);
            }
        }
    }
}

#[test]
fn test_source_minimum_height() {
    let res = validate_source(
        100,
        100,
        Rect::new(0, 0, 100, 5),
        V4L2_PIX_FMT_NV12,
        HwRevision::V50,
        true,
    );
    assert!(!res.is_valid());
    assert_eq!(res, Validation::Misaligned(Rect::new(0, 0, 100, 8)));
}

#[test]
fn test_source_minimum_width() {
    let res = validate_source(
        64,
        64,
        Rect::new(0, 0, 10, 64),
        V4L2_PIX_FMT_NV12,
        HwRevision::V50,
        true,
    );
    assert_eq!(res, Validation::Misaligned(Rect::new(0, 0, 16, 64)));

    // Frames narrower than the minimum keep their crop.
    let res = validate_source(
        12,
        64,
        Rect::new(0, 0, 10, 64),
        V4L2_PIX_FMT_NV12,
        HwRevision::V50,
        true,
    );
    assert!(res.is_valid());
}

#[test]
fn test_source_yuv422p_even() {
    let res = validate_source(
        640,
        480,
        Rect::new(0, 0, 321, 241),
        V4L2_PIX_FMT_YUV422P,
        HwRevision::V50,
        true,
    );
    assert_eq!(res, Validation::Misaligned(Rect::new(0, 0, 320, 240)));

    let res = validate_source(
        640,
        480,
        Rect::new(0, 0, 321, 241),
        V4L2_PIX_FMT_NV12,
        HwRevision::V50,
        true,
    );
    assert!(res.is_valid());
}

#[test]
fn test_source_legacy_hard_failures() {
    for correct in [false, true] {
        let res = validate_source(
            100,
            100,
            Rect::new(0, 0, 96, 100),
            V4L2_PIX_FMT_NV12,
            LEGACY,
            correct,
        );
        assert_eq!(
            res,
            Validation::Rejected(GeometryError::FrameWidthMisaligned {
                width: 100,
                align: 16
            })
        );

        let res = validate_source(
            64,
            4,
            Rect::new(0, 0, 64, 4),
            V4L2_PIX_FMT_NV12,
            LEGACY,
            correct,
        );
        assert_eq!(
            res,
            Validation::Rejected(GeometryError::FrameTooShort { height: 4, min: 8 })
        );
    }
}

#[test]
fn test_source_legacy_width_alignment() {
    let res = validate_source(
        640,
        480,
        Rect::new(0, 0, 630, 480),
        V4L2_PIX_FMT_YUYV,
        LEGACY,
        true,
    );
    assert_eq!(res, Validation::Misaligned(Rect::new(0, 0, 624, 480)));

    let res = validate_source(
        640,
        480,
        Rect::new(0, 0, 630, 480),
        V4L2_PIX_FMT_YUYV,
        HwRevision::V50,
        true,
    );
    assert!(res.is_valid());
}

#[test]
fn test_destination_rotated() {
    let res = validate_destination(
        640,
        480,
        Rect::new(0, 0, 640, 480),
        V4L2_PIX_FMT_NV12,
        Rotation::Rotation90,
        true,
    );
    assert!(res.is_valid());
}

#[test]
fn test_destination_hard_failures() {
    // 644 is not a multiple of 8 once rotated into the width.
    let res = validate_destination(
        480,
        644,
        Rect::new(0, 0, 480, 644),
        V4L2_PIX_FMT_RGB565,
        Rotation::Rotation270,
        true,
    );
    assert_eq!(
        res,
        Validation::Rejected(GeometryError::FrameWidthMisaligned {
            width: 644,
            align: 8
        })
    );

    let res = validate_destination(
        4,
        640,
        Rect::new(0, 0, 4, 640),
        V4L2_PIX_FMT_RGB565,
        Rotation::Rotation90,
        false,
    );
    assert_eq!(
        res,
        Validation::Rejected(GeometryError::FrameTooShort { height: 4, min: 8 })
    );
}

#[test]
fn test_destination_420_height() {
    for fourcc in [
        V4L2_PIX_FMT_NV12,
        V4L2_PIX_FMT_NV21,
        V4L2_PIX_FMT_NV12T,
        V4L2_PIX_FMT_YUV420,
    ] {
        let res = validate_destination(
            640,
            480,
            Rect::new(0, 0, 640, 241),
            fourcc,
            Rotation::Rotation0,
            true,
        );
        assert_eq!(res, Validation::Misaligned(Rect::new(0, 0, 640, 240)));

        // Rotated, the crop width becomes the height.
        let res = validate_destination(
            480,
            640,
            Rect::new(0, 0, 241, 640),
            fourcc,
            Rotation::Rotation90,
            true,
        );
        assert_eq!(res, Validation::Misaligned(Rect::new(0, 0, 240, 640)));

        let crop = Rect::new(0, 0, 640, 241);
        let res = validate_destination(640, 480, crop, fourcc, Rotation::Rotation180, false);
        assert_eq!(res, Validation::Misaligned(crop));
    }

    let res = validate_destination(
        640,
        480,
        Rect::new(0, 0, 640, 241),
        V4L2_PIX_FMT_NV16,
        Rotation::Rotation0,
        true,
    );
    assert!(res.is_valid());
}

#[test]
fn test_aligned_sizes() {
    let legacy = LEGACY.rules();
    let v50 = HwRevision::V50.rules();

    assert_eq!(legacy.aligned_width(V4L2_PIX_FMT_YUV420, 330), 320);
    assert_eq!(v50.aligned_width(V4L2_PIX_FMT_YUV420, 331), 330);
    assert_eq!(legacy.aligned_width(V4L2_PIX_FMT_RGB565, 330), 328);
    assert_eq!(v50.aligned_width(V4L2_PIX_FMT_RGB565, 330), 330);
    assert_eq!(legacy.aligned_height(V4L2_PIX_FMT_NV12, 241), 240);
    assert_eq!(v50.aligned_height(V4L2_PIX_FMT_YUYV, 241), 241);
}
