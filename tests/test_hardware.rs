// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use edgefirst_fimc::{
    device::{DeviceChannel, V4l2Device},
    format::PixelFormat,
    geometry::{Rect, Rotation},
    session::{OverlayMode, SessionState, TransformSession},
};
use fimc_sys::{V4L2_CAP_STREAMING, V4L2_CAP_VIDEO_OUTPUT};
use serial_test::serial;
use std::error::Error;

const FIMC: u32 = 1;

#[test]
#[serial]
#[ignore = "requires FIMC hardware"]
fn test_capabilities() -> Result<(), Box<dyn Error>> {
    let mut dev = V4l2Device::open_index(FIMC)?;
    let caps = dev.capabilities()?;
    println!("{}: capabilities 0x{:08x}", dev.path().display(), caps);
    assert_ne!(caps & V4L2_CAP_STREAMING, 0);
    assert_ne!(caps & V4L2_CAP_VIDEO_OUTPUT, 0);
    Ok(())
}

#[test]
#[serial]
#[ignore = "requires FIMC hardware"]
fn test_configure() -> Result<(), Box<dyn Error>> {
    let mut fimc = TransformSession::open(FIMC, OverlayMode::SingleBuffer, 1)?;
    println!("revision {} ({})", fimc.hw_revision(), fimc.rules().name());

    let crop = fimc.set_src_params(
        640,
        480,
        Rect::new(0, 0, 640, 480),
        PixelFormat::YCbCr420Sp,
        true,
    )?;
    assert_eq!(fimc.get_src_params()?.crop, crop);

    fimc.set_rotation(Rotation::Rotation90)?;
    fimc.set_dst_params(480, 640, Rect::new(0, 0, 480, 640), PixelFormat::Rgb565, true)?;
    assert_eq!(fimc.state(), SessionState::FullyConfigured);

    let dst = fimc.get_dst_params()?;
    println!("destination {}", dst);
    fimc.dump_state()?;

    fimc.destroy()?;
    Ok(())
}
