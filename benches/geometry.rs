// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use criterion::{criterion_group, criterion_main, Criterion};
use edgefirst_fimc::{
    geometry::{validate_destination, validate_source, FrameGeometry, Rect, Rotation},
    params::{destination_geometry, source_planes},
    revision::HwRevision,
};
use fimc_sys::*;
use std::hint::black_box;

pub fn benchmark_validate(c: &mut Criterion) {
    let fmts = [V4L2_PIX_FMT_NV12, V4L2_PIX_FMT_YUV422P, V4L2_PIX_FMT_YUYV];
    let dims = [(320, 240), (640, 480), (1920, 1080), (3840, 2160)];

    for revision in [HwRevision::V50, HwRevision::DEFAULT] {
        let mut group = c.benchmark_group(format!("validate/{}", revision));
        for fmt in fmts {
            for (width, height) in dims {
                let crop = Rect::new(3, 5, width - 7, height - 9);
                group.bench_function(format!("{}-{}x{}", fmt, width, height), |b| {
                    b.iter(|| {
                        validate_source(width, height, black_box(crop), fmt, revision, true);
                        validate_destination(
                            width,
                            height,
                            black_box(crop),
                            fmt,
                            Rotation::Rotation90,
                            true,
                        )
                    })
                });
            }
        }
        group.finish();
    }
}

pub fn benchmark_build(c: &mut Criterion) {
    let rotations = [
        Rotation::Rotation0,
        Rotation::Rotation90,
        Rotation::Rotation180,
        Rotation::Rotation270,
    ];
    let mut group = c.benchmark_group("build");

    for rotation in rotations {
        group.bench_function(format!("dst-{}", rotation.degrees()), |b| {
            b.iter(|| {
                destination_geometry(
                    1920,
                    1080,
                    black_box(Rect::new(16, 8, 1280, 720)),
                    V4L2_PIX_FMT_RGB565,
                    rotation,
                    HwRevision::DEFAULT.rules(),
                )
            })
        });
    }

    let src = FrameGeometry {
        width: 1920,
        height: 1080,
        crop: Rect::new(0, 0, 1920, 1080),
        fourcc: V4L2_PIX_FMT_YUV420,
    };
    group.bench_function("src-planes", |b| {
        b.iter(|| source_planes(black_box(&src), 0x4000_0000, None, None, true))
    });
    group.finish();
}

criterion_group!(benches, benchmark_validate, benchmark_build);
criterion_main!(benches);
