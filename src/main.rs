// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

mod args;

use args::Args;
use clap::Parser;
use edgefirst_fimc::{
    format::FourCC,
    geometry::{validate_destination, validate_source, FrameGeometry, Rect, Validation},
    params::{destination_geometry, source_planes},
    revision::GeometryRules,
    session::TransformSession,
    Error as FimcError,
};
use serde_json::{json, Value};
use std::{error::Error, process};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, Layer, Registry};

fn init_tracing(args: &Args) -> Result<(), Box<dyn Error>> {
    let level = match args.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(level);

    let journald = if args.journald {
        Some(tracing_journald::layer()?.with_filter(level))
    } else {
        None
    };

    let tracy = if args.tracy {
        tracy_client::Client::start();
        Some(tracing_tracy::TracyLayer::new(
            tracing_tracy::DefaultConfig::default(),
        ))
    } else {
        None
    };

    let subscriber = Registry::default()
        .with(stderr_log)
        .with(journald)
        .with(tracy);
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;
    Ok(())
}

/// Frame size after the optional `--align` rounding.
fn frame_size(args: &Args, rules: &dyn GeometryRules, size: &[u32], fourcc: FourCC) -> (u32, u32) {
    if args.align {
        (
            rules.aligned_width(fourcc, size[0]),
            rules.aligned_height(fourcc, size[1]),
        )
    } else {
        (size[0], size[1])
    }
}

fn rect_json(r: &Rect) -> Value {
    json!({ "x": r.x, "y": r.y, "width": r.width, "height": r.height })
}

fn geometry_json(g: &FrameGeometry) -> Value {
    json!({
        "width": g.width,
        "height": g.height,
        "fourcc": g.fourcc.to_string(),
        "crop": rect_json(&g.crop),
    })
}

fn validation_json(v: &Validation, requested: Rect) -> Value {
    match v {
        Validation::Valid => json!({ "valid": true, "crop": rect_json(&requested) }),
        Validation::Misaligned(fixed) => json!({
            "valid": false,
            "requested": rect_json(&requested),
            "crop": rect_json(fixed),
        }),
        Validation::Rejected(e) => json!({ "valid": false, "error": e.to_string() }),
    }
}

/// Runs the validator and builder only and prints what the device would be
/// programmed with.
fn dry_run(args: &Args) -> Value {
    let rules = args.revision.rules();

    let src_fourcc = args.src_format.fourcc();
    let (src_width, src_height) = frame_size(args, rules, &args.src_size, src_fourcc);
    let src_crop = args.src_crop();
    let src_check = validate_source(
        src_width,
        src_height,
        src_crop,
        src_fourcc,
        args.revision,
        true,
    );

    let dst_fourcc = args.dst_format.fourcc();
    let (dst_width, dst_height) = frame_size(args, rules, &args.dst_size, dst_fourcc);
    let dst_crop = args.dst_crop();
    let dst_check = validate_destination(
        dst_width,
        dst_height,
        dst_crop,
        dst_fourcc,
        args.rotation,
        true,
    );

    let mut out = json!({
        "revision": args.revision.to_string(),
        "rules": rules.name(),
        "rotation": args.rotation.degrees(),
        "source": validation_json(&src_check, src_crop),
        "destination": validation_json(&dst_check, dst_crop),
    });

    match src_check {
        Validation::Rejected(_) => return out,
        Validation::Misaligned(_) if !args.force => return out,
        _ => {}
    }
    let src = FrameGeometry {
        width: src_width,
        height: src_height,
        crop: src_check.crop_or(src_crop),
        fourcc: src_fourcc,
    };
    let planes = source_planes(
        &src,
        args.src_addr,
        args.src_cb,
        args.src_cr,
        args.src_format.swaps_cb_cr(),
    );
    out["source"]["planes"] = json!(planes
        .raw_addrs()
        .iter()
        .map(|a| format!("0x{:08x}", a))
        .collect::<Vec<_>>());
    out["source"]["lengths"] = json!(planes.lengths());

    match dst_check {
        Validation::Rejected(_) => return out,
        Validation::Misaligned(_) if !args.force => return out,
        _ => {}
    }
    let programmed = destination_geometry(
        dst_width,
        dst_height,
        dst_check.crop_or(dst_crop),
        dst_fourcc,
        args.rotation,
        rules,
    );
    out["destination"]["programmed"] = geometry_json(&programmed);

    out
}

fn run(args: &Args) -> Result<(), FimcError> {
    let mut session = TransformSession::open(args.device, args.mode.into(), args.buffers)?;
    info!(
        "opened FIMC {} revision {} ({})",
        args.device,
        session.hw_revision(),
        session.rules().name()
    );

    session.set_rotation(args.rotation)?;
    if let Some(alpha) = args.global_alpha {
        session.set_global_alpha(true, alpha)?;
    }
    if let Some(key) = args.color_key {
        session.set_color_key(true, key)?;
    }

    let rules = session.rules();

    let src_fourcc = args.src_format.fourcc();
    let (width, height) = frame_size(args, rules, &args.src_size, src_fourcc);
    let crop = session.set_src_params(width, height, args.src_crop(), args.src_format, args.force)?;
    info!("source {}x{} crop {}", width, height, crop);
    session.set_src_addr(args.src_addr, args.src_cb, args.src_cr, args.src_format)?;

    let dst_fourcc = args.dst_format.fourcc();
    let (width, height) = frame_size(args, rules, &args.dst_size, dst_fourcc);
    let crop = session.set_dst_params(width, height, args.dst_crop(), args.dst_format, args.force)?;
    info!("destination {}x{} crop {}", width, height, crop);
    if let Some(addr) = args.dst_addr {
        session.set_dst_addr(addr, None, None, 0)?;
    }

    session.draw(0, 0)?;
    info!("conversion done");

    if args.verbose > 0 {
        session.dump_state()?;
    }

    session.destroy()
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_tracing(&args) {
        eprintln!("failed to initialize logging: {}", e);
        process::exit(1);
    }

    if args.dry_run {
        println!("{}", dry_run(&args));
        return;
    }

    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}
