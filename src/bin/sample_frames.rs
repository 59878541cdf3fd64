//! Saves every Nth frame of a gameplay video as `frames/frame_<n>.jpg`.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use neckdeep_tools::config::load_config;
use neckdeep_tools::sampler::sample_frames;
use neckdeep_tools::video::FfmpegDecoder;
use neckdeep_tools::{install_panic_hook, log, paths};

#[derive(Parser, Debug)]
#[command(
    name = "sample_frames",
    version,
    about = "Extract every Nth frame of a gameplay video for labeling"
)]
struct Args {
    /// Source video
    #[arg(long, default_value = "gameplay.mp4")]
    video: PathBuf,

    /// Directory the JPEG frames are written to (created if missing)
    #[arg(long, default_value = "frames")]
    output: PathBuf,

    /// Keep every Nth frame [default: sample_stride from config.json, 100]
    #[arg(long)]
    stride: Option<u64>,
}

fn main() -> Result<()> {
    install_panic_hook();
    paths::ensure_directories()?;

    let args = Args::parse();
    let config = load_config();
    let stride = args.stride.unwrap_or(config.sample_stride);

    log(&format!(
        "Sampling every {} frames of {} into {}",
        stride,
        args.video.display(),
        args.output.display()
    ));

    let mut decoder = FfmpegDecoder::open(&args.video)
        .with_context(|| format!("Could not open video {}", args.video.display()))?;
    let info = decoder.info();
    log(&format!("Video size: {}x{}", info.width, info.height));

    let report = sample_frames(&mut decoder, stride, &args.output)?;

    println!(
        "Saved {} frames out of {} to {}",
        report.written.len(),
        report.frames_read,
        args.output.display()
    );
    Ok(())
}
