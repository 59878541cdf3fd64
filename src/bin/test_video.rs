//! Runs the health/score OCR over a gameplay video.
//!
//! Prints one line per processed frame and, when a display is available,
//! shows the annotated frames (Q quits, Space pauses).

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use neckdeep_tools::config::{HudRegions, load_config};
use neckdeep_tools::ocr::build_engine;
use neckdeep_tools::preview::{Display, DisplayMode, run_with_preview, select_display_mode};
use neckdeep_tools::scan::{ScanOptions, run_video_test};
use neckdeep_tools::{install_panic_hook, log, paths};

const DEFAULT_VIDEO_NAME: &str = "Gameplay.mp4";
const WINDOW_TITLE: &str = "OCR Test - Press Q to quit, Space to pause";

#[derive(Parser, Debug)]
#[command(
    name = "test_video",
    version,
    about = "Read the health and score counters from gameplay footage"
)]
struct Args {
    /// Video to scan; looked for as Gameplay.mp4 when omitted
    video: Option<PathBuf>,

    /// Process every Nth frame [default: frame_interval from config.json, 30]
    #[arg(long)]
    interval: Option<u64>,

    /// Print results only, never open the preview window
    #[arg(long, default_value_t = false)]
    no_display: bool,

    /// Coords file for the health counter
    #[arg(long)]
    health_coords: Option<PathBuf>,

    /// Coords file for the score counter
    #[arg(long)]
    score_coords: Option<PathBuf>,
}

/// Picks the video: argument, then known locations, then a prompt.
fn resolve_video_path(arg: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = arg {
        return Ok(path);
    }

    if let Some(path) = paths::first_existing(&paths::default_video_candidates(DEFAULT_VIDEO_NAME)) {
        return Ok(path);
    }

    println!("Could not find {}. Please specify the path:", DEFAULT_VIDEO_NAME);
    println!("Usage: test_video <path_to_video>");
    print!("Enter path to {}: ", DEFAULT_VIDEO_NAME);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read video path from stdin")?;
    Ok(PathBuf::from(line.trim().trim_matches('"')))
}

fn main() -> Result<()> {
    install_panic_hook();
    paths::ensure_directories()?;

    let args = Args::parse();
    let video_path = resolve_video_path(args.video)?;

    if !video_path.exists() {
        eprintln!("Error: Video file not found at {}", video_path.display());
        std::process::exit(1);
    }
    println!("Using video: {}", video_path.display());

    let config = load_config();
    let regions = HudRegions::load(
        &args.health_coords.unwrap_or_else(|| config.health_coords.clone()),
        &args.score_coords.unwrap_or_else(|| config.score_coords.clone()),
    );
    log(&format!(
        "Regions: health {} score {}",
        regions.health, regions.score
    ));

    let options = ScanOptions {
        frame_interval: args.interval.unwrap_or(config.frame_interval),
        max_display_width: config.max_display_width,
    };

    let engine = build_engine(&config).context("OCR engine unavailable")?;

    match select_display_mode(!args.no_display) {
        DisplayMode::Headless => {
            run_video_test(&video_path, &engine, &regions, options, &mut Display::Headless)?;
        }
        DisplayMode::Interactive => {
            run_with_preview(WINDOW_TITLE, move |mut display| {
                run_video_test(&video_path, &engine, &regions, options, &mut display)
            })?;
        }
    }

    Ok(())
}
