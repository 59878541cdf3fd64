//! OCR test loop over a gameplay video.
//!
//! Reads the health and score counters from every Nth frame, prints one line
//! per processed frame and feeds an annotated copy to the preview display.

use anyhow::{Context, Result, ensure};
use std::path::Path;

use crate::config::HudRegions;
use crate::log;
use crate::ocr::{HudReading, TextRecognizer, read_hud};
use crate::preview::{Display, PreviewControl, PreviewFrame, annotate_frame};
use crate::video::{FrameSource, open_source};

/// Settings for one scan.
#[derive(Clone, Copy, Debug)]
pub struct ScanOptions {
    /// Process every Nth frame (1-based frame count)
    pub frame_interval: u64,
    /// Preview frames wider than this are scaled down
    pub max_display_width: u32,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            frame_interval: 30,
            max_display_width: 1280,
        }
    }
}

/// Totals for a finished (or aborted) scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub total_frames: u64,
    pub processed_frames: u64,
    pub aborted: bool,
}

/// Formats the per-frame result line.
pub fn format_frame_line(frame_number: u64, reading: &HudReading) -> String {
    format!(
        "Frame {}: Health={}, Score={}",
        frame_number, reading.health, reading.score
    )
}

/// Opens `video_path` and scans it. Fails fast if the video cannot be opened.
pub fn run_video_test<R: TextRecognizer + ?Sized>(
    video_path: &Path,
    recognizer: &R,
    regions: &HudRegions,
    options: ScanOptions,
    display: &mut Display,
) -> Result<ScanSummary> {
    let mut source = open_source(video_path)
        .with_context(|| format!("Could not open video {}", video_path.display()))?;

    println!("Testing OCR on {}", video_path.display());
    println!("Processing every {} frames...", options.frame_interval);
    println!("{}", "-".repeat(50));

    let summary = scan_frames(source.as_mut(), recognizer, regions, options, display)?;

    println!("{}", "-".repeat(50));
    println!(
        "Processed {} frames out of {} total frames",
        summary.processed_frames, summary.total_frames
    );

    Ok(summary)
}

/// Iterates the source and reads both HUD regions on every Nth frame.
///
/// Frames are counted from 1, so with an interval of 30 the frames
/// processed are 30, 60, 90 and so on. A quit key in the preview stops the
/// loop early.
pub fn scan_frames<R: TextRecognizer + ?Sized>(
    source: &mut dyn FrameSource,
    recognizer: &R,
    regions: &HudRegions,
    options: ScanOptions,
    display: &mut Display,
) -> Result<ScanSummary> {
    ensure!(options.frame_interval > 0, "Frame interval must be at least 1");

    let mut summary = ScanSummary::default();

    while let Some(frame) = source.next_frame()? {
        summary.total_frames += 1;
        let frame_number = summary.total_frames;

        if frame_number % options.frame_interval != 0 {
            continue;
        }

        let reading = read_hud(recognizer, &frame, regions);
        summary.processed_frames += 1;
        println!("{}", format_frame_line(frame_number, &reading));

        if display.is_interactive() {
            let preview = PreviewFrame {
                image: annotate_frame(&frame, regions, options.max_display_width),
                frame_number,
                health: reading.health.to_string(),
                score: reading.score.to_string(),
            };
            if display.show(preview) == PreviewControl::Quit {
                log(&format!("Quit requested at frame {}", frame_number));
                summary.aborted = true;
                break;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{Reading, RegionReading};
    use crate::preview::PreviewKey;
    use crate::video::test_util::SyntheticVideo;
    use image::DynamicImage;
    use std::cell::Cell;
    use tempfile::tempdir;

    struct CountingRecognizer {
        calls: Cell<usize>,
    }

    impl TextRecognizer for CountingRecognizer {
        fn recognize(&self, _image: &DynamicImage) -> Result<Vec<String>> {
            self.calls.set(self.calls.get() + 1);
            Ok(vec!["1O".to_string()])
        }
    }

    fn small_regions() -> HudRegions {
        HudRegions {
            health: crate::config::PixelRect::new(0, 0, 10, 10),
            score: crate::config::PixelRect::new(10, 10, 30, 20),
        }
    }

    #[test]
    fn test_scan_processes_every_nth_frame() {
        let recognizer = CountingRecognizer { calls: Cell::new(0) };
        let mut video = SyntheticVideo::new(100);
        let mut display = Display::Headless;

        let summary = scan_frames(
            &mut video,
            &recognizer,
            &small_regions(),
            ScanOptions::default(),
            &mut display,
        )
        .unwrap();

        // Frames 30, 60, 90
        assert_eq!(
            summary,
            ScanSummary {
                total_frames: 100,
                processed_frames: 3,
                aborted: false
            }
        );
        // Two regions per processed frame, thresholded crop answers first time
        assert_eq!(recognizer.calls.get(), 6);
    }

    #[test]
    fn test_scan_regions_outside_frame_never_recognize() {
        let recognizer = CountingRecognizer { calls: Cell::new(0) };
        let mut video = SyntheticVideo::new(10);
        let regions = HudRegions {
            health: crate::config::PixelRect::new(500, 500, 600, 600),
            score: crate::config::PixelRect::new(64, 0, 100, 10),
        };

        let summary = scan_frames(
            &mut video,
            &recognizer,
            &regions,
            ScanOptions {
                frame_interval: 5,
                max_display_width: 1280,
            },
            &mut Display::Headless,
        )
        .unwrap();

        assert_eq!(summary.processed_frames, 2);
        assert_eq!(recognizer.calls.get(), 0);
    }

    #[test]
    fn test_scan_rejects_zero_interval() {
        let recognizer = CountingRecognizer { calls: Cell::new(0) };
        let mut video = SyntheticVideo::new(10);
        let options = ScanOptions {
            frame_interval: 0,
            max_display_width: 1280,
        };
        assert!(
            scan_frames(&mut video, &recognizer, &small_regions(), options, &mut Display::Headless)
                .is_err()
        );
    }

    #[test]
    fn test_run_video_test_fails_fast_on_missing_video() {
        let dir = tempdir().unwrap();
        let recognizer = CountingRecognizer { calls: Cell::new(0) };
        let result = run_video_test(
            &dir.path().join("Gameplay.mp4"),
            &recognizer,
            &HudRegions::default(),
            ScanOptions::default(),
            &mut Display::Headless,
        );
        assert!(result.is_err());
        assert_eq!(recognizer.calls.get(), 0);
    }

    #[test]
    fn test_scan_quit_key_aborts() {
        let recognizer = CountingRecognizer { calls: Cell::new(0) };
        let mut video = SyntheticVideo::new(100);
        let (mut display, frames, keys) = crate::preview::interactive();
        keys.send(PreviewKey::Quit).unwrap();

        let summary = scan_frames(
            &mut video,
            &recognizer,
            &small_regions(),
            ScanOptions::default(),
            &mut display,
        )
        .unwrap();

        assert!(summary.aborted);
        assert_eq!(summary.processed_frames, 1);
        assert_eq!(summary.total_frames, 30);
        let shown = frames.try_recv().unwrap();
        assert_eq!(shown.frame_number, 30);
        assert_eq!(shown.health, "10");
    }

    #[test]
    fn test_format_frame_line() {
        let reading = HudReading {
            health: RegionReading::Value(Reading::Number(42)),
            score: RegionReading::EmptyRegion,
        };
        assert_eq!(format_frame_line(30, &reading), "Frame 30: Health=42, Score=None");
    }
}
