//! Frame sampler.
//!
//! Writes every Nth frame of a video to disk as `frame_<index>.jpg` to build
//! the raw training image set.

use anyhow::{Context, Result, ensure};
use std::fs;
use std::path::{Path, PathBuf};

use crate::log;
use crate::video::FrameSource;

/// Outcome of a sampling run.
#[derive(Debug, Default)]
pub struct SampleReport {
    /// Total frames decoded from the source
    pub frames_read: u64,
    /// Indices (0-based) of the frames written
    pub written: Vec<u64>,
}

/// Returns the output path for a frame index.
pub fn frame_path(output_dir: &Path, frame_id: u64) -> PathBuf {
    output_dir.join(format!("frame_{}.jpg", frame_id))
}

/// Decodes the whole source and saves frames `0, stride, 2*stride, ...`.
///
/// Creates `output_dir` if needed. A source of K frames yields
/// `(K - 1) / stride + 1` files (none for an empty source).
pub fn sample_frames(
    source: &mut dyn FrameSource,
    stride: u64,
    output_dir: &Path,
) -> Result<SampleReport> {
    ensure!(stride > 0, "Sampling stride must be at least 1");

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output dir {}", output_dir.display()))?;

    let mut report = SampleReport::default();
    let mut frame_id: u64 = 0;

    while let Some(frame) = source.next_frame()? {
        if frame_id % stride == 0 {
            let path = frame_path(output_dir, frame_id);
            frame
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            report.written.push(frame_id);
        }
        frame_id += 1;
    }
    report.frames_read = frame_id;

    log(&format!(
        "Sampled {} of {} frames into {}",
        report.written.len(),
        report.frames_read,
        output_dir.display()
    ));

    Ok(report)
}
