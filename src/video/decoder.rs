//! Frame-by-frame decoding through an `ffmpeg` pipe.

use anyhow::{Context, Result, anyhow};
use image::RgbImage;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use super::FrameSource;
use super::probe::{VideoInfo, probe_video};

/// The executables used to probe and decode videos.
#[derive(Clone, Debug)]
pub struct FfmpegTools {
    pub ffprobe: PathBuf,
    pub ffmpeg: PathBuf,
}

impl Default for FfmpegTools {
    fn default() -> Self {
        Self {
            ffprobe: PathBuf::from("ffprobe"),
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

/// Decodes a video sequentially as rgb24 frames. No seeking.
pub struct FfmpegDecoder {
    path: PathBuf,
    info: VideoInfo,
    child: Child,
    stdout: BufReader<ChildStdout>,
    stderr: File,
    frames_read: u64,
    finished: bool,
}

impl FfmpegDecoder {
    /// Probes the file and starts the decoder with `ffprobe`/`ffmpeg` from `PATH`.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(&FfmpegTools::default(), path)
    }

    /// Probes the file and starts the decoder.
    ///
    /// Fails when the file cannot be probed as a video. A file that probes
    /// but cannot be decoded fails on the first [`FrameSource::next_frame`].
    pub fn open_with(tools: &FfmpegTools, path: &Path) -> Result<Self> {
        let info = probe_video(&tools.ffprobe, path)?;

        // A file rather than a pipe, so ffmpeg never blocks on a full stderr
        let stderr = tempfile::tempfile().context("Failed to create ffmpeg log file")?;

        let mut child = Command::new(&tools.ffmpeg)
            .arg("-v")
            .arg("error")
            // Keep the coded frame size that ffprobe reported
            .arg("-noautorotate")
            .arg("-i")
            .arg(path)
            .arg("-f")
            .arg("rawvideo")
            .arg("-pix_fmt")
            .arg("rgb24")
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::from(stderr.try_clone()?))
            .spawn()
            .with_context(|| {
                format!(
                    "Failed to start {} (is ffmpeg installed?)",
                    tools.ffmpeg.display()
                )
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("ffmpeg stdout was not captured"))?;

        Ok(Self {
            path: path.to_path_buf(),
            info,
            child,
            stdout: BufReader::new(stdout),
            stderr,
            frames_read: 0,
            finished: false,
        })
    }

    pub fn info(&self) -> VideoInfo {
        self.info
    }

    fn frame_len(&self) -> usize {
        self.info.width as usize * self.info.height as usize * 3
    }

    /// Reaps ffmpeg once its output ends. A failed exit, or a run that never
    /// produced a frame, is a decode error.
    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        let status = self.child.wait().context("Failed to wait for ffmpeg")?;

        if !status.success() {
            let detail = self.diagnostics();
            return Err(anyhow!(
                "ffmpeg could not decode {} ({}){}",
                self.path.display(),
                status,
                detail
            ));
        }
        if self.frames_read == 0 {
            let detail = self.diagnostics();
            return Err(anyhow!(
                "No frames could be decoded from {}{}",
                self.path.display(),
                detail
            ));
        }
        Ok(())
    }

    /// Whatever ffmpeg wrote to stderr, formatted as a message suffix.
    fn diagnostics(&mut self) -> String {
        let mut text = String::new();
        if self.stderr.seek(SeekFrom::Start(0)).is_ok() {
            let _ = self.stderr.read_to_string(&mut text);
        }
        let text = text.trim();
        if text.is_empty() {
            String::new()
        } else {
            format!(": {}", text)
        }
    }
}

impl FrameSource for FfmpegDecoder {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        if self.finished {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.frame_len()];
        match self.stdout.read_exact(&mut buf) {
            Ok(()) => {}
            // A truncated trailing frame is dropped, same as a clean end
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.finish()?;
                return Ok(None);
            }
            Err(e) => return Err(e).context("Failed to read frame from ffmpeg"),
        }

        let frame = RgbImage::from_raw(self.info.width, self.info.height, buf)
            .ok_or_else(|| anyhow!("Frame buffer size mismatch"))?;
        self.frames_read += 1;
        Ok(Some(frame))
    }
}

impl Drop for FfmpegDecoder {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::sampler::sample_frames;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    /// Reports one 4x2 video stream.
    const PROBE_4X2: &str =
        r#"echo '{"streams":[{"codec_type":"video","width":4,"height":2}]}'"#;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn tools(dir: &Path, ffprobe: &str, ffmpeg: &str) -> FfmpegTools {
        FfmpegTools {
            ffprobe: script(dir, "ffprobe", ffprobe),
            ffmpeg: script(dir, "ffmpeg", ffmpeg),
        }
    }

    #[test]
    fn test_decodes_frames_at_probed_size() {
        let dir = tempdir().unwrap();
        // Two 4x2 rgb24 frames, only when rotation is left alone
        let tools = tools(
            dir.path(),
            PROBE_4X2,
            r#"case "$*" in
  *-noautorotate*) head -c 48 /dev/zero ;;
  *) echo "autorotate on" >&2; exit 3 ;;
esac"#,
        );

        let mut decoder = FfmpegDecoder::open_with(&tools, &dir.path().join("Gameplay.mp4")).unwrap();
        assert_eq!(decoder.info(), VideoInfo { width: 4, height: 2 });
        assert_eq!(decoder.next_frame().unwrap().unwrap().dimensions(), (4, 2));
        assert!(decoder.next_frame().unwrap().is_some());
        assert!(decoder.next_frame().unwrap().is_none());
        assert!(decoder.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_truncated_last_frame_is_dropped() {
        let dir = tempdir().unwrap();
        let tools = tools(dir.path(), PROBE_4X2, "head -c 30 /dev/zero");

        let mut decoder = FfmpegDecoder::open_with(&tools, &dir.path().join("Gameplay.mp4")).unwrap();
        assert!(decoder.next_frame().unwrap().is_some());
        assert!(decoder.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_decoder_failure_is_an_error() {
        let dir = tempdir().unwrap();
        let tools = tools(
            dir.path(),
            PROBE_4X2,
            r#"echo "Decoder (codec hevc) not found" >&2; exit 1"#,
        );
        let out = dir.path().join("frames");

        let mut decoder = FfmpegDecoder::open_with(&tools, &dir.path().join("Gameplay.mp4")).unwrap();
        let err = sample_frames(&mut decoder, 100, &out).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("not found"), "{}", message);
        assert!(message.contains("Gameplay.mp4"), "{}", message);
    }

    #[test]
    fn test_no_decoded_frames_is_an_error() {
        let dir = tempdir().unwrap();
        let tools = tools(dir.path(), PROBE_4X2, "exit 0");

        let mut decoder = FfmpegDecoder::open_with(&tools, &dir.path().join("Gameplay.mp4")).unwrap();
        let err = decoder.next_frame().unwrap_err();
        assert!(err.to_string().contains("No frames"));
    }

    #[test]
    fn test_unprobeable_file_fails_to_open() {
        let dir = tempdir().unwrap();
        let tools = tools(
            dir.path(),
            r#"echo "Invalid data found when processing input" >&2; exit 1"#,
            "exit 0",
        );

        let result = FfmpegDecoder::open_with(&tools, &dir.path().join("Gameplay.mp4"));
        assert!(result.is_err());
    }
}
