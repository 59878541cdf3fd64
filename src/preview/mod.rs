//! Annotated preview of processed frames.
//!
//! Whether a window can be shown is decided once at startup. Headless runs
//! get [`Display::Headless`], which ignores every frame. Interactive runs put
//! an eframe window on the main thread and hand the scan a
//! [`Display::Interactive`] handle that talks to it over channels.

pub mod window;

use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::sync::mpsc::{Receiver, SyncSender, TryRecvError, TrySendError, channel, sync_channel};
use std::thread;

use crate::config::{HudRegions, PixelRect};
use crate::log;

pub const HEALTH_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const SCORE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// ROI outline thickness in pixels.
const OUTLINE_WIDTH: u32 = 2;

/// One annotated frame plus the text drawn over it by the window.
#[derive(Clone, Debug)]
pub struct PreviewFrame {
    pub image: RgbImage,
    pub frame_number: u64,
    pub health: String,
    pub score: String,
}

/// Key presses forwarded from the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewKey {
    /// Q: stop processing
    Quit,
    /// Space: wait for the next key
    Pause,
    Other,
}

/// What the scan loop should do after showing a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewControl {
    Continue,
    Quit,
}

/// How the run will display frames, decided before processing starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    Headless,
    Interactive,
}

/// Scan-side end of the preview window.
pub struct PreviewHandle {
    frames: SyncSender<PreviewFrame>,
    keys: Receiver<PreviewKey>,
}

pub enum Display {
    Headless,
    Interactive(PreviewHandle),
}

impl Display {
    /// Offers a frame to the window and applies any pending key presses.
    ///
    /// Frames are dropped while the window is still busy with the previous
    /// one. If the window has gone away the display turns headless.
    pub fn show(&mut self, frame: PreviewFrame) -> PreviewControl {
        let Display::Interactive(handle) = self else {
            return PreviewControl::Continue;
        };

        match handle.poll(frame) {
            Some(control) => control,
            None => {
                log("Preview window closed, continuing without display");
                *self = Display::Headless;
                PreviewControl::Continue
            }
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Display::Interactive(_))
    }
}

impl PreviewHandle {
    /// Returns `None` when the window side is disconnected.
    fn poll(&self, frame: PreviewFrame) -> Option<PreviewControl> {
        match self.frames.try_send(frame) {
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => return None,
        }

        loop {
            match self.keys.try_recv() {
                Ok(PreviewKey::Quit) => return Some(PreviewControl::Quit),
                Ok(PreviewKey::Pause) => {
                    log("Paused. Press any key in the preview window to continue.");
                    // Any key resumes; a closed window resumes too
                    let _ = self.keys.recv();
                    return Some(PreviewControl::Continue);
                }
                Ok(PreviewKey::Other) => continue,
                Err(TryRecvError::Empty) => return Some(PreviewControl::Continue),
                Err(TryRecvError::Disconnected) => return None,
            }
        }
    }
}

/// Returns true if a graphical session looks available.
pub fn display_available() -> bool {
    if cfg!(any(
        target_os = "linux",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd"
    )) {
        ["DISPLAY", "WAYLAND_DISPLAY"]
            .iter()
            .any(|var| std::env::var_os(var).is_some_and(|v| !v.is_empty()))
    } else {
        true
    }
}

/// Picks the display mode for this run.
pub fn select_display_mode(want_display: bool) -> DisplayMode {
    if want_display && display_available() {
        DisplayMode::Interactive
    } else {
        DisplayMode::Headless
    }
}

/// Runs `job` on a worker thread while the preview window owns the main thread.
///
/// Blocks until the job finishes. If the window cannot be created, or is
/// closed early, the job keeps running headless.
pub fn run_with_preview<T, F>(title: &str, job: F) -> T
where
    F: FnOnce(Display) -> T + Send + 'static,
    T: Send + 'static,
{
    let (frame_tx, frame_rx) = sync_channel(1);
    let (key_tx, key_rx) = channel();
    let handle = PreviewHandle {
        frames: frame_tx,
        keys: key_rx,
    };

    let worker = thread::spawn(move || job(Display::Interactive(handle)));

    if let Err(e) = window::run_window(title, frame_rx, key_tx) {
        log(&format!("Preview window unavailable: {}", e));
    }

    match worker.join() {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

fn outline(img: &mut RgbImage, region: &PixelRect, color: Rgb<u8>) {
    for inset in 0..OUTLINE_WIDTH {
        let w = region.width().saturating_sub(2 * inset);
        let h = region.height().saturating_sub(2 * inset);
        if w == 0 || h == 0 {
            break;
        }
        let rect = Rect::at((region.x1 + inset) as i32, (region.y1 + inset) as i32).of_size(w, h);
        draw_hollow_rect_mut(img, rect, color);
    }
}

/// Draws both ROIs onto a copy of the frame and scales it to `max_width`.
pub fn annotate_frame(frame: &RgbImage, regions: &HudRegions, max_width: u32) -> RgbImage {
    let mut img = frame.clone();
    outline(&mut img, &regions.health, HEALTH_COLOR);
    outline(&mut img, &regions.score, SCORE_COLOR);

    let (width, height) = img.dimensions();
    if max_width == 0 || width <= max_width {
        return img;
    }

    let scale = max_width as f64 / width as f64;
    let new_height = ((height as f64 * scale) as u32).max(1);
    image::imageops::resize(&img, max_width, new_height, FilterType::Triangle)
}

/// An interactive display wired to test-side channels instead of a window.
#[cfg(test)]
pub(crate) fn interactive() -> (
    Display,
    Receiver<PreviewFrame>,
    std::sync::mpsc::Sender<PreviewKey>,
) {
    let (frame_tx, frame_rx) = sync_channel(1);
    let (key_tx, key_rx) = channel();
    let display = Display::Interactive(PreviewHandle {
        frames: frame_tx,
        keys: key_rx,
    });
    (display, frame_rx, key_tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview_frame() -> PreviewFrame {
        PreviewFrame {
            image: RgbImage::new(4, 4),
            frame_number: 30,
            health: "42".to_string(),
            score: "None".to_string(),
        }
    }

    #[test]
    fn test_headless_always_continues() {
        let mut display = Display::Headless;
        assert_eq!(display.show(preview_frame()), PreviewControl::Continue);
        assert!(!display.is_interactive());
    }

    #[test]
    fn test_quit_key() {
        let (mut display, frames, keys) = interactive();
        keys.send(PreviewKey::Other).unwrap();
        keys.send(PreviewKey::Quit).unwrap();

        assert_eq!(display.show(preview_frame()), PreviewControl::Quit);
        assert_eq!(frames.try_recv().unwrap().frame_number, 30);
    }

    #[test]
    fn test_pause_resumes_on_any_key() {
        let (mut display, _frames, keys) = interactive();
        keys.send(PreviewKey::Pause).unwrap();
        keys.send(PreviewKey::Quit).unwrap();

        // The key after a pause only resumes
        assert_eq!(display.show(preview_frame()), PreviewControl::Continue);
        assert!(display.is_interactive());
    }

    #[test]
    fn test_full_window_queue_drops_frame() {
        let (mut display, frames, _keys) = interactive();
        assert_eq!(display.show(preview_frame()), PreviewControl::Continue);
        assert_eq!(display.show(preview_frame()), PreviewControl::Continue);
        assert!(frames.try_recv().is_ok());
        assert!(frames.try_recv().is_err());
    }

    #[test]
    fn test_closed_window_degrades_to_headless() {
        let (mut display, frames, keys) = interactive();
        drop(frames);
        drop(keys);

        assert_eq!(display.show(preview_frame()), PreviewControl::Continue);
        assert!(!display.is_interactive());
    }

    #[test]
    fn test_select_display_mode_respects_opt_out() {
        assert_eq!(select_display_mode(false), DisplayMode::Headless);
    }

    #[test]
    fn test_annotate_draws_outlines() {
        let frame = RgbImage::new(640, 360);
        let regions = HudRegions::default();
        let annotated = annotate_frame(&frame, &regions, 1280);

        assert_eq!(annotated.dimensions(), (640, 360));
        assert_eq!(*annotated.get_pixel(115, 150), HEALTH_COLOR);
        assert_eq!(*annotated.get_pixel(116, 151), HEALTH_COLOR);
        assert_eq!(*annotated.get_pixel(200, 125), SCORE_COLOR);
        // Interior untouched
        assert_eq!(*annotated.get_pixel(200, 160), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_annotate_scales_wide_frames() {
        let frame = RgbImage::new(2560, 1440);
        let annotated = annotate_frame(&frame, &HudRegions::default(), 1280);
        assert_eq!(annotated.dimensions(), (1280, 720));
    }

    #[test]
    fn test_annotate_tolerates_regions_outside_frame() {
        let frame = RgbImage::new(50, 50);
        let annotated = annotate_frame(&frame, &HudRegions::default(), 1280);
        assert_eq!(annotated.dimensions(), (50, 50));
    }
}
