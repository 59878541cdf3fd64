//! The eframe preview window.
//!
//! Shows the latest annotated frame with the readings above it and forwards
//! key presses to the scan thread. Closes itself once the scan hangs up.

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::time::Duration;

use eframe::egui::{self, Color32, RichText, TextureHandle, Vec2};

use super::{PreviewFrame, PreviewKey};

const REPAINT_INTERVAL: Duration = Duration::from_millis(15);

pub struct PreviewApp {
    frames: Receiver<PreviewFrame>,
    keys: Sender<PreviewKey>,
    texture: Option<TextureHandle>,
    current: Option<PreviewFrame>,
    scan_finished: bool,
}

impl PreviewApp {
    pub fn new(frames: Receiver<PreviewFrame>, keys: Sender<PreviewKey>) -> Self {
        Self {
            frames,
            keys,
            texture: None,
            current: None,
            scan_finished: false,
        }
    }

    /// Takes the newest queued frame, if any, and uploads it.
    fn receive_frames(&mut self, ctx: &egui::Context) {
        let mut latest = None;
        loop {
            match self.frames.try_recv() {
                Ok(frame) => latest = Some(frame),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.scan_finished = true;
                    break;
                }
            }
        }

        let Some(frame) = latest else {
            return;
        };

        let size = [frame.image.width() as usize, frame.image.height() as usize];
        let color_image = egui::ColorImage::from_rgb(size, frame.image.as_raw());
        match &mut self.texture {
            Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture(
                    "preview_frame",
                    color_image,
                    egui::TextureOptions::LINEAR,
                ))
            }
        }
        self.current = Some(frame);
    }

    fn forward_keys(&self, ctx: &egui::Context) {
        let pressed: Vec<PreviewKey> = ctx.input(|input| {
            input
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        ..
                    } => Some(match key {
                        egui::Key::Q => PreviewKey::Quit,
                        egui::Key::Space => PreviewKey::Pause,
                        _ => PreviewKey::Other,
                    }),
                    _ => None,
                })
                .collect()
        });

        for key in pressed {
            let _ = self.keys.send(key);
        }
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.receive_frames(ctx);
        self.forward_keys(ctx);

        if self.scan_finished {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            match &self.current {
                Some(frame) => {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(format!("Health: {}", frame.health))
                                .color(Color32::from_rgb(0, 200, 0))
                                .strong(),
                        );
                        ui.add_space(16.0);
                        ui.label(
                            RichText::new(format!("Score: {}", frame.score))
                                .color(Color32::from_rgb(220, 0, 0))
                                .strong(),
                        );
                        ui.add_space(16.0);
                        ui.label(RichText::new(format!("Frame: {}", frame.frame_number)).strong());
                    });
                }
                None => {
                    ui.label("Waiting for the first processed frame...");
                }
            }

            if let Some(texture) = &self.texture {
                ui.image((texture.id(), texture.size_vec2()));
            }
        });

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}

/// Opens the preview window and blocks until it closes.
pub fn run_window(
    title: &str,
    frames: Receiver<PreviewFrame>,
    keys: Sender<PreviewKey>,
) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(Vec2::new(1296.0, 780.0))
            .with_title(title),
        ..Default::default()
    };

    eframe::run_native(
        title,
        options,
        Box::new(move |_cc| Ok(Box::new(PreviewApp::new(frames, keys)))),
    )
}
