// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the calibration engine, the frame stepper
//! and the media worker handle, and wires them together: clicks feed the
//! engine, a recorded point advances the stepper, and the resulting seek
//! goes to the worker.

use crate::io::media::{self, MediaEvent, MediaHandle, MediaResource};
use crate::io::serialization::{self, SessionData};
use crate::models::calibration::{CalibrationEngine, ClickResult, PixelPoint};
use crate::models::stepper::{FrameStepper, StepResult, DEFAULT_FRAME_RATE};
use crate::ui::{canvas, properties, toolbar};

/// Main application state.
pub struct KinetraceApp {
    /// Nominal frame rate applied when the next resource is opened
    nominal_rate: f64,

    /// Handle to the media worker for the loaded resource
    media: Option<MediaHandle>,

    /// Name of the loaded resource, for display and export
    media_name: Option<String>,

    /// Click-to-point state machine; exists once metadata arrived
    engine: Option<CalibrationEngine>,

    /// Playback position owner; exists once metadata arrived
    stepper: Option<FrameStepper>,

    /// Texture of the currently displayed frame
    frame_texture: Option<egui::TextureHandle>,

    /// Message shown while the worker opens a resource
    loading_message: Option<String>,

    /// True between issuing a seek and receiving its frame
    awaiting_frame: bool,

    /// User-facing warning (degenerate calibration, decode failure)
    notice: Option<String>,
}

impl Default for KinetraceApp {
    fn default() -> Self {
        Self::new()
    }
}

impl KinetraceApp {
    /// Create a new KineTrace application instance.
    pub fn new() -> Self {
        Self {
            nominal_rate: DEFAULT_FRAME_RATE,
            media: None,
            media_name: None,
            engine: None,
            stepper: None,
            frame_texture: None,
            loading_message: None,
            awaiting_frame: false,
            notice: None,
        }
    }

    /// Open a media resource, replacing any loaded one.
    ///
    /// The engine and stepper are rebuilt when the worker reports
    /// metadata; until then the session is in a loading state.
    fn open_resource(&mut self, resource: MediaResource) {
        log::info!("Opening {}", resource.display_name());
        self.loading_message = Some(format!("Opening {}...", resource.display_name()));
        self.media_name = Some(resource.display_name());
        self.engine = None;
        self.stepper = None;
        self.frame_texture = None;
        self.awaiting_frame = false;
        self.notice = None;
        self.media = Some(media::spawn_media_worker(resource, self.nominal_rate));
    }

    /// Feed one frame-space click to the engine; a recorded point advances
    /// the video.
    fn handle_frame_click(&mut self, point: PixelPoint) {
        let result = match self.engine {
            Some(ref mut engine) => engine.submit_click(point),
            None => return,
        };

        match result {
            ClickResult::OriginSet => {
                self.notice = None;
                log::info!("Origin set at ({:.2}, {:.2})", point.x, point.y);
            }
            ClickResult::SecondPointSet => {
                self.notice = None;
                log::info!("Second reference point set at ({:.2}, {:.2})", point.x, point.y);
            }
            ClickResult::PointCollected(collected) => {
                self.notice = None;
                log::info!("Collected point ({:.3}, {:.3})", collected.x, collected.y);
                self.advance_frame();
            }
            ClickResult::DegenerateCalibration => {
                log::warn!("Second reference point rejected: zero distance on an axis");
                self.notice = Some(
                    "The second reference point must differ from the origin on both axes."
                        .to_string(),
                );
            }
            ClickResult::OutOfBounds => {
                log::debug!("Ignored click outside the frame at ({:.2}, {:.2})", point.x, point.y);
            }
        }
    }

    /// Advance one nominal frame and request the new frame's rasterization.
    fn advance_frame(&mut self) {
        if let Some(ref mut stepper) = self.stepper {
            match stepper.advance() {
                StepResult::Advanced(timestamp) => {
                    log::debug!("Advanced to {:.3}s", timestamp);
                    if let Some(ref media) = self.media {
                        media.seek(timestamp);
                        self.awaiting_frame = true;
                    }
                }
                StepResult::EndOfStream => {
                    log::info!("Reached the last frame at {:.3}s", stepper.position());
                }
            }
        }
    }

    /// Step one nominal frame back and request the frame there.
    fn step_back(&mut self) {
        if let Some(ref mut stepper) = self.stepper {
            let timestamp = stepper.step_back();
            log::debug!("Stepped back to {:.3}s", timestamp);
            if let Some(ref media) = self.media {
                media.seek(timestamp);
                self.awaiting_frame = true;
            }
        }
    }

    /// Discard the calibration and collected points, keeping the video and
    /// its playback position.
    fn reset_calibration(&mut self) {
        if let Some(ref mut engine) = self.engine {
            engine.reset();
            self.notice = None;
            log::info!("Calibration reset");
        }
    }

    /// Export the collected points with their calibration references.
    fn export_points(&self, path: std::path::PathBuf) {
        let (engine, stepper) = match (&self.engine, &self.stepper) {
            (Some(engine), Some(stepper)) => (engine, stepper),
            _ => return,
        };
        let (origin, second_point, scale) =
            match (engine.origin(), engine.second_point(), engine.scale()) {
                (Some(origin), Some(second_point), Some(scale)) => (origin, second_point, scale),
                _ => {
                    log::error!("Export requested before calibration is complete");
                    return;
                }
            };

        let (frame_width, frame_height) = stepper.resolution();
        let data = SessionData {
            media_file: self.media_name.clone().unwrap_or_default(),
            frame_width,
            frame_height,
            frame_rate: stepper.frame_rate(),
            origin,
            second_point,
            scale,
            points: engine.points().to_vec(),
        };

        let extension = path.extension().and_then(|s| s.to_str());
        let result = match extension {
            Some("yaml") | Some("yml") => serialization::export_yaml(&data, &path),
            Some("json") => serialization::export_json(&data, &path),
            _ => {
                log::error!("Unsupported file extension: {:?}", extension);
                return;
            }
        };

        match result {
            Ok(_) => log::info!("Exported {} points to {}", data.points.len(), path.display()),
            Err(e) => log::error!("Failed to export points: {}", e),
        }
    }

    /// Apply one worker notification to the session state.
    fn handle_media_event(&mut self, event: MediaEvent, ctx: &egui::Context) {
        match event {
            MediaEvent::MetadataLoaded(metadata) => {
                log::info!(
                    "Media ready: {}x{}, {:.2}s",
                    metadata.width,
                    metadata.height,
                    metadata.duration
                );
                self.loading_message = None;
                self.engine = Some(CalibrationEngine::new(metadata.width, metadata.height));
                self.stepper = Some(FrameStepper::new(metadata, self.nominal_rate));

                // The initial seek rasterizes frame 0.
                if let Some(ref media) = self.media {
                    media.seek(0.0);
                    self.awaiting_frame = true;
                }
            }
            MediaEvent::FrameReady { timestamp, image } => {
                self.awaiting_frame = false;
                let size = [image.width as usize, image.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
                self.frame_texture =
                    Some(ctx.load_texture("video_frame", color_image, egui::TextureOptions::LINEAR));
                log::debug!("Displayed frame at {:.3}s", timestamp);
            }
            MediaEvent::Failed(message) => {
                log::error!("Media worker: {}", message);
                self.loading_message = None;
                self.awaiting_frame = false;
                self.notice = Some(message);
            }
        }
    }
}

impl eframe::App for KinetraceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Drain worker notifications before drawing
        let mut events = Vec::new();
        if let Some(ref media) = self.media {
            while let Some(event) = media.poll() {
                events.push(event);
            }
        }
        for event in events {
            self.handle_media_event(event, ctx);
        }

        // Request repaint while waiting on the worker (to update spinner)
        if self.loading_message.is_some() || self.awaiting_frame {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Video...").clicked() {
                        // Open native file picker
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Videos", &["mp4", "avi", "mov", "mkv", "webm"])
                            .pick_file()
                        {
                            self.open_resource(MediaResource::Video(path));
                        }
                        ui.close_menu();
                    }
                    if ui.button("Open Image Sequence...").clicked() {
                        // Picking any image selects the whole directory
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "tiff", "tif"])
                            .pick_file()
                        {
                            let dir = path
                                .parent()
                                .map(std::path::Path::to_path_buf)
                                .unwrap_or_else(|| std::path::PathBuf::from("."));
                            self.open_resource(MediaResource::ImageSequence(dir));
                        }
                        ui.close_menu();
                    }
                    ui.separator();

                    let calibrated = self
                        .engine
                        .as_ref()
                        .map(|engine| engine.scale().is_some())
                        .unwrap_or(false);
                    ui.menu_button("Export Points", |ui| {
                        if ui
                            .add_enabled(calibrated, egui::Button::new("Export as YAML..."))
                            .clicked()
                        {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("YAML", &["yaml", "yml"])
                                .set_file_name("points.yaml")
                                .save_file()
                            {
                                self.export_points(path);
                            }
                            ui.close_menu();
                        }
                        if ui
                            .add_enabled(calibrated, egui::Button::new("Export as JSON..."))
                            .clicked()
                        {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("JSON", &["json"])
                                .set_file_name("points.json")
                                .save_file()
                            {
                                self.export_points(path);
                            }
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        // Toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            let phase = self.engine.as_ref().map(|engine| engine.phase());
            let toolbar_action = toolbar::show(ui, &mut self.nominal_rate, phase);
            match toolbar_action {
                toolbar::ToolbarAction::StepForward => self.advance_frame(),
                toolbar::ToolbarAction::StepBack => self.step_back(),
                toolbar::ToolbarAction::ResetCalibration => self.reset_calibration(),
                toolbar::ToolbarAction::None => {}
            }
        });

        // Session panel (right side)
        egui::SidePanel::right("session")
            .default_width(280.0)
            .show(ctx, |ui| {
                properties::show(
                    ui,
                    self.engine.as_ref(),
                    self.stepper.as_ref(),
                    self.media_name.as_deref(),
                    self.notice.as_deref(),
                );
            });

        // Handle keyboard stepping
        // Only process if no text field is focused
        if !ctx.wants_keyboard_input() {
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
                self.advance_frame();
            }
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
                self.step_back();
            }
        }

        // Main canvas (center)
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                // Show loading overlay if loading
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    canvas::CanvasAction::None
                } else {
                    canvas::show(
                        ui,
                        &self.frame_texture,
                        self.engine.as_ref(),
                        self.stepper.as_ref(),
                    )
                }
            })
            .inner;

        // Handle canvas actions
        match canvas_action {
            canvas::CanvasAction::ClickedFrame(point) => {
                self.handle_frame_click(point);
            }
            canvas::CanvasAction::None => {}
        }
    }
}
