// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame display canvas.
//!
//! This module shows the current video frame scaled to fit the available
//! space, reports clicks on it in native pixel coordinates, and overlays
//! the calibration reference markers.

use crate::models::calibration::{CalibrationEngine, PixelPoint};
use crate::models::stepper::FrameStepper;
use crate::util::geometry;

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    /// The displayed frame was clicked at this native pixel position.
    ClickedFrame(PixelPoint),
}

/// Display the current frame and handle clicks on it.
pub fn show(
    ui: &mut egui::Ui,
    frame_texture: &Option<egui::TextureHandle>,
    engine: Option<&CalibrationEngine>,
    stepper: Option<&FrameStepper>,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    // Set background color
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    // Create a frame for the canvas
    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        if let (Some(texture), Some(stepper)) = (frame_texture, stepper) {
            let (frame_width, frame_height) = stepper.resolution();

            // Calculate scaling to fit the frame in the available space
            let available = ui.available_size();
            let frame_aspect = frame_width as f32 / frame_height as f32;
            let available_aspect = available.x / available.y;

            let (display_width, display_height) = if frame_aspect > available_aspect {
                // Frame is wider - fit to width
                let width = available.x;
                (width, width / frame_aspect)
            } else {
                // Frame is taller - fit to height
                let height = available.y;
                (height * frame_aspect, height)
            };

            // Center the frame
            let x_offset = (available.x - display_width) / 2.0;
            let y_offset = (available.y - display_height) / 2.0;

            let image_rect = egui::Rect::from_min_size(
                ui.min_rect().min + egui::vec2(x_offset, y_offset),
                egui::vec2(display_width, display_height),
            );

            // Draw the frame
            ui.painter().image(
                texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );

            let response = ui.allocate_rect(image_rect, egui::Sense::click());

            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    if image_rect.contains(pos) {
                        action = CanvasAction::ClickedFrame(geometry::screen_to_frame(
                            pos,
                            image_rect,
                            frame_width,
                            frame_height,
                        ));
                    }
                }
            }

            if let Some(engine) = engine {
                draw_reference_markers(ui.painter(), engine, image_rect, frame_width, frame_height);

                // Live readout of the calibrated position under the cursor.
                if let Some(pos) = response.hover_pos() {
                    if image_rect.contains(pos) {
                        let frame_pos =
                            geometry::screen_to_frame(pos, image_rect, frame_width, frame_height);
                        if let Some(calibrated) = engine.calibrate(frame_pos) {
                            ui.painter().text(
                                pos + egui::vec2(12.0, -8.0),
                                egui::Align2::LEFT_BOTTOM,
                                format!("({:.2}, {:.2})", calibrated.x, calibrated.y),
                                egui::FontId::monospace(12.0),
                                egui::Color32::from_gray(230),
                            );
                        }
                    }
                }
            }
        } else if stepper.is_some() {
            // Metadata arrived but the first frame has not been decoded yet
            ui.centered_and_justified(|ui| {
                ui.label(egui::RichText::new("Decoding frame...").color(egui::Color32::WHITE));
            });
        } else {
            // Show welcome message when no media is loaded
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.heading(
                        egui::RichText::new("KineTrace")
                            .size(32.0)
                            .color(egui::Color32::from_gray(200)),
                    );
                    ui.label(
                        egui::RichText::new("Calibrated frame-by-frame coordinate tracking")
                            .size(14.0)
                            .color(egui::Color32::from_gray(150)),
                    );
                    ui.add_space(20.0);
                    ui.label(
                        egui::RichText::new("Open a video or an image sequence to begin")
                            .color(egui::Color32::from_gray(180)),
                    );
                    ui.add_space(10.0);
                    ui.label(
                        egui::RichText::new("File → Open Video... / Open Image Sequence...")
                            .weak()
                            .color(egui::Color32::from_gray(130)),
                    );
                });
            });
        }
    });

    // Display playback status at the bottom
    ui.separator();
    ui.horizontal(|ui| {
        if let Some(stepper) = stepper {
            ui.label(format!("Frame {}", stepper.frame_index()));
            ui.separator();
            ui.label(format!(
                "{:.3}s / {:.3}s",
                stepper.position(),
                stepper.duration()
            ));
            if stepper.at_end() {
                ui.separator();
                ui.colored_label(
                    egui::Color32::from_rgb(235, 180, 70),
                    "Reached the last frame of the video.",
                );
            }
        } else {
            ui.label("No media loaded");
        }
    });

    action
}

/// Draw the calibration reference markers over the frame.
fn draw_reference_markers(
    painter: &egui::Painter,
    engine: &CalibrationEngine,
    image_rect: egui::Rect,
    frame_width: u32,
    frame_height: u32,
) {
    let origin = match engine.origin() {
        Some(origin) => geometry::frame_to_screen(origin, image_rect, frame_width, frame_height),
        None => return,
    };

    if let Some(second) = engine.second_point() {
        let second = geometry::frame_to_screen(second, image_rect, frame_width, frame_height);
        painter.line_segment(
            [origin, second],
            egui::Stroke::new(1.0, egui::Color32::LIGHT_BLUE),
        );
        draw_marker(painter, second, egui::Color32::LIGHT_BLUE);
    }

    draw_marker(painter, origin, egui::Color32::YELLOW);
}

/// Draw one reference marker: an open circle with a center dot.
fn draw_marker(painter: &egui::Painter, center: egui::Pos2, color: egui::Color32) {
    painter.circle_stroke(center, 6.0, egui::Stroke::new(2.0, color));
    painter.circle_filled(center, 2.0, color);
}
