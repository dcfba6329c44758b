// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session status panel.
//!
//! This module provides the read-only side panel showing the loaded media,
//! the calibration references and the table of collected points.

use crate::models::calibration::{CalibrationEngine, CalibrationPhase, SCALE_SPAN_UNITS};
use crate::models::stepper::FrameStepper;

/// Display the session status panel.
pub fn show(
    ui: &mut egui::Ui,
    engine: Option<&CalibrationEngine>,
    stepper: Option<&FrameStepper>,
    media_name: Option<&str>,
    notice: Option<&str>,
) {
    ui.heading("Session");
    ui.separator();

    if let Some(notice) = notice {
        ui.colored_label(egui::Color32::from_rgb(230, 140, 60), notice);
        ui.separator();
    }

    let (engine, stepper) = match (engine, stepper) {
        (Some(engine), Some(stepper)) => (engine, stepper),
        _ => {
            ui.label("Open a video or an image sequence to begin.");
            return;
        }
    };

    let (frame_width, frame_height) = stepper.resolution();
    egui::Grid::new("media_info").num_columns(2).show(ui, |ui| {
        ui.label("Media:");
        ui.label(media_name.unwrap_or("-"));
        ui.end_row();

        ui.label("Frame size:");
        ui.label(format!("{}x{}", frame_width, frame_height));
        ui.end_row();

        ui.label("Step rate:");
        ui.label(format!("{:.1} fps", stepper.frame_rate()));
        ui.end_row();

        ui.label("Duration:");
        ui.label(format!("{:.2}s", stepper.duration()));
        ui.end_row();
    });

    ui.separator();
    ui.heading("Calibration");

    let instruction = match engine.phase() {
        CalibrationPhase::AwaitingOrigin => "Click the frame at the origin reference point.",
        CalibrationPhase::AwaitingSecondPoint => {
            "Click the second reference point. Its distance to the origin \
             fixes the scale on both axes."
        }
        CalibrationPhase::Collecting => {
            "Every click records a calibrated point and advances one frame."
        }
    };
    ui.label(egui::RichText::new(instruction).italics().weak());

    egui::Grid::new("calibration_refs")
        .num_columns(2)
        .show(ui, |ui| {
            if let Some(origin) = engine.origin() {
                ui.label("Origin (px):");
                ui.label(format!("({:.2}, {:.2})", origin.x, origin.y));
                ui.end_row();
            }
            if let Some(second) = engine.second_point() {
                ui.label("Second point (px):");
                ui.label(format!("({:.2}, {:.2})", second.x, second.y));
                ui.end_row();
            }
            if let Some(scale) = engine.scale() {
                ui.label(format!("Pixels per {} units:", SCALE_SPAN_UNITS));
                ui.label(format!("({:.2}, {:.2})", scale.x, scale.y));
                ui.end_row();
            }
        });

    ui.separator();
    ui.heading(format!("Collected points ({})", engine.points().len()));

    if engine.points().is_empty() {
        ui.label(egui::RichText::new("No points collected yet.").weak());
        return;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::Grid::new("collected_points")
            .striped(true)
            .num_columns(3)
            .min_col_width(50.0)
            .show(ui, |ui| {
                ui.label(egui::RichText::new("#").strong());
                ui.label(egui::RichText::new("X").strong());
                ui.label(egui::RichText::new("Y").strong());
                ui.end_row();

                for (index, point) in engine.points().iter().enumerate() {
                    // Shown 1-indexed
                    ui.label(format!("{}", index + 1));
                    ui.label(format!("{:.3}", point.x));
                    ui.label(format!("{:.3}", point.y));
                    ui.end_row();
                }
            });
    });
}
