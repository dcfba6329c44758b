// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback and calibration controls.
//!
//! This module provides the toolbar with the nominal frame rate control,
//! manual stepping buttons and the calibration reset.

use crate::models::calibration::CalibrationPhase;

/// Result of toolbar interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    /// Advance one frame without recording a point.
    StepForward,
    /// Step one frame back, clearing the end-of-stream condition.
    StepBack,
    /// Discard the calibration and all collected points.
    ResetCalibration,
}

/// Display the toolbar. `phase` is `None` until a resource is loaded.
pub fn show(
    ui: &mut egui::Ui,
    nominal_rate: &mut f64,
    phase: Option<CalibrationPhase>,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let has_media = phase.is_some();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        // Applied when the next resource is opened
        ui.label("Nominal rate:");
        ui.add(
            egui::DragValue::new(nominal_rate)
                .speed(1.0)
                .range(1.0..=240.0)
                .suffix(" fps"),
        );

        ui.separator();

        if ui
            .add_enabled(has_media, egui::Button::new("◀ Back"))
            .clicked()
        {
            action = ToolbarAction::StepBack;
        }

        if ui
            .add_enabled(has_media, egui::Button::new("Next ▶"))
            .clicked()
        {
            action = ToolbarAction::StepForward;
        }

        ui.separator();

        if ui
            .add_enabled(has_media, egui::Button::new("Reset calibration"))
            .clicked()
        {
            action = ToolbarAction::ResetCalibration;
        }

        ui.separator();

        // Phase hint
        let hint = match phase {
            None => "Open a video or an image sequence to begin",
            Some(CalibrationPhase::AwaitingOrigin) => "Click the frame to set the origin",
            Some(CalibrationPhase::AwaitingSecondPoint) => {
                "Click the second reference point to fix the scale"
            }
            Some(CalibrationPhase::Collecting) => {
                "Every click records a point and advances one frame"
            }
        };

        ui.label(egui::RichText::new(hint).italics().weak());
    });

    action
}
