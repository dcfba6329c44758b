// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! KineTrace - Calibrated Frame Coordinate Tracker
//!
//! A cross-platform desktop application for stepping through video frames
//! and logging clicked positions in a user-calibrated coordinate system.

mod app;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::KinetraceApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("KineTrace - Calibrated Frame Coordinate Tracker"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "KineTrace",
        options,
        Box::new(|_cc| Ok(Box::new(KinetraceApp::new()))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
