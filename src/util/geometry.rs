// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides conversions between on-screen positions inside the
//! rectangle a frame is displayed in and the frame's native pixel space.

use crate::models::calibration::PixelPoint;

/// Convert an on-screen position inside `display` to native pixel
/// coordinates of a `frame_width` x `frame_height` frame.
pub fn screen_to_frame(
    pos: egui::Pos2,
    display: egui::Rect,
    frame_width: u32,
    frame_height: u32,
) -> PixelPoint {
    PixelPoint::new(
        (pos.x - display.min.x) as f64 / display.width() as f64 * frame_width as f64,
        (pos.y - display.min.y) as f64 / display.height() as f64 * frame_height as f64,
    )
}

/// Convert native pixel coordinates to the on-screen position inside
/// `display`.
pub fn frame_to_screen(
    point: PixelPoint,
    display: egui::Rect,
    frame_width: u32,
    frame_height: u32,
) -> egui::Pos2 {
    egui::pos2(
        display.min.x + (point.x / frame_width as f64) as f32 * display.width(),
        display.min.y + (point.y / frame_height as f64) as f32 * display.height(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_frame_roundtrip() {
        let display = egui::Rect::from_min_size(egui::pos2(40.0, 60.0), egui::vec2(800.0, 450.0));
        let point = PixelPoint::new(960.0, 540.0);

        let screen = frame_to_screen(point, display, 1920, 1080);
        let back = screen_to_frame(screen, display, 1920, 1080);

        assert!((back.x - point.x).abs() < 0.01);
        assert!((back.y - point.y).abs() < 0.01);
    }

    #[test]
    fn test_corners_map_to_frame_extents() {
        let display = egui::Rect::from_min_size(egui::pos2(100.0, 50.0), egui::vec2(640.0, 360.0));

        // Top-left corner
        let tl = screen_to_frame(display.min, display, 1920, 1080);
        assert_eq!(tl.x, 0.0);
        assert_eq!(tl.y, 0.0);

        // Bottom-right corner
        let br = screen_to_frame(display.max, display, 1920, 1080);
        assert_eq!(br.x, 1920.0);
        assert_eq!(br.y, 1080.0);
    }
}
