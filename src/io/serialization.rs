// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Collected-point export.
//!
//! This module writes a session's calibration references and collected
//! points to YAML or JSON, with enough context to interpret the numbers
//! without the video at hand.

use crate::models::calibration::{CalibratedPoint, PixelPoint, Scale};
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

/// Exported session: the calibration references plus the point list.
#[derive(Debug, Clone, Serialize)]
pub struct SessionData {
    pub media_file: String,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Nominal rate used for stepping, in frames per second.
    pub frame_rate: f64,
    pub origin: PixelPoint,
    pub second_point: PixelPoint,
    pub scale: Scale,
    pub points: Vec<CalibratedPoint>,
}

/// Export session data to YAML format.
pub fn export_yaml(data: &SessionData, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export session data to JSON format.
pub fn export_json(data: &SessionData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionData {
        SessionData {
            media_file: "sprint.mp4".to_string(),
            frame_width: 1920,
            frame_height: 1080,
            frame_rate: 25.0,
            origin: PixelPoint::new(100.0, 100.0),
            second_point: PixelPoint::new(150.0, 125.0),
            scale: Scale { x: 50.0, y: 25.0 },
            points: vec![
                CalibratedPoint { x: -12.5, y: -12.5 },
                CalibratedPoint { x: 0.0, y: 0.0 },
            ],
        }
    }

    #[test]
    fn exported_json_carries_calibration_references() {
        let json = serde_json::to_string_pretty(&session()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["media_file"], "sprint.mp4");
        assert_eq!(value["frame_rate"], 25.0);
        assert_eq!(value["origin"]["x"], 100.0);
        assert_eq!(value["second_point"]["y"], 125.0);
        assert_eq!(value["scale"]["x"], 50.0);

        let points = value["points"].as_array().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0]["x"], -12.5);
    }

    #[test]
    fn exported_yaml_lists_points_in_order() {
        let yaml = serde_yaml::to_string(&session()).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        let points = value["points"].as_sequence().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0]["y"].as_f64(), Some(-12.5));
        assert_eq!(points[1]["x"].as_f64(), Some(0.0));
    }
}
