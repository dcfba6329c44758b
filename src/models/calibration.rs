// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Calibration state machine.
//!
//! This module converts raw pixel clicks on a displayed frame into
//! coordinates in a calibrated system defined by two reference points:
//! the first click fixes the origin, the second fixes the per-axis scale,
//! and every later click yields a calibrated data point.

use serde::{Deserialize, Serialize};

/// Calibrated units spanned by the origin-to-second-point distance, per axis.
pub const SCALE_SPAN_UNITS: f64 = 25.0;

/// A 2D position in a frame's native pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A collected coordinate in calibrated units relative to the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibratedPoint {
    pub x: f64,
    pub y: f64,
}

/// Pixel distance that equals `SCALE_SPAN_UNITS` calibrated units, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

/// Progress of the two-point calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationPhase {
    AwaitingOrigin,
    AwaitingSecondPoint,
    Collecting,
}

/// Outcome of feeding one click to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickResult {
    /// First reference point recorded.
    OriginSet,
    /// Second reference point recorded; the scale is now fixed.
    SecondPointSet,
    /// A calibrated point was appended; the caller should advance the video.
    PointCollected(CalibratedPoint),
    /// Second point rejected: it shares an axis value with the origin, so
    /// the scale would be zero on that axis.
    DegenerateCalibration,
    /// Click ignored: outside the frame bounds.
    OutOfBounds,
}

/// Three-phase state machine turning clicks into calibrated points.
///
/// Phases only move forward (`AwaitingOrigin` → `AwaitingSecondPoint` →
/// `Collecting`); `reset` is the sole way back. The reference points are
/// set once each and never mutated afterwards.
#[derive(Debug)]
pub struct CalibrationEngine {
    frame_width: f64,
    frame_height: f64,
    origin: Option<PixelPoint>,
    second_point: Option<PixelPoint>,
    scale: Option<Scale>,
    points: Vec<CalibratedPoint>,
}

impl CalibrationEngine {
    /// Create an engine for a frame of the given native size.
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        Self {
            frame_width: frame_width as f64,
            frame_height: frame_height as f64,
            origin: None,
            second_point: None,
            scale: None,
            points: Vec::new(),
        }
    }

    /// Consume one click in native pixel coordinates.
    ///
    /// The first two in-bounds clicks establish the calibration; every
    /// later one appends a `CalibratedPoint`. A second reference point
    /// with zero distance to the origin on either axis is rejected and
    /// the engine stays in `AwaitingSecondPoint`.
    pub fn submit_click(&mut self, p: PixelPoint) -> ClickResult {
        if !self.contains(p) {
            return ClickResult::OutOfBounds;
        }

        match (self.origin, self.scale) {
            (None, _) => {
                self.origin = Some(p);
                ClickResult::OriginSet
            }
            (Some(origin), None) => {
                let scale = Scale {
                    x: (p.x - origin.x).abs(),
                    y: (p.y - origin.y).abs(),
                };
                // A zero component would divide every later click by zero.
                if scale.x == 0.0 || scale.y == 0.0 {
                    return ClickResult::DegenerateCalibration;
                }
                self.second_point = Some(p);
                self.scale = Some(scale);
                ClickResult::SecondPointSet
            }
            (Some(origin), Some(scale)) => {
                let point = normalize(p, origin, scale);
                self.points.push(point);
                ClickResult::PointCollected(point)
            }
        }
    }

    /// Calibrated coordinates `p` would record, without mutating anything.
    ///
    /// `None` until both reference points are set, or when `p` lies
    /// outside the frame.
    pub fn calibrate(&self, p: PixelPoint) -> Option<CalibratedPoint> {
        if !self.contains(p) {
            return None;
        }
        let origin = self.origin?;
        let scale = self.scale?;
        Some(normalize(p, origin, scale))
    }

    /// Discard the reference points and collected points, returning to
    /// `AwaitingOrigin`. The frame bounds are kept.
    pub fn reset(&mut self) {
        self.origin = None;
        self.second_point = None;
        self.scale = None;
        self.points.clear();
    }

    pub fn phase(&self) -> CalibrationPhase {
        match (self.origin, self.scale) {
            (None, _) => CalibrationPhase::AwaitingOrigin,
            (Some(_), None) => CalibrationPhase::AwaitingSecondPoint,
            (Some(_), Some(_)) => CalibrationPhase::Collecting,
        }
    }

    pub fn origin(&self) -> Option<PixelPoint> {
        self.origin
    }

    pub fn second_point(&self) -> Option<PixelPoint> {
        self.second_point
    }

    pub fn scale(&self) -> Option<Scale> {
        self.scale
    }

    /// Collected points in insertion order (displayed 1-indexed).
    pub fn points(&self) -> &[CalibratedPoint] {
        &self.points
    }

    fn contains(&self, p: PixelPoint) -> bool {
        p.x >= 0.0 && p.x <= self.frame_width && p.y >= 0.0 && p.y <= self.frame_height
    }
}

/// Express `p` in calibrated units relative to `origin`.
///
/// Positive pixel offsets map to negative calibrated values, scaled so the
/// origin-to-second-point distance equals `SCALE_SPAN_UNITS` per axis.
fn normalize(p: PixelPoint, origin: PixelPoint, scale: Scale) -> CalibratedPoint {
    CalibratedPoint {
        x: -((p.x - origin.x) / scale.x) * SCALE_SPAN_UNITS,
        y: -((p.y - origin.y) / scale.y) * SCALE_SPAN_UNITS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> CalibrationEngine {
        CalibrationEngine::new(1920, 1080)
    }

    /// Engine with origin (100,100) and second point (150,125) already set.
    fn calibrated_engine() -> CalibrationEngine {
        let mut e = engine();
        assert_eq!(
            e.submit_click(PixelPoint::new(100.0, 100.0)),
            ClickResult::OriginSet
        );
        assert_eq!(
            e.submit_click(PixelPoint::new(150.0, 125.0)),
            ClickResult::SecondPointSet
        );
        e
    }

    #[test]
    fn phases_advance_in_order_and_never_regress() {
        let mut e = engine();
        assert_eq!(e.phase(), CalibrationPhase::AwaitingOrigin);

        e.submit_click(PixelPoint::new(100.0, 100.0));
        assert_eq!(e.phase(), CalibrationPhase::AwaitingSecondPoint);

        e.submit_click(PixelPoint::new(150.0, 125.0));
        assert_eq!(e.phase(), CalibrationPhase::Collecting);

        // Further clicks keep collecting; the phase stays put.
        e.submit_click(PixelPoint::new(120.0, 110.0));
        e.submit_click(PixelPoint::new(130.0, 115.0));
        assert_eq!(e.phase(), CalibrationPhase::Collecting);
        assert_eq!(e.origin(), Some(PixelPoint::new(100.0, 100.0)));
    }

    #[test]
    fn scale_is_componentwise_absolute_distance() {
        let e = calibrated_engine();
        let scale = e.scale().unwrap();
        assert_eq!(scale.x, 50.0);
        assert_eq!(scale.y, 25.0);
        assert_eq!(e.second_point(), Some(PixelPoint::new(150.0, 125.0)));
    }

    #[test]
    fn midpoint_maps_to_half_span_negated() {
        let mut e = calibrated_engine();
        match e.submit_click(PixelPoint::new(125.0, 112.5)) {
            ClickResult::PointCollected(point) => {
                assert_eq!(point.x, -12.5);
                assert_eq!(point.y, -12.5);
            }
            other => panic!("expected a collected point, got {:?}", other),
        }
    }

    #[test]
    fn click_at_origin_collects_zero_zero() {
        let mut e = calibrated_engine();
        match e.submit_click(PixelPoint::new(100.0, 100.0)) {
            ClickResult::PointCollected(point) => {
                assert_eq!(point.x, 0.0);
                assert_eq!(point.y, 0.0);
            }
            other => panic!("expected a collected point, got {:?}", other),
        }
    }

    #[test]
    fn degenerate_second_point_is_rejected() {
        let mut e = engine();
        e.submit_click(PixelPoint::new(50.0, 50.0));

        // Shares the x coordinate with the origin: scale.x would be zero.
        assert_eq!(
            e.submit_click(PixelPoint::new(50.0, 80.0)),
            ClickResult::DegenerateCalibration
        );
        assert_eq!(e.phase(), CalibrationPhase::AwaitingSecondPoint);
        assert!(e.scale().is_none());
        assert!(e.second_point().is_none());

        // Re-clicking the origin itself is degenerate on both axes.
        assert_eq!(
            e.submit_click(PixelPoint::new(50.0, 50.0)),
            ClickResult::DegenerateCalibration
        );

        // A corrected second point is accepted afterwards.
        assert_eq!(
            e.submit_click(PixelPoint::new(80.0, 90.0)),
            ClickResult::SecondPointSet
        );
        assert_eq!(e.phase(), CalibrationPhase::Collecting);
    }

    #[test]
    fn out_of_bounds_clicks_never_mutate() {
        let mut e = engine();
        let outside = PixelPoint::new(2000.0, 500.0);

        assert_eq!(e.submit_click(outside), ClickResult::OutOfBounds);
        assert_eq!(e.phase(), CalibrationPhase::AwaitingOrigin);
        assert!(e.origin().is_none());

        e.submit_click(PixelPoint::new(100.0, 100.0));
        assert_eq!(
            e.submit_click(PixelPoint::new(-1.0, 50.0)),
            ClickResult::OutOfBounds
        );
        assert_eq!(e.phase(), CalibrationPhase::AwaitingSecondPoint);

        e.submit_click(PixelPoint::new(150.0, 125.0));
        assert_eq!(
            e.submit_click(PixelPoint::new(500.0, 1081.0)),
            ClickResult::OutOfBounds
        );
        assert!(e.points().is_empty());
    }

    #[test]
    fn reset_returns_to_awaiting_origin() {
        let mut e = calibrated_engine();
        e.submit_click(PixelPoint::new(110.0, 105.0));
        e.submit_click(PixelPoint::new(120.0, 110.0));
        assert_eq!(e.points().len(), 2);

        e.reset();
        assert_eq!(e.phase(), CalibrationPhase::AwaitingOrigin);
        assert!(e.origin().is_none());
        assert!(e.second_point().is_none());
        assert!(e.scale().is_none());
        assert!(e.points().is_empty());

        // The engine is usable again after a reset.
        assert_eq!(
            e.submit_click(PixelPoint::new(10.0, 10.0)),
            ClickResult::OriginSet
        );
    }

    #[test]
    fn points_keep_insertion_order() {
        let mut e = calibrated_engine();
        e.submit_click(PixelPoint::new(110.0, 100.0));
        e.submit_click(PixelPoint::new(120.0, 100.0));
        e.submit_click(PixelPoint::new(130.0, 100.0));

        let xs: Vec<f64> = e.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![-5.0, -10.0, -15.0]);
    }

    #[test]
    fn calibrate_is_pure_and_phase_gated() {
        let mut e = engine();
        assert!(e.calibrate(PixelPoint::new(100.0, 100.0)).is_none());

        e.submit_click(PixelPoint::new(100.0, 100.0));
        assert!(e.calibrate(PixelPoint::new(125.0, 112.5)).is_none());

        e.submit_click(PixelPoint::new(150.0, 125.0));
        let preview = e.calibrate(PixelPoint::new(125.0, 112.5)).unwrap();
        assert_eq!(preview.x, -12.5);
        assert_eq!(preview.y, -12.5);

        // Previewing must not record anything.
        assert!(e.points().is_empty());
        assert!(e.calibrate(PixelPoint::new(-5.0, 0.0)).is_none());
    }
}
