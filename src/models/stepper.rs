// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame stepping over a loaded video.
//!
//! This module owns the playback position of a session and advances it in
//! fixed increments derived from a nominal frame rate, independent of
//! whatever rate the container reports.

/// Nominal frame rate assumed until the user configures another one.
pub const DEFAULT_FRAME_RATE: f64 = 25.0;

/// Size and duration of a media resource, reported once it is decodable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    /// Stream length in seconds.
    pub duration: f64,
}

/// Result of one frame-step attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepResult {
    /// Position moved to the contained timestamp; a seek should follow.
    Advanced(f64),
    /// The step would pass the end of the stream; the position is unchanged.
    EndOfStream,
}

/// Owns the playback position of a loaded video and moves it one nominal
/// frame at a time.
#[derive(Debug)]
pub struct FrameStepper {
    metadata: VideoMetadata,
    frame_rate: f64,
    position: f64,
    at_end: bool,
}

impl FrameStepper {
    /// Create a stepper for a freshly loaded video, positioned at 0.
    ///
    /// `nominal_rate` fixes the step increment for the whole session.
    pub fn new(metadata: VideoMetadata, nominal_rate: f64) -> Self {
        debug_assert!(nominal_rate > 0.0);
        Self {
            metadata,
            frame_rate: nominal_rate,
            position: 0.0,
            at_end: false,
        }
    }

    /// Move one nominal frame forward, unless that would reach or pass the
    /// end of the stream.
    ///
    /// The end is terminal for forward motion: repeated calls keep
    /// returning `EndOfStream` without moving the position.
    pub fn advance(&mut self) -> StepResult {
        let next = self.position + 1.0 / self.frame_rate;
        if next >= self.metadata.duration {
            self.at_end = true;
            StepResult::EndOfStream
        } else {
            self.position = next;
            self.at_end = false;
            StepResult::Advanced(next)
        }
    }

    /// Move one nominal frame backward, clamped at 0. Clears the
    /// end-of-stream condition and returns the new position.
    pub fn step_back(&mut self) -> f64 {
        self.position = (self.position - 1.0 / self.frame_rate).max(0.0);
        self.at_end = false;
        self.position
    }

    /// Current playback position in seconds.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// True once an advance has been refused at the end of the stream.
    pub fn at_end(&self) -> bool {
        self.at_end
    }

    pub fn duration(&self) -> f64 {
        self.metadata.duration
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Native frame size as (width, height).
    pub fn resolution(&self) -> (u32, u32) {
        (self.metadata.width, self.metadata.height)
    }

    /// Zero-based index of the currently displayed frame.
    pub fn frame_index(&self) -> u64 {
        (self.position * self.frame_rate).round() as u64
    }
}
