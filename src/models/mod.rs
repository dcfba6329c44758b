// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: the calibration state machine and the frame stepper.

pub mod calibration;
pub mod stepper;
