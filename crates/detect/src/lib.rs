//! Jolt Detection Core
//!
//! Turns raw accelerometer reads into motion events:
//! - **Oversampling:** Average ten raw reads per axis with truncating division
//! - **Calibration:** Map averaged codes to g with a per-model offset and gain
//! - **Delta Trigger:** Threshold the squared tick-to-tick delta, with a hold window
//!
//! This crate is pure computation: raw reads arrive through a caller-supplied
//! closure and every output is data. Pacing and I/O live in `jolt-sampler`.

pub mod calibration;
pub mod oversample;
pub mod trigger;

pub use calibration::Calibrator;
pub use oversample::{Oversampler, OVERSAMPLING};
pub use trigger::{DeltaTrigger, TriggerConfig, TriggerDecision};
