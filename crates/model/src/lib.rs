//! Jolt Data Model
//!
//! Defines the core data contracts shared by every Jolt crate:
//! - **Samples:** Raw per-axis device codes and calibrated samples in g
//! - **Profiles:** Accelerometer models and their offset/gain calibration
//! - **Records:** The event line emitted downstream and the verbose diagnostic
//!
//! Raw codes are signed 32-bit integers regardless of the device's native
//! width so that 10-bit unsigned and 16-bit two's-complement parts share
//! one representation.

pub mod profile;
pub mod record;
pub mod sample;

pub use profile::*;
pub use record::*;
pub use sample::*;
