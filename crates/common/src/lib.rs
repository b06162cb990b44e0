//! Jolt Common Utilities
//!
//! Shared infrastructure for all Jolt crates:
//! - Error types and result aliases
//! - Session clock and per-tick pacing
//! - Tracing/logging initialization
//! - Configuration loading and clamping

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
