//! Jolt Linux Platform Integration
//!
//! Platform-specific implementations for Linux single-board computers:
//! - **spidev:** Opening and configuring chip-select nodes
//! - **Devices:** MCP3002 converter pair and LIS3LV02DQ register access
//! - **Permissions:** Capability detection and user guidance

pub mod devices;
pub mod permissions;
pub mod spi;

pub use devices::*;
pub use spi::*;
