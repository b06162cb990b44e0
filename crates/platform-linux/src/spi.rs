//! Opening and configuring spidev nodes.
//!
//! Each node is one chip select. Transfers go through the
//! `embedded_hal::spi::SpiDevice` implementation of [`SpidevDevice`], which
//! holds the chip select for the whole frame.

use std::path::Path;

use jolt_common::error::{JoltError, JoltResult};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
pub use linux_embedded_hal::SpidevDevice;

/// Clock polarity/phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiMode {
    /// CPOL=0, CPHA=0
    Mode0,
    /// CPOL=1, CPHA=1
    Mode3,
}

impl SpiMode {
    fn flags(self) -> SpiModeFlags {
        match self {
            SpiMode::Mode0 => SpiModeFlags::SPI_MODE_0,
            SpiMode::Mode3 => SpiModeFlags::SPI_MODE_3,
        }
    }
}

/// Open a spidev node and set its mode, word size and clock.
pub fn open_spi(path: &Path, mode: SpiMode, speed_hz: u32) -> JoltResult<SpidevDevice> {
    let mut device = SpidevDevice::open(path)
        .map_err(|e| JoltError::platform(format!("Failed to open {}: {e:?}", path.display())))?;

    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(speed_hz)
        .mode(mode.flags())
        .build();
    device.configure(&options).map_err(|e| {
        JoltError::platform(format!("Failed to configure {}: {e}", path.display()))
    })?;

    tracing::debug!(path = %path.display(), ?mode, speed_hz, "SPI device configured");
    Ok(device)
}
