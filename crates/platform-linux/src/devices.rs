//! Accelerometer front-ends on the SPI bus.
//!
//! - Analog bridges (ADXL335, MMA7260Q) are digitised by two MCP3002
//!   converters: X and Y on chip-select 0, Z on chip-select 1.
//! - The LIS3LV02DQ is read directly over SPI mode 3.

use embedded_hal::spi::SpiDevice;
use jolt_common::error::{JoltError, JoltResult};
use jolt_model::Axis;

/// MCP3002 single-ended conversion, channel 0.
const MCP3002_CH0: u8 = 0x60;
/// MCP3002 single-ended conversion, channel 1.
const MCP3002_CH1: u8 = 0x70;

const LIS3_WHO_AM_I: u8 = 0x0F;
const LIS3_CTRL_REG1: u8 = 0x20;
const LIS3_CTRL_REG2: u8 = 0x21;
const LIS3_OUTX_L: u8 = 0x28;
const LIS3_OUTY_L: u8 = 0x2A;
const LIS3_OUTZ_L: u8 = 0x2C;
const LIS3_READ: u8 = 0x80;
const LIS3_AUTO_INCREMENT: u8 = 0x40;

/// Expected WHO_AM_I response.
pub const LIS3_DEVICE_ID: u8 = 0x3A;
/// Power on, 40 Hz output rate, X/Y/Z enabled.
const LIS3_CTRL_REG1_VALUE: u8 = 0xC7;
/// ±6 g full scale, block data update, 16-bit left-justified output.
const LIS3_CTRL_REG2_VALUE: u8 = 0xC1;

/// Two MCP3002 converters sampling an analog accelerometer.
#[derive(Debug)]
pub struct Mcp3002Pair<S> {
    cs0: S,
    cs1: S,
}

impl<S: SpiDevice> Mcp3002Pair<S> {
    pub fn new(cs0: S, cs1: S) -> Self {
        Self { cs0, cs1 }
    }

    /// 10-bit conversion result for one axis.
    pub fn read_axis(&mut self, axis: Axis) -> JoltResult<i32> {
        let (spi, command) = match axis {
            Axis::X => (&mut self.cs0, MCP3002_CH0),
            Axis::Y => (&mut self.cs0, MCP3002_CH1),
            Axis::Z => (&mut self.cs1, MCP3002_CH0),
        };
        let mut frame = [command, 0x00];
        spi.transfer_in_place(&mut frame).map_err(bus_error)?;
        Ok(decode_mcp3002(frame))
    }
}

/// The 10-bit result sits in the low two bits of the first byte and all of
/// the second, MSB first.
pub fn decode_mcp3002(rx: [u8; 2]) -> i32 {
    (((rx[0] & 0x03) as i32) << 8) | rx[1] as i32
}

/// LIS3LV02DQ digital accelerometer.
#[derive(Debug)]
pub struct Lis3lv02dq<S> {
    spi: S,
}

impl<S: SpiDevice> Lis3lv02dq<S> {
    /// Verify the device identity and program ±6 g, 16-bit output.
    pub fn init(spi: S) -> JoltResult<Self> {
        let mut device = Self { spi };

        let id = device.read_register(LIS3_WHO_AM_I)?;
        if id != LIS3_DEVICE_ID {
            return Err(JoltError::platform(format!(
                "Unexpected LIS3LV02DQ WHO_AM_I 0x{id:02X} (expected 0x{LIS3_DEVICE_ID:02X})"
            )));
        }

        device.write_register(LIS3_CTRL_REG1, LIS3_CTRL_REG1_VALUE)?;
        device.write_register(LIS3_CTRL_REG2, LIS3_CTRL_REG2_VALUE)?;
        tracing::info!("LIS3LV02DQ initialised at ±6 g");
        Ok(device)
    }

    /// Signed 16-bit output for one axis.
    pub fn read_axis(&mut self, axis: Axis) -> JoltResult<i32> {
        let register = match axis {
            Axis::X => LIS3_OUTX_L,
            Axis::Y => LIS3_OUTY_L,
            Axis::Z => LIS3_OUTZ_L,
        };
        let mut frame = [LIS3_READ | LIS3_AUTO_INCREMENT | register, 0, 0];
        self.spi.transfer_in_place(&mut frame).map_err(bus_error)?;
        Ok(i16::from_le_bytes([frame[1], frame[2]]) as i32)
    }

    fn read_register(&mut self, register: u8) -> JoltResult<u8> {
        let mut frame = [LIS3_READ | register, 0];
        self.spi.transfer_in_place(&mut frame).map_err(bus_error)?;
        Ok(frame[1])
    }

    fn write_register(&mut self, register: u8, value: u8) -> JoltResult<()> {
        self.spi.write(&[register, value]).map_err(bus_error)
    }
}

fn bus_error<E: embedded_hal::spi::Error>(e: E) -> JoltError {
    JoltError::device(format!("SPI transfer failed ({:?}): {e:?}", e.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::spi::{ErrorKind, ErrorType, Operation};
    use std::collections::VecDeque;

    /// Records transmitted frames and replays canned responses.
    #[derive(Debug, Default)]
    struct ScriptedSpi {
        sent: Vec<Vec<u8>>,
        replies: VecDeque<Vec<u8>>,
    }

    impl ScriptedSpi {
        fn replying(replies: &[&[u8]]) -> Self {
            Self {
                sent: Vec::new(),
                replies: replies.iter().map(|r| r.to_vec()).collect(),
            }
        }
    }

    impl ScriptedSpi {
        fn exchange(&mut self, tx: &[u8]) -> Result<Vec<u8>, ErrorKind> {
            self.sent.push(tx.to_vec());
            self.replies.pop_front().ok_or(ErrorKind::Other)
        }
    }

    impl ErrorType for ScriptedSpi {
        type Error = ErrorKind;
    }

    impl SpiDevice for ScriptedSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), ErrorKind> {
            for op in operations {
                match op {
                    Operation::TransferInPlace(buf) => {
                        let reply = self.exchange(buf)?;
                        buf.copy_from_slice(&reply);
                    }
                    Operation::Transfer(read, write) => {
                        let reply = self.exchange(write)?;
                        read.copy_from_slice(&reply);
                    }
                    Operation::Write(buf) => {
                        self.exchange(buf)?;
                    }
                    Operation::Read(buf) => {
                        let reply = self.exchange(&vec![0; buf.len()])?;
                        buf.copy_from_slice(&reply);
                    }
                    Operation::DelayNs(_) => {}
                }
            }
            Ok(())
        }
    }

    #[test]
    fn mcp3002_decodes_ten_bit_result() {
        assert_eq!(decode_mcp3002([0xFF, 0xFF]), 1023);
        assert_eq!(decode_mcp3002([0x02, 0x00]), 512);
        assert_eq!(decode_mcp3002([0xFC, 0x07]), 7);
    }

    #[test]
    fn mcp3002_routes_axes_to_channels() {
        let mut cs0 = ScriptedSpi::replying(&[&[0x01, 0xF7], &[0x00, 0x2D]]);
        let mut cs1 = ScriptedSpi::replying(&[&[0x00, 0xF8]]);
        {
            let mut adc = Mcp3002Pair::new(&mut cs0, &mut cs1);
            assert_eq!(adc.read_axis(Axis::X).unwrap(), 503);
            assert_eq!(adc.read_axis(Axis::Y).unwrap(), 45);
            assert_eq!(adc.read_axis(Axis::Z).unwrap(), 248);
        }
        assert_eq!(cs0.sent, vec![vec![0x60, 0x00], vec![0x70, 0x00]]);
        assert_eq!(cs1.sent, vec![vec![0x60, 0x00]]);
    }

    #[test]
    fn lis3_init_checks_identity_and_configures() {
        let mut spi = ScriptedSpi::replying(&[&[0, 0x3A], &[0, 0], &[0, 0], &[0, 0x18, 0xFC]]);
        {
            let mut device = Lis3lv02dq::init(&mut spi).unwrap();
            assert_eq!(device.read_axis(Axis::Y).unwrap(), -1000);
        }
        assert_eq!(
            spi.sent,
            vec![
                vec![0x8F, 0x00],
                vec![0x20, 0xC7],
                vec![0x21, 0xC1],
                vec![0xEA, 0x00, 0x00],
            ]
        );
    }

    #[test]
    fn lis3_rejects_wrong_device() {
        let mut spi = ScriptedSpi::replying(&[&[0, 0x33]]);
        let err = Lis3lv02dq::init(&mut spi).unwrap_err();
        assert!(err.to_string().contains("WHO_AM_I 0x33"));
    }

    #[test]
    fn transfer_failure_surfaces_as_device_error() {
        let mut cs0 = ScriptedSpi::default();
        let mut cs1 = ScriptedSpi::default();
        let mut adc = Mcp3002Pair::new(&mut cs0, &mut cs1);
        assert!(adc.read_axis(Axis::X).unwrap_err().is_device_fault());
    }
}
