//! Raw sample source implementations.
//!
//! Each source returns one raw code per call for the requested axis.

use std::collections::{HashSet, VecDeque};

use jolt_common::config::SpiConfig;
use jolt_common::error::{JoltError, JoltResult};
use jolt_detect::OVERSAMPLING;
use jolt_model::{AccelModel, Axis, RawSample};

use crate::RawSource;

#[cfg(target_os = "linux")]
pub use linux::SpiSource;

#[cfg(target_os = "linux")]
mod linux {
    use jolt_platform_linux::{open_spi, Lis3lv02dq, Mcp3002Pair, SpiMode, SpidevDevice};

    use super::*;

    enum FrontEnd {
        Analog(Mcp3002Pair<SpidevDevice>),
        Digital(Lis3lv02dq<SpidevDevice>),
    }

    /// Accelerometer wired to the SPI bus.
    pub struct SpiSource {
        front_end: FrontEnd,
    }

    impl SpiSource {
        /// Open the spidev nodes for `model` and initialise the device.
        pub fn open(model: AccelModel, spi: &SpiConfig) -> JoltResult<Self> {
            let front_end = match model {
                AccelModel::ModelA | AccelModel::ModelB => {
                    let cs0 = open_spi(&spi.cs0, SpiMode::Mode0, spi.speed_hz)?;
                    let cs1 = open_spi(&spi.cs1, SpiMode::Mode0, spi.speed_hz)?;
                    FrontEnd::Analog(Mcp3002Pair::new(cs0, cs1))
                }
                AccelModel::ModelC => {
                    let cs0 = open_spi(&spi.cs0, SpiMode::Mode3, spi.speed_hz)?;
                    FrontEnd::Digital(Lis3lv02dq::init(cs0)?)
                }
            };
            Ok(Self { front_end })
        }
    }

    impl RawSource for SpiSource {
        fn read_axis(&mut self, axis: Axis) -> JoltResult<i32> {
            match &mut self.front_end {
                FrontEnd::Analog(adc) => adc.read_axis(axis),
                FrontEnd::Digital(device) => device.read_axis(axis),
            }
        }

        fn name(&self) -> &str {
            match self.front_end {
                FrontEnd::Analog(_) => "mcp3002",
                FrontEnd::Digital(_) => "lis3lv02dq",
            }
        }
    }
}

/// Open the hardware source for `model`.
pub fn open_source(model: AccelModel, spi: &SpiConfig) -> JoltResult<Box<dyn RawSource>> {
    #[cfg(target_os = "linux")]
    {
        let source = SpiSource::open(model, spi)?;
        tracing::info!(model = %model, backend = source.name(), "Using SPI source");
        Ok(Box::new(source))
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = spi;
        Err(JoltError::platform(format!(
            "No SPI backend for {model} on this platform"
        )))
    }
}

/// Stub source for testing: replays scripted per-tick codes.
///
/// Every scripted tick is repeated for all [`OVERSAMPLING`] sub-samples.
/// Each axis has its own queue, so a failed read never shifts codes onto
/// another axis. Once an axis runs out its last code repeats forever.
pub struct StubSource {
    pending: [VecDeque<i32>; 3],
    last: RawSample,
    reads: u64,
    faults: HashSet<u64>,
}

impl StubSource {
    /// Create a stub that replays `ticks`, one averaged sample per tick.
    pub fn new(ticks: Vec<RawSample>) -> Self {
        let last = ticks.last().copied().unwrap_or_default();
        let pending = Axis::ALL.map(|axis| {
            ticks
                .iter()
                .flat_map(|raw| std::iter::repeat(raw[axis]).take(OVERSAMPLING))
                .collect()
        });
        Self {
            pending,
            last,
            reads: 0,
            faults: HashSet::new(),
        }
    }

    /// Create a stub that always returns the same codes.
    pub fn constant(raw: RawSample) -> Self {
        Self::new(vec![raw])
    }

    /// Make the given zero-based read numbers fail with a device error.
    ///
    /// A failed read still consumes its axis' scripted code, so the
    /// remaining sub-samples of that tick keep their place.
    pub fn with_faults(mut self, reads: impl IntoIterator<Item = u64>) -> Self {
        self.faults.extend(reads);
        self
    }

    /// Reads served so far, including failed ones.
    pub fn reads(&self) -> u64 {
        self.reads
    }
}

impl RawSource for StubSource {
    fn read_axis(&mut self, axis: Axis) -> JoltResult<i32> {
        let read_no = self.reads;
        self.reads += 1;

        let code = self.pending[axis.index()]
            .pop_front()
            .unwrap_or(self.last[axis]);
        if self.faults.contains(&read_no) {
            return Err(JoltError::device(format!(
                "injected fault on read {read_no} ({axis})"
            )));
        }
        Ok(code)
    }

    fn name(&self) -> &str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_repeats_each_tick_for_every_sub_sample() {
        let mut stub = StubSource::new(vec![RawSample::new(1, 2, 3), RawSample::new(4, 5, 6)]);
        for _ in 0..OVERSAMPLING {
            for (axis, expected) in Axis::ALL.into_iter().zip([1, 2, 3]) {
                assert_eq!(stub.read_axis(axis).unwrap(), expected);
            }
        }
        assert_eq!(stub.read_axis(Axis::X).unwrap(), 4);
    }

    #[test]
    fn exhausted_stub_repeats_last_tick() {
        let mut stub = StubSource::constant(RawSample::new(7, 8, 9));
        for _ in 0..(3 * OVERSAMPLING) {
            stub.read_axis(Axis::X).unwrap();
        }
        assert_eq!(stub.read_axis(Axis::Y).unwrap(), 8);
        assert_eq!(stub.read_axis(Axis::Z).unwrap(), 9);
    }

    #[test]
    fn injected_faults_fail_exact_reads() {
        let mut stub = StubSource::constant(RawSample::new(0, 0, 0)).with_faults([1]);
        assert!(stub.read_axis(Axis::X).is_ok());
        assert!(stub.read_axis(Axis::Y).unwrap_err().is_device_fault());
        assert!(stub.read_axis(Axis::Z).is_ok());
        assert_eq!(stub.reads(), 3);
    }

    #[test]
    fn failed_read_keeps_axes_aligned() {
        let mut stub = StubSource::new(vec![RawSample::new(1, 2, 3), RawSample::new(4, 5, 6)])
            .with_faults([1]);
        for _ in 0..OVERSAMPLING {
            for axis in Axis::ALL {
                let _ = stub.read_axis(axis);
            }
        }
        assert_eq!(stub.read_axis(Axis::X).unwrap(), 4);
        assert_eq!(stub.read_axis(Axis::Y).unwrap(), 5);
        assert_eq!(stub.read_axis(Axis::Z).unwrap(), 6);
    }

    #[test]
    fn axis_queues_are_independent() {
        let mut stub = StubSource::new(vec![RawSample::new(1, 2, 3)]);
        assert_eq!(stub.read_axis(Axis::Z).unwrap(), 3);
        assert_eq!(stub.read_axis(Axis::Z).unwrap(), 3);
        assert_eq!(stub.read_axis(Axis::X).unwrap(), 1);
    }
}
