//! Records handed to the output sink.
//!
//! The event line is the stable downstream contract: three signed deltas in g
//! with four decimals, space separated. The diagnostic line is only written in
//! verbose mode and may change between releases.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sample::{RawSample, Sample};

/// Trigger state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerState {
    #[default]
    Idle,
    Triggered,
    Holding,
}

impl TriggerState {
    /// Whether a hold window may continue from this state.
    pub fn is_active(self) -> bool {
        matches!(self, TriggerState::Triggered | TriggerState::Holding)
    }
}

impl fmt::Display for TriggerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriggerState::Idle => "idle",
            TriggerState::Triggered => "triggered",
            TriggerState::Holding => "holding",
        };
        f.write_str(name)
    }
}

/// Per-axis delta emitted on an active tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub delta: Sample,
}

impl EventRecord {
    pub fn new(delta: Sample) -> Self {
        Self { delta }
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.4} {:.4} {:.4}",
            self.delta.x, self.delta.y, self.delta.z
        )
    }
}

/// Verbose per-tick snapshot of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Averaged raw codes.
    pub raw: RawSample,
    /// Calibrated sample.
    pub sample: Sample,
    /// Delta against the previous tick, absent on the first tick.
    pub delta: Option<Sample>,
    /// Squared delta magnitude in g².
    pub delta_sq: Option<f64>,
    pub state: TriggerState,
    pub samples_since_trigger: u32,
    pub emitted: bool,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "# tick={} raw={} {} {} g={:.4} {:.4} {:.4}",
            self.tick,
            self.raw.x,
            self.raw.y,
            self.raw.z,
            self.sample.x,
            self.sample.y,
            self.sample.z
        )?;
        match (self.delta, self.delta_sq) {
            (Some(d), Some(sq)) => write!(f, " d={:.4} {:.4} {:.4} d2={:.6}", d.x, d.y, d.z, sq)?,
            _ => f.write_str(" d=- d2=-")?,
        }
        write!(
            f,
            " state={} hold={} emit={}",
            self.state,
            self.samples_since_trigger,
            if self.emitted { 1 } else { 0 }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_line_uses_four_decimals() {
        let record = EventRecord::new(Sample::new(0.912_34, -0.034_1, 0.120_51));
        assert_eq!(record.to_string(), "0.9123 -0.0341 0.1205");
    }

    #[test]
    fn event_line_for_unit_x_delta() {
        let record = EventRecord::new(Sample::new(1.0, 0.0, 0.0));
        assert_eq!(record.to_string(), "1.0000 0.0000 0.0000");
    }

    #[test]
    fn diagnostic_line_marks_missing_delta() {
        let diag = Diagnostic {
            tick: 1,
            raw: RawSample::new(512, 510, 760),
            sample: Sample::new(0.0, -0.02, 1.0),
            delta: None,
            delta_sq: None,
            state: TriggerState::Idle,
            samples_since_trigger: 0,
            emitted: false,
        };
        let line = diag.to_string();
        assert!(line.starts_with("# tick=1 raw=512 510 760"));
        assert!(line.contains("d=- d2=-"));
        assert!(line.ends_with("state=idle hold=0 emit=0"));
    }

    #[test]
    fn only_triggered_and_holding_are_active() {
        assert!(!TriggerState::Idle.is_active());
        assert!(TriggerState::Triggered.is_active());
        assert!(TriggerState::Holding.is_active());
    }
}
