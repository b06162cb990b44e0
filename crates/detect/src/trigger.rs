//! Delta trigger state machine.
//!
//! Each tick compares the new sample with the previous one. A squared delta
//! strictly above the squared threshold triggers and re-arms the hold window;
//! otherwise an active trigger keeps emitting until the hold window is used up.

use std::time::Duration;

use jolt_common::config::SamplingConfig;
use jolt_model::{EventRecord, Sample, TriggerState};

/// Trigger parameters resolved at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerConfig {
    /// Sampling period.
    pub period: Duration,
    /// Squared trigger threshold in g².
    pub threshold_sq: f64,
    /// Ticks to keep emitting after a trigger, counting the triggering tick.
    pub hold_window: u32,
}

impl TriggerConfig {
    /// Build from a threshold in g; the square is taken once here.
    pub fn new(period: Duration, threshold_g: f64, hold_window: u32) -> Self {
        Self {
            period,
            threshold_sq: threshold_g * threshold_g,
            hold_window,
        }
    }

    /// Resolve from user-facing sampling settings.
    pub fn from_sampling(sampling: &SamplingConfig) -> Self {
        Self::new(
            sampling.period(),
            sampling.threshold_g(),
            sampling.hold_window(),
        )
    }
}

/// Outcome of one state machine step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerDecision {
    /// Record to emit this tick, if any.
    pub emit: Option<EventRecord>,
    /// State after the step.
    pub state: TriggerState,
    pub samples_since_trigger: u32,
    /// Delta against the previous sample; absent on the first tick.
    pub delta: Option<Sample>,
    pub delta_sq: Option<f64>,
}

/// Squared-magnitude delta trigger with a linear hold window.
#[derive(Debug, Clone)]
pub struct DeltaTrigger {
    config: TriggerConfig,
    state: TriggerState,
    samples_since_trigger: u32,
    previous: Option<Sample>,
}

impl DeltaTrigger {
    pub fn new(config: TriggerConfig) -> Self {
        Self {
            config,
            state: TriggerState::Idle,
            samples_since_trigger: 0,
            previous: None,
        }
    }

    /// Evaluate one tick.
    pub fn step(&mut self, current: Sample) -> TriggerDecision {
        let previous = match self.previous.replace(current) {
            Some(previous) => previous,
            None => {
                return TriggerDecision {
                    emit: None,
                    state: self.state,
                    samples_since_trigger: self.samples_since_trigger,
                    delta: None,
                    delta_sq: None,
                };
            }
        };

        let delta = current - previous;
        let delta_sq = delta.magnitude_sq();

        let emit = if delta_sq > self.config.threshold_sq {
            self.state = TriggerState::Triggered;
            self.samples_since_trigger = 1;
            true
        } else if self.state.is_active() && self.samples_since_trigger < self.config.hold_window {
            self.state = TriggerState::Holding;
            self.samples_since_trigger += 1;
            true
        } else {
            self.state = TriggerState::Idle;
            self.samples_since_trigger = 0;
            false
        };

        TriggerDecision {
            emit: emit.then(|| EventRecord::new(delta)),
            state: self.state,
            samples_since_trigger: self.samples_since_trigger,
            delta: Some(delta),
            delta_sq: Some(delta_sq),
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn samples_since_trigger(&self) -> u32 {
        self.samples_since_trigger
    }

    /// Sample from the last evaluated tick.
    pub fn previous(&self) -> Option<Sample> {
        self.previous
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }
}
