//! Jolt Sampler
//!
//! Runs the paced sampling loop: each tick reads the accelerometer through a
//! pluggable raw source, averages and calibrates the reads, runs the delta
//! trigger, and writes an event line when the trigger says so. The residual
//! of the sampling period is slept after every tick.
//!
//! - **Spi:** Hardware source over Linux spidev
//! - **Stub:** Scripted codes with optional injected faults, for tests

pub mod backends;
pub mod writer;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jolt_common::clock::{Pacer, SessionClock};
use jolt_common::config::{AppConfig, FaultPolicy};
use jolt_common::error::JoltResult;
use jolt_detect::{Calibrator, DeltaTrigger, Oversampler, TriggerConfig};
use jolt_model::{Axis, CalibrationProfile, Diagnostic, EventRecord};

pub use writer::EventSink;

/// Trait for raw sample sources.
pub trait RawSource: Send {
    /// Read one raw code for `axis`.
    fn read_axis(&mut self, axis: Axis) -> JoltResult<i32>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Everything the pipeline needs besides its source and sink.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub profile: CalibrationProfile,
    pub trigger: TriggerConfig,
    pub fault_policy: FaultPolicy,
    pub verbose: bool,
}

impl PipelineSettings {
    /// Resolve settings from a loaded and clamped configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            profile: config.profile(),
            trigger: TriggerConfig::from_sampling(&config.sampling),
            fault_policy: config.sampling.fault_policy,
            verbose: config.sampling.verbose,
        }
    }
}

/// Result of a single tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// First valid tick: the previous sample was stored, nothing compared.
    Primed,
    /// The trigger fired or is holding; the record was written.
    Emitted(EventRecord),
    /// Nothing to emit.
    Quiet,
    /// The raw read failed; the tick was abandoned.
    DeviceFault(String),
}

/// Counters for a sampling run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Wall-clock start of the run (RFC 3339).
    pub started_at: String,
    pub ticks: u64,
    pub emitted: u64,
    pub quiet: u64,
    pub faults: u64,
    /// Ticks whose processing exceeded the sampling period.
    pub overruns: u64,
}

/// The sampling pipeline: source, averager, calibrator, trigger, sink.
pub struct Pipeline {
    source: Box<dyn RawSource>,
    sink: Box<dyn EventSink>,
    oversampler: Oversampler,
    calibrator: Calibrator,
    trigger: DeltaTrigger,
    pacer: Pacer,
    clock: SessionClock,
    verbose: bool,
    stats: RunStats,
    stop_flag: Arc<AtomicBool>,
}

impl Pipeline {
    /// Create a new pipeline.
    pub fn new(
        source: Box<dyn RawSource>,
        sink: Box<dyn EventSink>,
        settings: PipelineSettings,
    ) -> Self {
        let clock = SessionClock::start();
        let stats = RunStats {
            started_at: clock.epoch_wall().to_string(),
            ..RunStats::default()
        };

        Self {
            source,
            sink,
            oversampler: Oversampler::new(settings.fault_policy),
            calibrator: Calibrator::new(settings.profile),
            trigger: DeltaTrigger::new(settings.trigger),
            pacer: Pacer::new(settings.trigger.period),
            clock,
            verbose: settings.verbose,
            stats,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run one tick without pacing.
    ///
    /// Device faults are reported as [`TickOutcome::DeviceFault`] and leave
    /// the trigger untouched. Any other error, such as a broken sink, is
    /// returned.
    pub fn tick(&mut self) -> JoltResult<TickOutcome> {
        self.stats.ticks += 1;
        let tick_no = self.stats.ticks;

        let source = &mut self.source;
        let raw = match self.oversampler.sample(|axis| source.read_axis(axis)) {
            Ok(raw) => raw,
            Err(e) if e.is_device_fault() => {
                self.stats.faults += 1;
                tracing::warn!(
                    tick = tick_no,
                    faults = self.stats.faults,
                    error = %e,
                    "Raw read failed, skipping tick"
                );
                return Ok(TickOutcome::DeviceFault(e.to_string()));
            }
            Err(e) => return Err(e),
        };

        let sample = self.calibrator.convert(raw);
        let decision = self.trigger.step(sample);

        if let Some(record) = decision.emit {
            self.sink.emit(&record)?;
        }

        if self.verbose {
            self.sink.diagnostic(&Diagnostic {
                tick: tick_no,
                raw,
                sample,
                delta: decision.delta,
                delta_sq: decision.delta_sq,
                state: decision.state,
                samples_since_trigger: decision.samples_since_trigger,
                emitted: decision.emit.is_some(),
            })?;
        }

        let outcome = match (decision.delta, decision.emit) {
            (None, _) => TickOutcome::Primed,
            (Some(_), Some(record)) => {
                self.stats.emitted += 1;
                TickOutcome::Emitted(record)
            }
            (Some(_), None) => {
                self.stats.quiet += 1;
                TickOutcome::Quiet
            }
        };
        Ok(outcome)
    }

    /// Run one tick and sleep out the rest of the period.
    pub async fn paced_tick(&mut self) -> JoltResult<TickOutcome> {
        let start = self.pacer.begin();
        let outcome = self.tick()?;
        let sleep = self.pacer.finish(start);
        self.stats.overruns = self.pacer.overruns();
        tokio::time::sleep(sleep).await;
        Ok(outcome)
    }

    /// Run exactly `count` paced ticks.
    pub async fn run_ticks(&mut self, count: u64) -> JoltResult<Vec<TickOutcome>> {
        let mut outcomes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            outcomes.push(self.paced_tick().await?);
        }
        self.sink.flush()?;
        Ok(outcomes)
    }

    /// Run paced ticks until the stop flag is set.
    pub async fn run(&mut self) -> JoltResult<RunStats> {
        tracing::info!(
            source = %self.source.name(),
            model = %self.calibrator.profile().model,
            period_ms = self.pacer.period().as_millis() as u64,
            threshold_sq = self.trigger.config().threshold_sq,
            hold_window = self.trigger.config().hold_window,
            "Sampler started"
        );

        while !self.stop_flag.load(Ordering::Relaxed) {
            self.paced_tick().await?;
        }

        self.sink.flush()?;
        tracing::info!(
            ticks = self.stats.ticks,
            emitted = self.stats.emitted,
            faults = self.stats.faults,
            overruns = self.stats.overruns,
            elapsed_secs = self.clock.elapsed_secs(),
            "Sampler stopped"
        );
        Ok(self.stats.clone())
    }

    /// Set the stop flag.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Counters so far.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }
}
