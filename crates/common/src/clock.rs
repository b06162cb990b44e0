//! Clock and pacing utilities.
//!
//! Each tick is paced independently: the residual of the period after the
//! tick's own processing time is slept away. There is no drift compensation
//! across ticks.

use std::time::{Duration, Instant};

/// Monotonic clock anchored at session start, with the wall-clock time of
/// the start kept for reporting.
#[derive(Debug, Clone)]
pub struct SessionClock {
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Seconds elapsed since the session started.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Time left in a period after `elapsed` has been spent. Never negative.
pub fn residual(period: Duration, elapsed: Duration) -> Duration {
    period.saturating_sub(elapsed)
}

/// Per-tick pacing controller.
#[derive(Debug)]
pub struct Pacer {
    period: Duration,
    overruns: u64,
}

impl Pacer {
    /// Create a pacer for the given tick period.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            overruns: 0,
        }
    }

    /// Timestamp the start of a tick.
    pub fn begin(&self) -> Instant {
        Instant::now()
    }

    /// Sleep duration for a tick that started at `start`.
    pub fn finish(&mut self, start: Instant) -> Duration {
        self.sleep_for(start.elapsed())
    }

    /// Sleep duration for a tick that took `elapsed`.
    ///
    /// A tick longer than the period is counted as an overrun and gets a
    /// zero-length sleep. A zero period free-runs and never overruns.
    pub fn sleep_for(&mut self, elapsed: Duration) -> Duration {
        if !self.period.is_zero() && elapsed > self.period {
            self.overruns += 1;
            tracing::debug!(
                elapsed_us = elapsed.as_micros() as u64,
                period_us = self.period.as_micros() as u64,
                overruns = self.overruns,
                "Tick overran sampling period"
            );
        }
        residual(self.period, elapsed)
    }

    /// Target period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of ticks whose processing exceeded the period.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = SessionClock::start();
        assert!(clock.elapsed_secs() < 1.0);
        assert!(!clock.epoch_wall().is_empty());
    }

    #[test]
    fn residual_sleeps_the_remainder() {
        let period = Duration::from_millis(100);
        assert_eq!(
            residual(period, Duration::from_millis(30)),
            Duration::from_millis(70)
        );
        assert_eq!(residual(period, period), Duration::ZERO);
    }

    #[test]
    fn overrun_sleeps_zero_and_is_counted() {
        let mut pacer = Pacer::new(Duration::from_millis(50));
        assert_eq!(pacer.sleep_for(Duration::from_millis(80)), Duration::ZERO);
        assert_eq!(pacer.sleep_for(Duration::from_millis(50)), Duration::ZERO);
        assert_eq!(pacer.sleep_for(Duration::from_millis(10)), Duration::from_millis(40));
        assert_eq!(pacer.overruns(), 1);
    }

    #[test]
    fn zero_period_free_runs_without_overruns() {
        let mut pacer = Pacer::new(Duration::ZERO);
        assert_eq!(pacer.sleep_for(Duration::from_millis(3)), Duration::ZERO);
        assert_eq!(pacer.sleep_for(Duration::ZERO), Duration::ZERO);
        assert_eq!(pacer.overruns(), 0);
    }

    #[test]
    fn finish_never_exceeds_period() {
        let mut pacer = Pacer::new(Duration::from_millis(20));
        let start = pacer.begin();
        assert!(pacer.finish(start) <= pacer.period());
    }

    proptest! {
        #[test]
        fn residual_is_never_negative(period_ms in 0u64..=1_000, elapsed_us in 0u64..5_000_000) {
            let period = Duration::from_millis(period_ms);
            let elapsed = Duration::from_micros(elapsed_us);
            let sleep = residual(period, elapsed);
            prop_assert!(sleep <= period);
            if elapsed >= period {
                prop_assert_eq!(sleep, Duration::ZERO);
            } else {
                prop_assert_eq!(sleep + elapsed, period);
            }
        }
    }
}
