//! Oversampling averager.
//!
//! Reading the bus takes well under a millisecond, so every tick reads each
//! axis [`OVERSAMPLING`] times and keeps the truncated mean. Truncation toward
//! zero (not rounding) is relied upon by the fixed calibration offsets.

use jolt_common::config::FaultPolicy;
use jolt_common::error::{JoltError, JoltResult};
use jolt_model::{Axis, RawSample};

/// Raw reads per axis per tick.
pub const OVERSAMPLING: usize = 10;

/// Integer mean of `sum` over `count` reads, truncated toward zero.
pub fn average_truncating(sum: i64, count: usize) -> i32 {
    debug_assert!(count > 0);
    (sum / count as i64) as i32
}

/// Collects [`OVERSAMPLING`] sub-samples per axis and reduces them.
#[derive(Debug, Clone, Copy)]
pub struct Oversampler {
    policy: FaultPolicy,
}

impl Oversampler {
    pub fn new(policy: FaultPolicy) -> Self {
        Self { policy }
    }

    /// Read every axis [`OVERSAMPLING`] times through `read` and average.
    ///
    /// Each sub-sample reads X, Y then Z. Under [`FaultPolicy::Abort`] the
    /// first failed read fails the whole tick. Under [`FaultPolicy::Skip`]
    /// a failed read is dropped and that axis divides by its own count of
    /// successful reads; an axis with no successful read fails the tick.
    pub fn sample<F>(&self, mut read: F) -> JoltResult<RawSample>
    where
        F: FnMut(Axis) -> JoltResult<i32>,
    {
        let mut sums = [0i64; 3];
        let mut counts = [0usize; 3];
        let mut last_error: [Option<JoltError>; 3] = [None, None, None];

        for _ in 0..OVERSAMPLING {
            for axis in Axis::ALL {
                match read(axis) {
                    Ok(code) => {
                        sums[axis.index()] += code as i64;
                        counts[axis.index()] += 1;
                    }
                    Err(e) => match self.policy {
                        FaultPolicy::Abort => return Err(e),
                        FaultPolicy::Skip => {
                            tracing::trace!(%axis, error = %e, "Skipping failed sub-sample");
                            last_error[axis.index()] = Some(e);
                        }
                    },
                }
            }
        }

        let mut averaged = [0i32; 3];
        for axis in Axis::ALL {
            let i = axis.index();
            if counts[i] == 0 {
                let cause = last_error[i]
                    .take()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no reads".to_string());
                return Err(JoltError::device(format!(
                    "all {OVERSAMPLING} reads of axis {axis} failed: {cause}"
                )));
            }
            averaged[i] = average_truncating(sums[i], counts[i]);
        }

        Ok(RawSample::from_array(averaged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Feeds a fixed code sequence per axis.
    fn scripted(codes: [Vec<i32>; 3]) -> impl FnMut(Axis) -> JoltResult<i32> {
        let mut cursors = [0usize; 3];
        move |axis| {
            let i = axis.index();
            let code = codes[i][cursors[i]];
            cursors[i] += 1;
            Ok(code)
        }
    }

    #[test]
    fn exact_multiple_averages_exactly() {
        let sampler = Oversampler::new(FaultPolicy::Abort);
        let raw = sampler
            .sample(scripted([vec![512; 10], vec![100; 10], vec![0; 10]]))
            .unwrap();
        assert_eq!(raw, RawSample::new(512, 100, 0));
    }

    #[test]
    fn non_multiple_truncates() {
        // Sums 5119, 19 and -19.
        let mut x = vec![512; 10];
        x[9] = 511;
        let mut y = vec![2; 10];
        y[0] = 1;
        let mut z = vec![-2; 10];
        z[0] = -1;
        let sampler = Oversampler::new(FaultPolicy::Abort);
        let raw = sampler.sample(scripted([x, y, z])).unwrap();
        assert_eq!(raw, RawSample::new(511, 1, -1));
    }

    #[test]
    fn negative_sums_truncate_toward_zero() {
        assert_eq!(average_truncating(-15, 10), -1);
        assert_eq!(average_truncating(-9, 10), 0);
        assert_eq!(average_truncating(15, 10), 1);
        assert_eq!(average_truncating(-327_680, 10), -32_768);
    }

    #[test]
    fn reads_axes_in_order_for_each_sub_sample() {
        let mut order = Vec::new();
        let sampler = Oversampler::new(FaultPolicy::Abort);
        sampler
            .sample(|axis| {
                order.push(axis);
                Ok(0)
            })
            .unwrap();
        assert_eq!(order.len(), 3 * OVERSAMPLING);
        assert_eq!(&order[..6], &[Axis::X, Axis::Y, Axis::Z, Axis::X, Axis::Y, Axis::Z]);
    }

    #[test]
    fn abort_policy_fails_on_first_fault() {
        let mut reads = 0;
        let sampler = Oversampler::new(FaultPolicy::Abort);
        let result = sampler.sample(|axis| {
            reads += 1;
            if axis == Axis::Y {
                Err(JoltError::device("spi transfer failed"))
            } else {
                Ok(500)
            }
        });
        assert!(result.unwrap_err().is_device_fault());
        assert_eq!(reads, 2);
    }

    #[test]
    fn skip_policy_divides_by_successful_reads() {
        let mut calls = 0;
        let sampler = Oversampler::new(FaultPolicy::Skip);
        let raw = sampler
            .sample(|axis| {
                calls += 1;
                match axis {
                    // Fail the first four X reads, return 7 for the other six.
                    Axis::X if calls <= 12 => Err(JoltError::device("not ready")),
                    Axis::X => Ok(7),
                    Axis::Y => Ok(-5),
                    Axis::Z => Ok(1000),
                }
            })
            .unwrap();
        assert_eq!(raw, RawSample::new(7, -5, 1000));
    }

    #[test]
    fn skip_policy_fails_when_an_axis_never_reads() {
        let sampler = Oversampler::new(FaultPolicy::Skip);
        let err = sampler
            .sample(|axis| match axis {
                Axis::Z => Err(JoltError::device("bus error")),
                _ => Ok(1),
            })
            .unwrap_err();
        assert!(err.is_device_fault());
        assert!(err.to_string().contains("axis z"));
    }

    proptest! {
        #[test]
        fn average_matches_truncating_division(codes in prop::collection::vec(-32768i32..=32767, 30)) {
            let per_axis: [Vec<i32>; 3] = [
                codes[0..10].to_vec(),
                codes[10..20].to_vec(),
                codes[20..30].to_vec(),
            ];
            let expected: Vec<i32> = per_axis
                .iter()
                .map(|c| {
                    let sum: i64 = c.iter().map(|&v| v as i64).sum();
                    (sum / 10) as i32
                })
                .collect();

            let raw = Oversampler::new(FaultPolicy::Abort)
                .sample(scripted(per_axis))
                .unwrap();
            prop_assert_eq!(raw.to_array().to_vec(), expected);
        }
    }
}
