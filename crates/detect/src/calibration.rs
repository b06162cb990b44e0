//! Raw code to g conversion.

use jolt_model::{Axis, CalibrationProfile, RawSample, Sample};

/// Converts averaged raw codes with a resolved calibration profile.
///
/// The profile is fixed at construction, so the per-tick path has no
/// model branching.
#[derive(Debug, Clone, Copy)]
pub struct Calibrator {
    profile: CalibrationProfile,
}

impl Calibrator {
    pub fn new(profile: CalibrationProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    /// `(raw + offset) * gain`, per axis, in double precision.
    pub fn convert(&self, raw: RawSample) -> Sample {
        let axis = |a: Axis| {
            let corrected = raw[a] as i64 + self.profile.offsets[a.index()] as i64;
            corrected as f64 * self.profile.gain
        };
        Sample::new(axis(Axis::X), axis(Axis::Y), axis(Axis::Z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jolt_model::AccelModel;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn conversion_is_affine_at_range_extremes() {
        for model in AccelModel::ALL {
            let profile = CalibrationProfile::for_model(model);
            let calibrator = Calibrator::new(profile);
            let (lo, hi) = model.code_format().range();

            for code in [lo, hi] {
                let sample = calibrator.convert(RawSample::new(code, code, code));
                for axis in Axis::ALL {
                    let expected = (code + profile.offsets[axis.index()]) as f64 * profile.gain;
                    assert!(close(sample[axis], expected), "{model} {axis} at {code}");
                }
            }
        }
    }

    #[test]
    fn model_b_rest_position_reads_near_zero() {
        let calibrator = Calibrator::new(CalibrationProfile::for_model(AccelModel::ModelB));
        let sample = calibrator.convert(RawSample::new(503, 45, 248));
        assert_eq!(sample, Sample::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn model_a_full_scale_is_about_five_g() {
        let calibrator = Calibrator::new(CalibrationProfile::for_model(AccelModel::ModelA));
        let sample = calibrator.convert(RawSample::new(1023, 0, 512));
        assert!(close(sample.x, 514.0 * 0.009_765_625));
        assert!(close(sample.y, -514.0 * 0.009_765_625));
        assert!(close(sample.z, 0.0));
    }

    #[test]
    fn model_c_codes_are_already_signed() {
        let profile = CalibrationProfile::for_model(AccelModel::ModelC).with_offsets([0, 0, 0]);
        let sample = Calibrator::new(profile).convert(RawSample::new(-32768, 32767, 5461));
        assert!(close(sample.x, -6.0));
        assert!(close(sample.y, 32767.0 * 12.0 / 65536.0));
        assert!(close(sample.z, 5461.0 * 12.0 / 65536.0));
    }
}
