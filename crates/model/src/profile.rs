//! Accelerometer models and their calibration profiles.
//!
//! Gains follow from the datasheet sensitivity and the converter depth.
//! Offsets are empirical and were measured on the deployed boards with the
//! sensor lying flat.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// ADC reference voltage for the analog parts (volts).
pub const VREF: f64 = 3.3;

/// Code span of the 10-bit MCP3002 converter.
pub const ADC_10BIT_SPAN: f64 = 1024.0;

/// Code span of a 16-bit two's-complement output register.
pub const DIGITAL_16BIT_SPAN: f64 = 65536.0;

/// Supported accelerometer models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccelModel {
    /// ADXL335 analog bridge, 330 mV/g, sampled through an MCP3002.
    #[serde(rename = "a", alias = "adxl335")]
    ModelA,
    /// MMA7260Q analog bridge at 1.5 g range, 800 mV/g, through an MCP3002.
    #[serde(rename = "b", alias = "mma7260q")]
    ModelB,
    /// LIS3LV02DQ digital part, ±6 g full scale, 16-bit output.
    #[serde(rename = "c", alias = "lis3lv02dq")]
    ModelC,
}

/// Device representation of raw codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeFormat {
    /// Unsigned converter output, `0..=1023`.
    Unsigned10,
    /// Two's-complement register value, `-32768..=32767`.
    Signed16,
}

impl CodeFormat {
    /// Inclusive range of valid raw codes.
    pub fn range(self) -> (i32, i32) {
        match self {
            CodeFormat::Unsigned10 => (0, 1023),
            CodeFormat::Signed16 => (i16::MIN as i32, i16::MAX as i32),
        }
    }
}

impl AccelModel {
    pub const ALL: [AccelModel; 3] = [AccelModel::ModelA, AccelModel::ModelB, AccelModel::ModelC];

    /// Short selector used on the command line.
    pub fn selector(self) -> &'static str {
        match self {
            AccelModel::ModelA => "a",
            AccelModel::ModelB => "b",
            AccelModel::ModelC => "c",
        }
    }

    /// Part number of the sensor behind the model.
    pub fn part(self) -> &'static str {
        match self {
            AccelModel::ModelA => "ADXL335",
            AccelModel::ModelB => "MMA7260Q",
            AccelModel::ModelC => "LIS3LV02DQ",
        }
    }

    pub fn code_format(self) -> CodeFormat {
        match self {
            AccelModel::ModelA | AccelModel::ModelB => CodeFormat::Unsigned10,
            AccelModel::ModelC => CodeFormat::Signed16,
        }
    }

    /// Raw-code-to-g factor.
    pub fn gain(self) -> f64 {
        match self {
            AccelModel::ModelA => (VREF / ADC_10BIT_SPAN) / 0.330,
            AccelModel::ModelB => (VREF / ADC_10BIT_SPAN) / 0.800,
            AccelModel::ModelC => 12.0 / DIGITAL_16BIT_SPAN,
        }
    }

    /// Per-axis offsets added to the averaged code before scaling.
    pub fn default_offsets(self) -> [i32; 3] {
        match self {
            // Mid-scale plus per-axis trim.
            AccelModel::ModelA => [-512 + 3, -512 - 2, -512],
            // x +9, y +467 (150 mV bridge skew), then mid-scale; z removes 1 g.
            AccelModel::ModelB => [9 - 512, 467 - 512, -248],
            AccelModel::ModelC => [-12, 8, 0],
        }
    }
}

impl fmt::Display for AccelModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.selector(), self.part())
    }
}

/// Returned when a model selector names no supported device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown accelerometer model '{0}' (expected one of: a, b, c)")]
pub struct UnknownModel(pub String);

impl FromStr for AccelModel {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "adxl335" => Ok(AccelModel::ModelA),
            "b" | "mma7260q" => Ok(AccelModel::ModelB),
            "c" | "lis3lv02dq" => Ok(AccelModel::ModelC),
            _ => Err(UnknownModel(s.to_string())),
        }
    }
}

/// Offset/gain pair resolved for one device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProfile {
    pub model: AccelModel,
    /// Added to the averaged raw code, per axis `[x, y, z]`.
    pub offsets: [i32; 3],
    /// Multiplier from offset-corrected code to g.
    pub gain: f64,
}

impl CalibrationProfile {
    /// Built-in profile for a model.
    pub fn for_model(model: AccelModel) -> Self {
        Self {
            model,
            offsets: model.default_offsets(),
            gain: model.gain(),
        }
    }

    /// Replace the empirical offsets, keeping the datasheet gain.
    pub fn with_offsets(mut self, offsets: [i32; 3]) -> Self {
        self.offsets = offsets;
        self
    }
}
