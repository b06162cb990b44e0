//! Application configuration.
//!
//! Values come from an optional JSON file and are then overridden by
//! command-line flags. Numeric sampling parameters are clamped into their
//! supported ranges; they are never rejected.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use jolt_model::{AccelModel, CalibrationProfile};

use crate::error::{JoltError, JoltResult};

/// Upper bound for the sampling period (ms).
pub const MAX_PERIOD_MS: i64 = 1_000;

/// Upper bound for the trigger threshold (milli-g).
pub const MAX_THRESHOLD_MG: i64 = 6_000;

/// Upper bound for the hold duration (ms).
pub const MAX_HOLD_MS: i64 = 120_000;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Sampling and trigger parameters.
    pub sampling: SamplingConfig,

    /// Per-model empirical offset overrides.
    pub calibration: CalibrationConfig,

    /// SPI bus settings.
    pub spi: SpiConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// How the averager reacts to a failed raw read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Abort the tick and report a device fault.
    #[default]
    Abort,
    /// Drop the failed sub-sample and average the remaining reads.
    Skip,
}

/// Sampling and trigger parameters as supplied by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Accelerometer model.
    pub model: AccelModel,

    /// Tick period in milliseconds, `[0, 1000]`.
    pub period_ms: i64,

    /// Trigger threshold in milli-g, `[0, 6000]`.
    pub threshold_mg: i64,

    /// Post-trigger hold duration in milliseconds, `[0, 120000]`.
    pub hold_ms: i64,

    /// Raw read failure handling.
    pub fault_policy: FaultPolicy,

    /// Write a diagnostic line for every tick.
    pub verbose: bool,
}

/// Empirical calibration overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Replacement `[x, y, z]` offsets keyed by model selector.
    pub offsets: BTreeMap<AccelModel, [i32; 3]>,
}

/// SPI bus settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiConfig {
    /// Device node for chip-select 0.
    pub cs0: PathBuf,

    /// Device node for chip-select 1.
    pub cs1: PathBuf,

    /// Clock speed in Hz.
    pub speed_hz: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "jolt_sampler=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            model: AccelModel::ModelB,
            period_ms: 100,
            threshold_mg: 100,
            hold_ms: 0,
            fault_policy: FaultPolicy::default(),
            verbose: false,
        }
    }
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            cs0: PathBuf::from("/dev/spidev0.0"),
            cs1: PathBuf::from("/dev/spidev0.1"),
            speed_hz: 1_200_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl SamplingConfig {
    /// Clamp every numeric field into its supported range.
    pub fn clamped(&self) -> Self {
        Self {
            period_ms: clamp_field("period_ms", self.period_ms, MAX_PERIOD_MS),
            threshold_mg: clamp_field("threshold_mg", self.threshold_mg, MAX_THRESHOLD_MG),
            hold_ms: clamp_field("hold_ms", self.hold_ms, MAX_HOLD_MS),
            ..self.clone()
        }
    }

    /// Tick period.
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms.clamp(0, MAX_PERIOD_MS) as u64)
    }

    /// Trigger threshold in g.
    pub fn threshold_g(&self) -> f64 {
        self.threshold_mg.clamp(0, MAX_THRESHOLD_MG) as f64 / 1000.0
    }

    /// Hold window length in ticks, `floor(hold / period)`.
    ///
    /// A zero period has no time base, so the hold window is empty.
    pub fn hold_window(&self) -> u32 {
        let period = self.period_ms.clamp(0, MAX_PERIOD_MS);
        let hold = self.hold_ms.clamp(0, MAX_HOLD_MS);
        if period == 0 {
            return 0;
        }
        (hold / period) as u32
    }
}

fn clamp_field(name: &str, value: i64, max: i64) -> i64 {
    let clamped = value.clamp(0, max);
    if clamped != value {
        tracing::warn!(
            field = name,
            value,
            clamped,
            "Sampling parameter out of range, clamping"
        );
    }
    clamped
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults
    /// when no file exists.
    pub fn load() -> JoltResult<Self> {
        let config_path = config_file_path();
        if !config_path.exists() {
            tracing::debug!(path = ?config_path, "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> JoltResult<Self> {
        if !path.exists() {
            return Err(JoltError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            JoltError::config(format!("Failed to parse config at {}: {e}", path.display()))
        })
    }

    /// Calibration profile for the configured model, with overrides applied.
    pub fn profile(&self) -> CalibrationProfile {
        let model = self.sampling.model;
        let profile = CalibrationProfile::for_model(model);
        match self.calibration.offsets.get(&model) {
            Some(offsets) => profile.with_offsets(*offsets),
            None => profile,
        }
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("jolt").join("config.json")
}
