//! Error types shared across Jolt crates.

use std::path::PathBuf;

use jolt_model::UnknownModel;

/// Top-level error type for Jolt operations.
#[derive(Debug, thiserror::Error)]
pub enum JoltError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Device error: {message}")]
    Device { message: String },

    #[error("Output sink error: {message}")]
    Sink { message: String },

    #[error("Platform error: {message}")]
    Platform { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using JoltError.
pub type JoltResult<T> = Result<T, JoltError>;

impl JoltError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device {
            message: msg.into(),
        }
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink {
            message: msg.into(),
        }
    }

    pub fn platform(msg: impl Into<String>) -> Self {
        Self::Platform {
            message: msg.into(),
        }
    }

    /// Whether this is a recoverable raw-read failure.
    pub fn is_device_fault(&self) -> bool {
        matches!(self, Self::Device { .. })
    }
}

impl From<UnknownModel> for JoltError {
    fn from(err: UnknownModel) -> Self {
        Self::config(err.to_string())
    }
}
