pub mod check;
pub mod profiles;
pub mod run;

use std::path::Path;

use anyhow::Context;
use jolt_common::config::AppConfig;
use jolt_model::AccelModel;

/// Load the explicit config file, or the standard one if it exists.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => AppConfig::load().context("Failed to load config"),
    }
}

/// Parse a model selector, falling back to the configured model.
pub fn resolve_model(selector: Option<&str>, configured: AccelModel) -> anyhow::Result<AccelModel> {
    match selector {
        Some(s) => Ok(s.parse::<AccelModel>()?),
        None => Ok(configured),
    }
}
