//! Run the sampling loop.

use jolt_common::config::{AppConfig, FaultPolicy};
use jolt_sampler::backends::open_source;
use jolt_sampler::writer::LineSink;
use jolt_sampler::{Pipeline, PipelineSettings};

use super::resolve_model;

/// Command-line values that replace config file values when given.
pub struct Overrides {
    pub model: Option<String>,
    pub period_ms: Option<i64>,
    pub threshold_mg: Option<i64>,
    pub hold_ms: Option<i64>,
    pub fault_policy: Option<String>,
    pub verbose: bool,
}

impl Overrides {
    fn apply(self, config: &mut AppConfig) -> anyhow::Result<()> {
        let sampling = &mut config.sampling;
        sampling.model = resolve_model(self.model.as_deref(), sampling.model)?;
        if let Some(period_ms) = self.period_ms {
            sampling.period_ms = period_ms;
        }
        if let Some(threshold_mg) = self.threshold_mg {
            sampling.threshold_mg = threshold_mg;
        }
        if let Some(hold_ms) = self.hold_ms {
            sampling.hold_ms = hold_ms;
        }
        match self.fault_policy.as_deref() {
            Some("abort") => sampling.fault_policy = FaultPolicy::Abort,
            Some("skip") => sampling.fault_policy = FaultPolicy::Skip,
            Some(other) => anyhow::bail!("unknown fault policy '{other}'"),
            None => {}
        }
        sampling.verbose |= self.verbose;
        *sampling = sampling.clamped();
        Ok(())
    }
}

pub async fn run(mut config: AppConfig, overrides: Overrides) -> anyhow::Result<()> {
    overrides.apply(&mut config)?;

    let settings = PipelineSettings::from_config(&config);
    tracing::info!(
        model = %config.sampling.model,
        period_ms = config.sampling.period_ms,
        threshold_mg = config.sampling.threshold_mg,
        hold_ms = config.sampling.hold_ms,
        hold_window = settings.trigger.hold_window,
        fault_policy = ?config.sampling.fault_policy,
        "Starting jolt sampler"
    );

    let source = open_source(config.sampling.model, &config.spi)?;
    let mut pipeline = Pipeline::new(source, Box::new(LineSink::stdio()), settings);

    let stop = pipeline.stop_flag();
    tokio::spawn(async move {
        wait_for_shutdown().await;
        tracing::info!("Shutdown requested, finishing current tick");
        stop.store(true, std::sync::atomic::Ordering::SeqCst);
    });

    let stats = pipeline.run().await?;
    eprintln!(
        "Sampled {} ticks since {}: {} emitted, {} quiet, {} faults, {} overruns",
        stats.ticks, stats.started_at, stats.emitted, stats.quiet, stats.faults, stats.overruns
    );

    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl+C only");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
