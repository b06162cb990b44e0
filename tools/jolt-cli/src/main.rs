//! Jolt CLI: command-line interface for accelerometer jolt detection.
//!
//! Usage:
//!   jolt run [OPTIONS]    Sample the accelerometer and print jolt deltas
//!   jolt check            Check SPI capabilities
//!   jolt profiles         List built-in calibration profiles

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "jolt",
    about = "Detect sudden acceleration changes on an SPI accelerometer",
    version,
    author
)]
struct Cli {
    /// Debug logging; on `run`, also a diagnostic line per tick on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/jolt/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample until interrupted, printing one delta line per jolt
    Run {
        /// Accelerometer model: a, b or c (or the part name)
        #[arg(short, long)]
        model: Option<String>,

        /// Sampling period in milliseconds [0, 1000]
        #[arg(long, allow_negative_numbers = true)]
        period_ms: Option<i64>,

        /// Trigger threshold in milli-g [0, 6000]
        #[arg(long, allow_negative_numbers = true)]
        threshold_mg: Option<i64>,

        /// Keep printing for this long after a jolt, in milliseconds [0, 120000]
        #[arg(long, allow_negative_numbers = true)]
        hold_ms: Option<i64>,

        /// Read failure handling: abort the tick or skip the failed read
        #[arg(long, value_parser = ["abort", "skip"])]
        fault_policy: Option<String>,
    },

    /// Check SPI capabilities for a model
    Check {
        /// Accelerometer model: a, b or c (or the part name)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List built-in calibration profiles
    Profiles,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = commands::load_config(cli.config.as_deref())?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if cli.log_json {
        config.logging.json = true;
    }
    jolt_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Run {
            model,
            period_ms,
            threshold_mg,
            hold_ms,
            fault_policy,
        } => {
            let overrides = commands::run::Overrides {
                model,
                period_ms,
                threshold_mg,
                hold_ms,
                fault_policy,
                verbose: cli.verbose,
            };
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(commands::run::run(config, overrides))
        }
        Commands::Check { model } => commands::check::run(config, model),
        Commands::Profiles => commands::profiles::run(&config),
    }
}
