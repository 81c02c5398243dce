use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use snapline_tools::{
    format_inspect_pretty, format_simulation_pretty, inspect_frame, simulate_timeline,
    SimulationParams,
};
use timeline::TimelineConfig;
use wire::Limits;

#[derive(Parser)]
#[command(
    name = "snapline-tools",
    version,
    about = "snapline frame inspection and timeline simulation"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a captured frame and summarize it.
    Inspect {
        /// Path to the frame bytes.
        frame_path: PathBuf,
        /// Optional limits JSON to validate against.
        #[arg(long)]
        limits: Option<PathBuf>,
        /// Split the payload into length-prefixed messages.
        #[arg(long)]
        sized: bool,
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
    /// Drive a timeline over a simulated link.
    Simulate {
        /// Optional timeline config JSON.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Seconds of remote sends.
        #[arg(long, default_value_t = 30.0)]
        duration: f64,
        /// Fixed one-way delay in milliseconds.
        #[arg(long, default_value_t = 50.0)]
        latency_ms: f64,
        /// Maximum extra delay in milliseconds.
        #[arg(long, default_value_t = 20.0)]
        jitter_ms: f64,
        /// Percentage of snapshots lost.
        #[arg(long, default_value_t = 0.0)]
        loss: f64,
        /// Random seed.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Render rate in Hz.
        #[arg(long, default_value_t = 60)]
        frame_rate: u32,
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Inspect {
            frame_path,
            limits,
            sized,
            format,
        } => {
            let limits: Limits = limits
                .as_deref()
                .map(load_json::<Limits>)
                .transpose()
                .context("load limits")?
                .unwrap_or_default();
            let bytes = fs::read(&frame_path)
                .with_context(|| format!("read frame {}", frame_path.display()))?;
            let report = inspect_frame(&bytes, &limits, sized)?;
            emit(&report, format, || format_inspect_pretty(&report))?;
        }
        Command::Simulate {
            config,
            duration,
            latency_ms,
            jitter_ms,
            loss,
            seed,
            frame_rate,
            format,
        } => {
            let config: TimelineConfig = config
                .as_deref()
                .map(load_json::<TimelineConfig>)
                .transpose()
                .context("load timeline config")?
                .unwrap_or_default();
            let params = SimulationParams {
                duration,
                latency_ms,
                jitter_ms,
                loss: loss / 100.0,
                seed,
                frame_rate,
            };
            let report = simulate_timeline(config, &params)?;
            emit(&report, format, || format_simulation_pretty(&report))?;
        }
    }
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

fn emit<T: Serialize>(report: &T, format: Format, pretty: impl FnOnce() -> String) -> Result<()> {
    match format {
        Format::Json => {
            let json = serde_json::to_string_pretty(report).context("serialize json")?;
            println!("{json}");
        }
        Format::Pretty => println!("{}", pretty()),
    }
    Ok(())
}
