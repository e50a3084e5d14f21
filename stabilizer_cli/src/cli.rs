//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "stabilizer",
    version,
    about = "Load-cell reading stabilizer CLI"
)]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/stabilizer.toml")]
    pub config: PathBuf,

    /// Print JSON lines instead of text (output, logs and errors)
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); falls back to [logging] level, then info
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream a recorded trace CSV (t_ms,reading) through the stabilizer
    Replay {
        /// Trace CSV to replay
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Pace readings at [runner] sample_rate_hz instead of as fast as possible
        #[arg(long, action = ArgAction::SetTrue)]
        realtime: bool,
        /// Query the display every N samples (overrides [runner] display_every)
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
        every: Option<u64>,
    },
    /// Drive the stabilizer from a deterministic simulated load cell
    Simulate {
        /// Number of readings to generate
        #[arg(long, value_name = "N", default_value_t = 300)]
        samples: usize,
        /// Place this load (grams above baseline) on the simulated scale
        #[arg(long, value_name = "GRAMS", allow_negative_numbers = true)]
        load_g: Option<f64>,
        /// Sample index at which the load lands (default: halfway)
        #[arg(long, value_name = "N", requires = "load_g")]
        load_at: Option<usize>,
        /// Noise seed (overrides [simulation] seed)
        #[arg(long, value_name = "SEED")]
        seed: Option<u32>,
    },
    /// Validate the config and run a short simulated session
    SelfCheck,
}
