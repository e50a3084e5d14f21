//! `stabilizer`: replay traces or simulated load cells through the stabilizer.

mod cli;
mod error_fmt;
mod output;
mod replay;
mod sim;

use std::path::Path;

use clap::Parser;
use eyre::Result;
use stabilizer_config::{Config, Logging};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{CliError, exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: Cli) -> Result<()> {
    color_eyre::install()?;

    let cfg = load_config(&cli.config)?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    tracing::debug!(
        config = %cli.config.display(),
        window_size = cfg.stabilizer.window_size,
        weight_threshold = cfg.stabilizer.weight_threshold,
        "config loaded"
    );

    match cli.cmd {
        Commands::Replay {
            input,
            realtime,
            every,
        } => replay::run_replay(&cfg, &input, realtime, every, cli.json),
        Commands::Simulate {
            samples,
            load_g,
            load_at,
            seed,
        } => sim::run_simulation(&cfg, samples, load_g, load_at, seed, cli.json),
        Commands::SelfCheck => sim::self_check(&cfg, cli.json),
    }
}

fn load_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::config(format!("read {}: {e}", path.display())))?;
    let cfg = stabilizer_config::load_toml(&text).map_err(CliError::config)?;
    cfg.validate().map_err(CliError::config)?;
    Ok(cfg)
}

/// Console layer on stderr (pretty or JSON) plus an optional JSON-lines file
/// layer. `RUST_LOG` overrides the level when set.
fn init_tracing(json: bool, cli_level: Option<&str>, logging: &Logging) -> Result<()> {
    let level = cli_level
        .or(logging.level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let file = match logging.file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| CliError::config("logging.file must name a file"))?;
            let appender = match logging.rotation.as_deref().unwrap_or("never") {
                "daily" => tracing_appender::rolling::daily(dir, name),
                "hourly" => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()?;
    Ok(())
}
