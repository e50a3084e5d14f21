#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and reading-trace parsing for the load-cell stabilizer.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Trace CSV loader enforces headers, finite readings and non-decreasing
//!   timestamps before anything is fed to the stabilizer.
use serde::Deserialize;

/// Largest accepted `display.decimal_places`.
pub const MAX_DECIMAL_PLACES: u32 = 9;

/// Largest accepted `stabilizer.window_size`. The stabilizer core enforces
/// the same bound for callers that skip config validation.
pub const MAX_WINDOW_SIZE: usize = 10_000;

/// Reading-trace CSV schema.
///
/// Expected headers:
/// t_ms,reading
///
/// Example:
/// t_ms,reading
/// 0,0.02
/// 100,0.01
/// 200,152.4
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TraceRow {
    pub t_ms: u64,
    pub reading: f64,
}

#[derive(Debug, Deserialize)]
pub struct StabilizerCfg {
    /// Moving window capacity (>= 3).
    pub window_size: usize,
    /// Noise tolerance in reading units.
    pub weight_threshold: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayCfg {
    /// Minimum movement of the unrounded value before the display changes.
    pub resolution: f64,
    pub decimal_places: u32,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self {
            resolution: 0.1,
            decimal_places: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunnerCfg {
    /// Sample cadence used when replaying in realtime.
    pub sample_rate_hz: u32,
    /// Query the display once every N samples.
    pub display_every: usize,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self {
            sample_rate_hz: 10,
            display_every: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationCfg {
    /// Empty-scale reading.
    pub baseline_g: f64,
    /// Peak amplitude of uniform noise added to every sample.
    pub noise_g: f64,
    /// Magnitude of the periodic mechanical spike.
    pub spike_g: f64,
    /// Inject a spike every N samples (0 disables).
    pub spike_every: usize,
    pub seed: u32,
}

impl Default for SimulationCfg {
    fn default() -> Self {
        Self {
            baseline_g: 0.0,
            noise_g: 0.05,
            spike_g: 25.0,
            spike_every: 37,
            seed: 1,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub stabilizer: StabilizerCfg,
    #[serde(default)]
    pub display: DisplayCfg,
    #[serde(default)]
    pub runner: RunnerCfg,
    #[serde(default)]
    pub simulation: SimulationCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

pub fn load_trace_csv(path: &std::path::Path) -> eyre::Result<Vec<TraceRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open trace CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["t_ms", "reading"];
    let actual: Vec<String> = headers.iter().map(ToString::to_string).collect();
    if actual != expected {
        eyre::bail!(
            "trace CSV must have headers 't_ms,reading', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<TraceRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    check_trace(&rows)?;
    Ok(rows)
}

/// Validate a parsed trace: finite readings and non-decreasing timestamps.
/// Row numbers in messages are 1-based file lines (header is line 1).
pub fn check_trace(rows: &[TraceRow]) -> eyre::Result<()> {
    if rows.is_empty() {
        eyre::bail!("trace CSV contains no readings");
    }
    for (i, row) in rows.iter().enumerate() {
        if !row.reading.is_finite() {
            eyre::bail!("invalid CSV row {}: reading must be finite", i + 2);
        }
        if i > 0 && row.t_ms < rows[i - 1].t_ms {
            eyre::bail!(
                "trace timestamps must be non-decreasing (row {} goes back in time)",
                i + 2
            );
        }
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Stabilizer
        if self.stabilizer.window_size < 3 {
            eyre::bail!("stabilizer.window_size must be >= 3");
        }
        if self.stabilizer.window_size > MAX_WINDOW_SIZE {
            eyre::bail!("stabilizer.window_size is unreasonably large (>{MAX_WINDOW_SIZE})");
        }
        if !self.stabilizer.weight_threshold.is_finite() {
            eyre::bail!("stabilizer.weight_threshold must be finite");
        }
        if self.stabilizer.weight_threshold < 0.0 {
            eyre::bail!("stabilizer.weight_threshold must be >= 0");
        }

        // Display
        if !self.display.resolution.is_finite() || self.display.resolution < 0.0 {
            eyre::bail!("display.resolution must be a finite value >= 0");
        }
        if self.display.decimal_places > MAX_DECIMAL_PLACES {
            eyre::bail!("display.decimal_places must be in [0, {MAX_DECIMAL_PLACES}]");
        }

        // Runner
        if self.runner.sample_rate_hz == 0 {
            eyre::bail!("runner.sample_rate_hz must be > 0");
        }
        if self.runner.display_every == 0 {
            eyre::bail!("runner.display_every must be >= 1");
        }

        // Simulation
        if !self.simulation.baseline_g.is_finite() {
            eyre::bail!("simulation.baseline_g must be finite");
        }
        if !self.simulation.noise_g.is_finite() || self.simulation.noise_g < 0.0 {
            eyre::bail!("simulation.noise_g must be a finite value >= 0");
        }
        if !self.simulation.spike_g.is_finite() {
            eyre::bail!("simulation.spike_g must be finite");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of: never, daily, hourly");
        }

        Ok(())
    }
}
