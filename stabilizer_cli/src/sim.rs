//! `simulate` and `self-check`: a deterministic simulated load cell.

use std::io::Write;

use stabilizer_config::{Config, SimulationCfg};
use stabilizer_core::{RunParams, RunSummary, Stabilizer, StabilizerCfg, run};
use stabilizer_traits::{ManualClock, ReadingSource};

use crate::output::{PrintSink, Timeline, print_summary};

/// Load placed by `self-check`, in grams above baseline.
const SELF_CHECK_LOAD_G: f64 = 100.0;
/// `self-check` runs this many window lengths of samples.
const SELF_CHECK_WINDOWS: usize = 8;

/// Tiny xorshift32 PRNG; reproducible for a given seed.
#[derive(Debug, Clone)]
struct XorShift32(u32);

impl XorShift32 {
    fn new(seed: u32) -> Self {
        Self(seed.max(1))
    }

    /// Uniform in [-1, 1).
    fn next_signed(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        f64::from(x) / (f64::from(u32::MAX) + 1.0) * 2.0 - 1.0
    }
}

/// Simulated calibrated load cell: baseline plus uniform noise, a periodic
/// mechanical spike and an optional step load.
#[derive(Debug, Clone)]
pub struct SimulatedLoadCell {
    baseline_g: f64,
    noise_g: f64,
    spike_g: f64,
    spike_every: usize,
    /// `(grams, sample index)` of the step load.
    load: Option<(f64, usize)>,
    samples: usize,
    produced: usize,
    rng: XorShift32,
}

impl SimulatedLoadCell {
    pub fn new(sim: &SimulationCfg, samples: usize) -> Self {
        Self {
            baseline_g: sim.baseline_g,
            noise_g: sim.noise_g,
            spike_g: sim.spike_g,
            spike_every: sim.spike_every,
            load: None,
            samples,
            produced: 0,
            rng: XorShift32::new(sim.seed),
        }
    }

    #[must_use]
    pub fn with_load(mut self, grams: f64, at: usize) -> Self {
        self.load = Some((grams, at));
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.rng = XorShift32::new(seed);
        self
    }

    fn reading(&mut self, i: usize) -> f64 {
        let mut r = self.baseline_g + self.rng.next_signed() * self.noise_g;
        match self.load {
            Some((grams, at)) if i >= at => r += grams,
            _ => {}
        }
        if self.spike_every > 0 && (i + 1) % self.spike_every == 0 {
            r += self.spike_g;
        }
        r
    }
}

impl ReadingSource for SimulatedLoadCell {
    fn next_reading(&mut self) -> Result<Option<f64>, Box<dyn std::error::Error + Send + Sync>> {
        if self.produced >= self.samples {
            return Ok(None);
        }
        let r = self.reading(self.produced);
        self.produced += 1;
        Ok(Some(r))
    }
}

fn sim_stabilizer(cfg: &Config) -> eyre::Result<Stabilizer> {
    let core_cfg: StabilizerCfg = (&cfg.stabilizer).into();
    Stabilizer::from_cfg(&core_cfg)
}

pub fn run_simulation(
    cfg: &Config,
    samples: usize,
    load_g: Option<f64>,
    load_at: Option<usize>,
    seed: Option<u32>,
    json: bool,
) -> eyre::Result<()> {
    let mut cell = SimulatedLoadCell::new(&cfg.simulation, samples);
    if let Some(grams) = load_g {
        cell = cell.with_load(grams, load_at.unwrap_or(samples / 2));
    }
    if let Some(s) = seed {
        cell = cell.with_seed(s);
    }
    tracing::info!(samples, load_g = ?load_g, "simulation start");

    let mut stabilizer = sim_stabilizer(cfg)?;
    let params: RunParams = cfg.into();
    let timeline = Timeline::Paced(stabilizer_core::runner::sample_period(params.sample_rate_hz));
    let mut sink = PrintSink::new(std::io::stdout().lock(), json, timeline);

    let summary = run(
        &mut cell,
        &mut sink,
        &mut stabilizer,
        &params,
        &ManualClock::new(),
    )?;

    let mut out = sink.into_inner();
    print_summary(&mut out, json, &summary, params.display.decimal_places)?;
    out.flush()?;
    Ok(())
}

/// Run a silent simulated session with a known load and check that the
/// display settles on it.
fn self_check_summary(cfg: &Config) -> eyre::Result<(RunSummary, f64)> {
    let window = cfg.stabilizer.window_size;
    let samples = window.saturating_mul(SELF_CHECK_WINDOWS);
    let expected = cfg.simulation.baseline_g + SELF_CHECK_LOAD_G;
    let mut cell = SimulatedLoadCell::new(&cfg.simulation, samples)
        .with_load(SELF_CHECK_LOAD_G, samples / 2);

    let mut stabilizer = sim_stabilizer(cfg)?;
    let params: RunParams = cfg.into();
    let mut sink = PrintSink::new(std::io::sink(), false, Timeline::Recorded(Vec::new()));
    let summary = run(
        &mut cell,
        &mut sink,
        &mut stabilizer,
        &params,
        &ManualClock::new(),
    )?;
    Ok((summary, expected))
}

pub fn self_check(cfg: &Config, json: bool) -> eyre::Result<()> {
    let (summary, expected) = self_check_summary(cfg)?;
    let tolerance = cfg.stabilizer.weight_threshold
        + 2.0 * cfg.simulation.noise_g
        + cfg.display.resolution
        + 10f64.powi(-i32::try_from(cfg.display.decimal_places).unwrap_or(0));

    let Some(final_value) = summary.final_value else {
        eyre::bail!("self-check produced no readings");
    };
    if (final_value - expected).abs() > tolerance {
        eyre::bail!(
            "self-check: display settled at {final_value}, expected {expected} +/- {tolerance:.3}"
        );
    }
    tracing::info!(final_value, expected, "self-check passed");

    let mut out = std::io::stdout().lock();
    if json {
        let line = serde_json::json!({
            "status": "ok",
            "window_size": cfg.stabilizer.window_size,
            "weight_threshold": cfg.stabilizer.weight_threshold,
            "samples": summary.samples,
            "final": final_value,
        });
        writeln!(out, "{line}")?;
    } else {
        writeln!(
            out,
            "OK: window_size={} weight_threshold={} final={final_value}",
            cfg.stabilizer.window_size, cfg.stabilizer.weight_threshold
        )?;
    }
    Ok(())
}
