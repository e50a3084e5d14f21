//! `replay`: stream a recorded trace through the stabilizer.

use std::io::Write;
use std::path::Path;

use stabilizer_config::Config;
use stabilizer_core::{RunParams, Stabilizer, StabilizerCfg, run};
use stabilizer_traits::{MonotonicClock, ReadingSource};

use crate::error_fmt::CliError;
use crate::output::{PrintSink, Timeline, print_summary};

/// Readings of a validated trace, in file order.
pub struct TraceSource {
    readings: std::vec::IntoIter<f64>,
}

impl TraceSource {
    pub fn new(rows: &[stabilizer_config::TraceRow]) -> Self {
        Self {
            readings: rows
                .iter()
                .map(|r| r.reading)
                .collect::<Vec<_>>()
                .into_iter(),
        }
    }
}

impl ReadingSource for TraceSource {
    fn next_reading(&mut self) -> Result<Option<f64>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.readings.next())
    }
}

pub fn run_replay(
    cfg: &Config,
    input: &Path,
    realtime: bool,
    every: Option<u64>,
    json: bool,
) -> eyre::Result<()> {
    let rows = stabilizer_config::load_trace_csv(input).map_err(CliError::trace)?;
    tracing::info!(input = %input.display(), rows = rows.len(), "trace loaded");

    let core_cfg: StabilizerCfg = (&cfg.stabilizer).into();
    let mut stabilizer = Stabilizer::from_cfg(&core_cfg)?;

    let mut params: RunParams = cfg.into();
    params.realtime = realtime;
    if let Some(n) = every {
        params.display_every = usize::try_from(n).unwrap_or(usize::MAX);
    }

    let timeline = Timeline::Recorded(rows.iter().map(|r| r.t_ms).collect());
    let mut source = TraceSource::new(&rows);
    let mut sink = PrintSink::new(std::io::stdout().lock(), json, timeline);

    let summary = run(
        &mut source,
        &mut sink,
        &mut stabilizer,
        &params,
        &MonotonicClock::new(),
    )?;

    let mut out = sink.into_inner();
    print_summary(&mut out, json, &summary, params.display.decimal_places)?;
    out.flush()?;
    Ok(())
}
