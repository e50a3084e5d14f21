//! Host loop: pull readings from a source, stabilize, push display changes.
//!
//! Single-threaded by construction. Every reading goes through
//! `Stabilizer::add`; the display is queried every `display_every` samples
//! and once more after the source is exhausted, and the sink only sees values
//! that differ from the last one shown.

use std::time::Duration;

use stabilizer_traits::{Clock, DisplaySink, ReadingSource};

use crate::config::DisplayCfg;
use crate::error::{Result, StabilizerError};
use crate::stabilizer::{Stabilizer, Telemetry};

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;

#[derive(Debug, Clone, Copy)]
pub struct RunParams {
    pub display: DisplayCfg,
    /// Query the display once every N samples (values < 1 behave as 1).
    pub display_every: usize,
    /// Sample cadence; only used when `realtime` is set.
    pub sample_rate_hz: u32,
    /// Sleep one sample period after each reading.
    pub realtime: bool,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            display: DisplayCfg::default(),
            display_every: 1,
            sample_rate_hz: 10,
            realtime: false,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Readings consumed from the source.
    pub samples: u64,
    /// Values pushed to the sink.
    pub updates: u64,
    /// Last displayed value; `None` when the source was empty.
    pub final_value: Option<f64>,
    pub telemetry: Telemetry,
}

/// Sample period for a rate in Hz, clamping `hz` to at least 1 and the result
/// to at least 1 µs.
#[inline]
pub fn sample_period(hz: u32) -> Duration {
    Duration::from_micros((MICROS_PER_SEC / u64::from(hz.max(1))).max(1))
}

fn source_error(e: &(dyn std::error::Error + 'static)) -> eyre::Report {
    eyre::Report::new(StabilizerError::Source(e.to_string()))
}

fn sink_error(e: &(dyn std::error::Error + 'static)) -> eyre::Report {
    eyre::Report::new(StabilizerError::Sink(e.to_string()))
}

struct Presenter<'a, D: DisplaySink> {
    sink: &'a mut D,
    display: DisplayCfg,
    last_shown: Option<f64>,
    updates: u64,
}

impl<D: DisplaySink> Presenter<'_, D> {
    #[allow(clippy::float_cmp)]
    fn refresh(&mut self, stabilizer: &mut Stabilizer, sample: u64) -> Result<f64> {
        let value = stabilizer.stabilized_reading_for(&self.display)?;
        if self.last_shown != Some(value) {
            self.sink
                .show(sample, value, self.display.decimal_places)
                .map_err(|e| sink_error(&*e))?;
            self.last_shown = Some(value);
            self.updates += 1;
        }
        Ok(value)
    }
}

/// Drive `stabilizer` from `source` until it is exhausted.
///
/// The stabilizer must already be initialized; its state carries over into
/// and out of the run.
pub fn run<S, D, C>(
    source: &mut S,
    sink: &mut D,
    stabilizer: &mut Stabilizer,
    params: &RunParams,
    clock: &C,
) -> Result<RunSummary>
where
    S: ReadingSource + ?Sized,
    D: DisplaySink,
    C: Clock + ?Sized,
{
    if !stabilizer.is_initialized() {
        return Err(eyre::Report::new(StabilizerError::NotInitialized));
    }

    let every = params.display_every.max(1) as u64;
    let period = sample_period(params.sample_rate_hz);
    let mut presenter = Presenter {
        sink,
        display: params.display,
        last_shown: None,
        updates: 0,
    };
    let mut samples: u64 = 0;

    tracing::info!(
        window_size = ?stabilizer.window_size(),
        display_every = every,
        realtime = params.realtime,
        "run start"
    );

    while let Some(reading) = source.next_reading().map_err(|e| source_error(&*e))? {
        stabilizer.add(reading)?;
        samples += 1;

        if samples % every == 0 {
            presenter.refresh(stabilizer, samples)?;
        }

        if params.realtime {
            clock.sleep(period);
        }
    }

    let final_value = if samples == 0 {
        None
    } else {
        Some(presenter.refresh(stabilizer, samples)?)
    };

    let summary = RunSummary {
        samples,
        updates: presenter.updates,
        final_value,
        telemetry: stabilizer.telemetry(),
    };
    tracing::info!(
        samples,
        updates = summary.updates,
        final_value = ?final_value,
        genuine_changes = summary.telemetry.genuine_changes,
        stuck_recoveries = summary.telemetry.stuck_recoveries,
        "run complete"
    );
    Ok(summary)
}
