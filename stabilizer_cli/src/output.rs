//! Display sink printing stabilized values as text or JSON lines.

use std::io::Write;
use std::time::Duration;

use serde_json::json;
use stabilizer_core::RunSummary;
use stabilizer_traits::DisplaySink;

/// Maps a 1-based sample count to the timestamp printed next to it.
pub enum Timeline {
    /// Timestamps recorded in a trace, one per reading.
    Recorded(Vec<u64>),
    /// Evenly spaced readings; the first one is at t = 0.
    Paced(Duration),
}

impl Timeline {
    pub fn t_ms(&self, sample: u64) -> u64 {
        let idx = sample.saturating_sub(1);
        match self {
            Self::Recorded(ts) => usize::try_from(idx)
                .ok()
                .and_then(|i| ts.get(i))
                .or_else(|| ts.last())
                .copied()
                .unwrap_or(0),
            Self::Paced(period) => {
                u64::try_from(period.as_millis().saturating_mul(u128::from(idx))).unwrap_or(u64::MAX)
            }
        }
    }
}

pub struct PrintSink<W: Write> {
    out: W,
    json: bool,
    timeline: Timeline,
}

impl<W: Write> PrintSink<W> {
    pub const fn new(out: W, json: bool, timeline: Timeline) -> Self {
        Self {
            out,
            json,
            timeline,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySink for PrintSink<W> {
    fn show(
        &mut self,
        sample: u64,
        value: f64,
        decimal_places: u32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let t_ms = self.timeline.t_ms(sample);
        if self.json {
            writeln!(self.out, "{}", json!({ "t_ms": t_ms, "value": value }))?;
        } else {
            let dp = decimal_places as usize;
            writeln!(self.out, "t={t_ms:>8} ms  {value:.dp$}")?;
        }
        Ok(())
    }
}

/// Print the end-of-run summary line(s).
pub fn print_summary<W: Write>(
    out: &mut W,
    json: bool,
    summary: &RunSummary,
    decimal_places: u32,
) -> std::io::Result<()> {
    if json {
        let line = json!({
            "samples": summary.samples,
            "updates": summary.updates,
            "genuine_changes": summary.telemetry.genuine_changes,
            "stuck_recoveries": summary.telemetry.stuck_recoveries,
            "final": summary.final_value,
        });
        writeln!(out, "{line}")
    } else {
        let dp = decimal_places as usize;
        let shown = summary
            .final_value
            .map_or_else(|| "-".to_string(), |v| format!("{v:.dp$}"));
        writeln!(out, "--- Stabilizer Summary ---")?;
        writeln!(out, "Samples: {}", summary.samples)?;
        writeln!(out, "Display updates: {}", summary.updates)?;
        writeln!(
            out,
            "Accepted / forced / rejected / dropped: {} / {} / {} / {}",
            summary.telemetry.accepted,
            summary.telemetry.forced,
            summary.telemetry.rejected,
            summary.telemetry.dropped
        )?;
        writeln!(out, "Genuine changes: {}", summary.telemetry.genuine_changes)?;
        writeln!(out, "Stuck recoveries: {}", summary.telemetry.stuck_recoveries)?;
        writeln!(out, "Final: {shown}")
    }
}
