//! The stabilizer: outlier-rejecting ingestion plus flicker-free presentation.
//!
//! Ingestion runs in three regimes:
//! - forced refill: every reading is written (startup, after a genuine change,
//!   after stuck-state recovery);
//! - steady state: readings within `weight_threshold` of the trimmed mean are
//!   written, everything else is triaged;
//! - triage: an outlier whose predecessor also disagrees with the window
//!   starts a long refill, a lone outlier is dropped and costs one unit of
//!   patience (`abort_counter`). Running out of patience forces a refill.

use crate::config::{DisplayCfg, StabilizerCfg};
use crate::error::{Result, StabilizerError};
use crate::rounding::{clamp_near_zero, round_half_away};
use crate::window::Window;

/// The second-most-recent reading counts as drift when it deviates from the
/// trimmed mean by more than `weight_threshold * DRIFT_THRESHOLD_FACTOR`.
pub const DRIFT_THRESHOLD_FACTOR: f64 = 1.0;

/// A detected genuine change forces this many window lengths of refill.
pub const GENUINE_CHANGE_REFILL_FACTOR: usize = 6;

/// What `add` did with a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Written unconditionally while a refill was pending.
    Forced,
    /// Within threshold of the trimmed mean; written.
    Accepted,
    /// Outlier whose predecessor also drifted; refill started, not written.
    GenuineChange,
    /// Lone outlier treated as noise; not written.
    Rejected,
    /// Lone outlier that exhausted the patience budget; refill started, not written.
    Recovered,
    /// Non-finite reading; ignored entirely.
    Dropped,
}

/// Counters accumulated since the last `begin`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Telemetry {
    pub forced: u64,
    pub accepted: u64,
    /// Lone outliers, including the ones that ended in a recovery.
    pub rejected: u64,
    pub genuine_changes: u64,
    pub stuck_recoveries: u64,
    pub dropped: u64,
}

#[derive(Debug, Clone)]
struct Filter {
    window: Window,
    weight_threshold: f64,
    force_overwrite_remaining: usize,
    abort_counter: usize,
    last_code: f64,
    last_output: f64,
    telemetry: Telemetry,
}

impl Filter {
    fn new(window_size: usize, weight_threshold: f64) -> Result<Self> {
        if !weight_threshold.is_finite() || weight_threshold < 0.0 {
            return Err(eyre::Report::new(StabilizerError::InvalidThreshold(
                weight_threshold,
            )));
        }
        let window = Window::new(window_size)?;
        Ok(Self {
            window,
            weight_threshold,
            force_overwrite_remaining: window_size,
            abort_counter: abort_cap(window_size),
            last_code: 0.0,
            last_output: 0.0,
            telemetry: Telemetry::default(),
        })
    }

    fn abort_cap(&self) -> usize {
        abort_cap(self.window.capacity())
    }

    fn add(&mut self, reading: f64) -> Admission {
        if !reading.is_finite() {
            tracing::warn!(reading, "dropping non-finite reading");
            self.telemetry.dropped += 1;
            return Admission::Dropped;
        }

        if self.force_overwrite_remaining > 0 {
            self.window.push(reading);
            self.force_overwrite_remaining -= 1;
            self.telemetry.forced += 1;
            return Admission::Forced;
        }

        let mean = self.window.trimmed_mean();

        if (reading - mean).abs() < self.weight_threshold {
            self.window.push(reading);
            if self.abort_counter < self.abort_cap() {
                self.abort_counter += 1;
            }
            self.telemetry.accepted += 1;
            tracing::trace!(reading, mean, "reading accepted");
            return Admission::Accepted;
        }

        let previous = self.window.previous();
        if (previous - mean).abs() > self.weight_threshold * DRIFT_THRESHOLD_FACTOR {
            let refill = self.window.capacity() * GENUINE_CHANGE_REFILL_FACTOR;
            self.force_overwrite_remaining = refill;
            self.telemetry.genuine_changes += 1;
            tracing::debug!(reading, mean, previous, refill, "genuine load change detected");
            return Admission::GenuineChange;
        }

        self.telemetry.rejected += 1;
        self.abort_counter = self.abort_counter.saturating_sub(1);
        if self.abort_counter == 0 {
            self.force_overwrite_remaining = self.window.capacity();
            self.abort_counter = self.abort_cap();
            self.telemetry.stuck_recoveries += 1;
            tracing::debug!(
                reading,
                mean,
                refill = self.force_overwrite_remaining,
                "outlier patience exhausted; refilling window"
            );
            return Admission::Recovered;
        }
        tracing::trace!(reading, mean, patience = self.abort_counter, "outlier rejected");
        Admission::Rejected
    }

    // Rounded values are produced by the same computation, so exact equality
    // is the intended comparison.
    #[allow(clippy::float_cmp)]
    fn present(&mut self, resolution: f64, decimal_places: u32) -> f64 {
        let code = clamp_near_zero(self.window.trimmed_mean());
        let output = round_half_away(code, decimal_places);

        if output == self.last_output {
            self.last_code = code;
            return self.last_output;
        }

        if (code - self.last_code).abs() > resolution {
            self.last_code = code;
            self.last_output = output;
            return output;
        }

        self.last_output
    }
}

#[inline]
fn abort_cap(window_size: usize) -> usize {
    window_size / 2
}

/// Stabilizes a stream of calibrated readings into a display value.
///
/// Construct with [`Stabilizer::default`] and call [`Stabilizer::begin`], or
/// use [`Stabilizer::new`] to do both. Feed every sample to [`Stabilizer::add`]
/// in acquisition order and query [`Stabilizer::stabilized_reading`] whenever
/// the display needs refreshing.
#[derive(Default, Clone)]
pub struct Stabilizer {
    filter: Option<Filter>,
}

impl core::fmt::Debug for Stabilizer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.filter {
            None => f.debug_struct("Stabilizer").field("initialized", &false).finish(),
            Some(st) => f
                .debug_struct("Stabilizer")
                .field("window_size", &st.window.capacity())
                .field("weight_threshold", &st.weight_threshold)
                .field("force_overwrite_remaining", &st.force_overwrite_remaining)
                .field("abort_counter", &st.abort_counter)
                .field("last_output", &st.last_output)
                .finish(),
        }
    }
}

impl Stabilizer {
    /// Create and initialize in one step.
    pub fn new(window_size: usize, weight_threshold: f64) -> Result<Self> {
        let mut s = Self::default();
        s.begin(window_size, weight_threshold)?;
        Ok(s)
    }

    pub fn from_cfg(cfg: &StabilizerCfg) -> Result<Self> {
        Self::new(cfg.window_size, cfg.weight_threshold)
    }

    /// Allocate a zeroed window and reset all state. Safe to call again to
    /// fully reset the filter; on error the previous state is left untouched.
    pub fn begin(&mut self, window_size: usize, weight_threshold: f64) -> Result<()> {
        let filter = Filter::new(window_size, weight_threshold)?;
        tracing::debug!(window_size, weight_threshold, "stabilizer initialized");
        self.filter = Some(filter);
        Ok(())
    }

    /// Ingest one reading. Must be called once per sample, in acquisition order.
    pub fn add(&mut self, reading: f64) -> Result<Admission> {
        Ok(self.filter_mut()?.add(reading))
    }

    /// Current display value with the default resolution (0.1) and one decimal place.
    pub fn stabilized_reading(&mut self) -> Result<f64> {
        self.stabilized_reading_for(&DisplayCfg::default())
    }

    pub fn stabilized_reading_for(&mut self, display: &DisplayCfg) -> Result<f64> {
        self.stabilized_reading_with(display.resolution, display.decimal_places)
    }

    /// Current display value. Never touches the window, so it may be called
    /// any number of times between `add` calls.
    pub fn stabilized_reading_with(
        &mut self,
        display_resolution: f64,
        decimal_places: u32,
    ) -> Result<f64> {
        Ok(self
            .filter_mut()?
            .present(display_resolution, decimal_places))
    }

    /// Trimmed mean of the current window, without clamping or rounding.
    pub fn trimmed_mean(&self) -> Result<f64> {
        Ok(self.filter()?.window.trimmed_mean())
    }

    pub fn is_initialized(&self) -> bool {
        self.filter.is_some()
    }

    /// True once no forced refill is pending.
    pub fn is_settled(&self) -> bool {
        self.filter
            .as_ref()
            .is_some_and(|st| st.force_overwrite_remaining == 0)
    }

    pub fn window_size(&self) -> Option<usize> {
        self.filter.as_ref().map(|st| st.window.capacity())
    }

    pub fn weight_threshold(&self) -> Option<f64> {
        self.filter.as_ref().map(|st| st.weight_threshold)
    }

    /// Window slots in index order.
    pub fn window(&self) -> Option<&[f64]> {
        self.filter.as_ref().map(|st| st.window.as_slice())
    }

    pub fn force_overwrite_remaining(&self) -> Option<usize> {
        self.filter.as_ref().map(|st| st.force_overwrite_remaining)
    }

    /// Remaining outlier patience, in `[0, window_size / 2]`.
    pub fn abort_counter(&self) -> Option<usize> {
        self.filter.as_ref().map(|st| st.abort_counter)
    }

    /// Last value returned by the presentation call.
    pub fn last_output(&self) -> Option<f64> {
        self.filter.as_ref().map(|st| st.last_output)
    }

    /// Last trimmed mean considered by the presentation call.
    pub fn last_code(&self) -> Option<f64> {
        self.filter.as_ref().map(|st| st.last_code)
    }

    pub fn telemetry(&self) -> Telemetry {
        self.filter
            .as_ref()
            .map(|st| st.telemetry)
            .unwrap_or_default()
    }

    fn filter(&self) -> Result<&Filter> {
        self.filter
            .as_ref()
            .ok_or_else(|| eyre::Report::new(StabilizerError::NotInitialized))
    }

    fn filter_mut(&mut self) -> Result<&mut Filter> {
        self.filter
            .as_mut()
            .ok_or_else(|| eyre::Report::new(StabilizerError::NotInitialized))
    }
}
