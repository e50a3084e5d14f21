pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Producer of already-calibrated load-cell readings, in acquisition order.
pub trait ReadingSource {
    /// Next reading, or `Ok(None)` once the source is exhausted.
    fn next_reading(&mut self) -> Result<Option<f64>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Consumer of stabilized display values.
pub trait DisplaySink {
    /// Called only when the displayed value changes. `sample` is the 1-based
    /// count of readings consumed so far.
    fn show(
        &mut self,
        sample: u64,
        value: f64,
        decimal_places: u32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<I: Iterator<Item = f64>> ReadingSource for std::iter::Fuse<I> {
    fn next_reading(&mut self) -> Result<Option<f64>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.next())
    }
}
