//! Fixed-capacity circular window of recent readings.
//!
//! The window is allocated once and never resized. A single index marks the
//! most recently written slot; the slot after it (modulo capacity) is always
//! the oldest and is the next one overwritten.

use crate::error::{Result, StabilizerError};

/// Smallest capacity for which the trimmed mean is defined.
pub const MIN_WINDOW_SIZE: usize = 3;

/// Largest capacity accepted; shared with config validation.
pub const MAX_WINDOW_SIZE: usize = stabilizer_config::MAX_WINDOW_SIZE;

#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    slots: Vec<f64>,
    latest: usize,
}

impl Window {
    /// Allocate `capacity` zeroed slots with slot 0 marked most recent.
    ///
    /// `capacity` must lie in `MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE`.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < MIN_WINDOW_SIZE {
            return Err(eyre::Report::new(StabilizerError::WindowTooSmall(
                capacity,
            )));
        }
        if capacity > MAX_WINDOW_SIZE {
            return Err(eyre::Report::new(StabilizerError::WindowTooLarge {
                got: capacity,
                max: MAX_WINDOW_SIZE,
            }));
        }
        Ok(Self {
            slots: vec![0.0; capacity],
            latest: 0,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots in index order (not age order).
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.slots
    }

    /// Index of the most recently written slot.
    #[inline]
    pub fn latest_index(&self) -> usize {
        self.latest
    }

    /// Index of the oldest slot, i.e. the next one to be overwritten.
    #[inline]
    pub fn oldest_index(&self) -> usize {
        (self.latest + 1) % self.capacity()
    }

    /// Index of the slot written immediately before the most recent one.
    #[inline]
    pub fn previous_index(&self) -> usize {
        (self.latest + self.capacity() - 1) % self.capacity()
    }

    /// Value of the second-most-recent committed reading.
    #[inline]
    pub fn previous(&self) -> f64 {
        self.slots[self.previous_index()]
    }

    /// Overwrite the oldest slot and make it the most recent.
    pub fn push(&mut self, reading: f64) {
        let idx = self.oldest_index();
        self.slots[idx] = reading;
        self.latest = idx;
    }

    /// Indices of the slots excluded from the trimmed mean, as `(min, max)`.
    ///
    /// Ties resolve to the first occurrence in index order. The maximum is
    /// searched among the slots other than the chosen minimum, so the pair is
    /// always distinct; when every slot holds the same value this yields
    /// `(0, 1)`.
    pub fn extremes(&self) -> (usize, usize) {
        let mut min_idx = 0;
        for (i, &v) in self.slots.iter().enumerate().skip(1) {
            if v < self.slots[min_idx] {
                min_idx = i;
            }
        }

        let mut max_idx = usize::from(min_idx == 0);
        for (i, &v) in self.slots.iter().enumerate() {
            if i != min_idx && v > self.slots[max_idx] {
                max_idx = i;
            }
        }
        (min_idx, max_idx)
    }

    /// Mean of the window excluding one minimum and one maximum slot (M-2 average).
    #[allow(clippy::cast_precision_loss)]
    pub fn trimmed_mean(&self) -> f64 {
        let (min_idx, max_idx) = self.extremes();
        let sum: f64 = self
            .slots
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != min_idx && *i != max_idx)
            .map(|(_, v)| *v)
            .sum();
        sum / (self.capacity() - 2) as f64
    }
}
