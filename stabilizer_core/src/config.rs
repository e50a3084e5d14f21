//! Configuration types for the stabilizer.
//!
//! These are the runtime configuration structs used by `Stabilizer` and the
//! runner. They are separate from the TOML-deserialized config in
//! `stabilizer_config`.

/// Ingestion parameters, fixed at `begin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilizerCfg {
    /// Window capacity (>= 3; >= 5 recommended).
    pub window_size: usize,
    /// Noise tolerance in reading units.
    pub weight_threshold: f64,
}

impl Default for StabilizerCfg {
    fn default() -> Self {
        Self {
            window_size: 10,
            weight_threshold: 0.5,
        }
    }
}

/// Presentation parameters; may differ between calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayCfg {
    /// Unrounded value must move by more than this before the display changes.
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
