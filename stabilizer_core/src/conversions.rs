//! `From` implementations bridging `stabilizer_config` types to core types.

use crate::config::{DisplayCfg, StabilizerCfg};
use crate::runner::RunParams;

// ── StabilizerCfg ────────────────────────────────────────────────────────────

impl From<&stabilizer_config::StabilizerCfg> for StabilizerCfg {
    fn from(c: &stabilizer_config::StabilizerCfg) -> Self {
        Self {
            window_size: c.window_size,
            weight_threshold: c.weight_threshold,
        }
    }
}

// ── DisplayCfg ───────────────────────────────────────────────────────────────

impl From<&stabilizer_config::DisplayCfg> for DisplayCfg {
    fn from(c: &stabilizer_config::DisplayCfg) -> Self {
        Self {
            resolution: c.resolution,
            decimal_places: c.decimal_places,
        }
    }
}

// ── RunParams ────────────────────────────────────────────────────────────────

impl From<&stabilizer_config::Config> for RunParams {
    fn from(c: &stabilizer_config::Config) -> Self {
        Self {
            display: (&c.display).into(),
            display_every: c.runner.display_every,
            sample_rate_hz: c.runner.sample_rate_hz,
            realtime: false,
        }
    }
}
