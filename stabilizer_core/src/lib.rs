#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Load-cell reading stabilizer (hardware-agnostic).
//!
//! Turns a stream of noisy, already-calibrated load-cell readings into a
//! steady display value. Readings come in through `Stabilizer::add`; the
//! display value comes out of `Stabilizer::stabilized_reading`.
//!
//! ## Architecture
//!
//! - **Window**: fixed-capacity circular buffer and trimmed (M-2) mean (`window`)
//! - **Ingestion**: forced refill, threshold acceptance, outlier triage with a
//!   bounded patience counter (`stabilizer`)
//! - **Presentation**: zero clamp, half-away rounding and two-stage hysteresis
//!   (`stabilizer`, `rounding`)
//! - **Configuration**: runtime config structs (`config`) and conversions
//!   from the TOML schema (`conversions`)
//! - **Runner**: single-threaded host loop over `stabilizer_traits` seams (`runner`)

pub mod config;
pub mod conversions;
pub mod error;
pub mod rounding;
pub mod runner;
pub mod stabilizer;
pub mod window;

pub use config::{DisplayCfg, StabilizerCfg};
pub use error::{Result, StabilizerError};
pub use runner::{RunParams, RunSummary, run};
pub use stabilizer::{Admission, Stabilizer, Telemetry};
pub use window::{MAX_WINDOW_SIZE, MIN_WINDOW_SIZE, Window};
