//! Human-readable error descriptions and structured JSON error formatting.

use stabilizer_core::error::StabilizerError;
use thiserror::Error;

/// Failures detected by the CLI before the stabilizer ever runs.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid trace: {0}")]
    InvalidTrace(String),
}

impl CliError {
    pub fn config(msg: impl std::fmt::Display) -> eyre::Report {
        eyre::Report::new(Self::InvalidConfig(msg.to_string()))
    }

    pub fn trace(msg: impl std::fmt::Display) -> eyre::Report {
        eyre::Report::new(Self::InvalidTrace(msg.to_string()))
    }
}

/// Stable reason name used in JSON errors.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(ce) = err.downcast_ref::<CliError>() {
        return match ce {
            CliError::InvalidConfig(_) => "InvalidConfig",
            CliError::InvalidTrace(_) => "InvalidTrace",
        };
    }
    if let Some(se) = err.downcast_ref::<StabilizerError>() {
        return match se {
            StabilizerError::WindowTooSmall(_) => "WindowTooSmall",
            StabilizerError::WindowTooLarge { .. } => "WindowTooLarge",
            StabilizerError::InvalidThreshold(_) => "InvalidThreshold",
            StabilizerError::NotInitialized => "NotInitialized",
            StabilizerError::Source(_) => "Source",
            StabilizerError::Sink(_) => "Sink",
        };
    }
    "Error"
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(ce) = err.downcast_ref::<CliError>() {
        return match ce {
            CliError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing [stabilizer] section, or out-of-range values in the TOML.\nHow to fix: Edit the config file (see etc/stabilizer.toml for a sample), then rerun."
            ),
            CliError::InvalidTrace(msg) => format!(
                "What happened: The reading trace could not be used ({msg}).\nLikely causes: Wrong headers (expected 't_ms,reading'), non-numeric or non-finite readings, or timestamps going backwards.\nHow to fix: Fix the CSV and rerun."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<StabilizerError>() {
        return match se {
            StabilizerError::WindowTooSmall(n) => format!(
                "What happened: Window size {n} is too small.\nLikely causes: stabilizer.window_size below 3.\nHow to fix: Use a window of at least 3 samples; 10 is a good start."
            ),
            StabilizerError::WindowTooLarge { got, max } => format!(
                "What happened: Window size {got} is too large.\nLikely causes: stabilizer.window_size above {max}.\nHow to fix: Use a window of at most {max} samples; 10 is a good start."
            ),
            StabilizerError::InvalidThreshold(t) => format!(
                "What happened: Weight threshold {t} is not usable.\nLikely causes: Negative or non-finite stabilizer.weight_threshold.\nHow to fix: Set a finite threshold >= 0 in the reading units (e.g. 0.5)."
            ),
            StabilizerError::Source(msg) => format!(
                "What happened: Reading source failed ({msg}).\nLikely causes: The input stream ended abnormally or could not be read.\nHow to fix: Check the input and rerun with --log-level=debug."
            ),
            StabilizerError::Sink(msg) => format!(
                "What happened: Could not write the display value ({msg}).\nLikely causes: Closed stdout pipe.\nHow to fix: Make sure the consumer of the output stays open."
            ),
            StabilizerError::NotInitialized => format!(
                "What happened: {se}.\nLikely causes: Internal sequencing bug.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 config, 4 input trace, 5 stabilizer state, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(ce) = err.downcast_ref::<CliError>() {
        return match ce {
            CliError::InvalidConfig(_) => 3,
            CliError::InvalidTrace(_) => 4,
        };
    }
    if let Some(se) = err.downcast_ref::<StabilizerError>() {
        return match se {
            StabilizerError::Source(_) => 4,
            StabilizerError::Sink(_) => 1,
            StabilizerError::WindowTooSmall(_)
            | StabilizerError::WindowTooLarge { .. }
            | StabilizerError::InvalidThreshold(_)
            | StabilizerError::NotInitialized => 5,
        };
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
