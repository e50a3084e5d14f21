use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StabilizerError {
    #[error("window size must be >= 3 (got {0})")]
    WindowTooSmall(usize),
    #[error("window size must be <= {max} (got {got})")]
    WindowTooLarge { got: usize, max: usize },
    #[error("weight threshold must be a finite value >= 0 (got {0})")]
    InvalidThreshold(f64),
    #[error("stabilizer not initialized: call begin() first")]
    NotInitialized,
    #[error("reading source error: {0}")]
    Source(String),
    #[error("display sink error: {0}")]
    Sink(String),
}

pub type Result<T> = eyre::Result<T>;
