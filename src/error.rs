//! Error types for timer construction and statistics requests.

use thiserror::Error;

/// Configuration-level errors. Failures of the wrapped function itself are
/// never turned into a `TimerError`; they go through the reporter instead.
#[derive(Debug, Error)]
pub enum TimerError {
    /// Window capacity below one sample
    #[error("window size must be at least 1, got {0}")]
    InvalidWindowSize(usize),

    /// Percentile outside [0, 100] (or NaN)
    #[error("percentile must be within [0, 100], got {0}")]
    InvalidPercentile(f64),

    /// Statistics requested over an empty sample set
    #[error("cannot compute statistics over an empty window")]
    EmptyWindow,

    /// Malformed configuration document
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for timer operations.
pub type TimerResult<T> = Result<T, TimerError>;
