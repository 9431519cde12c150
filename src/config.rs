use serde::Deserialize;

use crate::error::{TimerError, TimerResult};
use crate::metrics::ExtremaPolicy;

// ─── Defaults ────────────────────────────────────────────────────

/// Samples per statistics window
pub const DEFAULT_WINDOW_SIZE: usize = 1000;

/// Digits after the decimal point when rendering seconds
pub const DEFAULT_DECIMAL_PLACES: usize = 9;

// ─── Public types ────────────────────────────────────────────────

/// What a timer does when the wrapped function reports an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Report the failure and hand the caller `None`.
    #[default]
    Suppress,
    /// Report the failure and hand the error back to the caller.
    Propagate,
}

/// Settings shared by every timer flavour.
///
/// Only `window_size`, `include_percentiles` and `extrema_policy` affect the
/// statistics; `decimal_places` and `include_arguments` are presentation knobs
/// consumed by reporters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub window_size: usize,
    pub decimal_places: usize,
    pub include_arguments: bool,
    pub include_percentiles: bool,
    pub failure_policy: FailurePolicy,
    pub extrema_policy: ExtremaPolicy,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            decimal_places: DEFAULT_DECIMAL_PLACES,
            include_arguments: false,
            include_percentiles: false,
            failure_policy: FailurePolicy::default(),
            extrema_policy: ExtremaPolicy::default(),
        }
    }
}

impl TimerConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> TimerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TimerResult<()> {
        if self.window_size == 0 {
            return Err(TimerError::InvalidWindowSize(self.window_size));
        }
        Ok(())
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_decimal_places(mut self, decimal_places: usize) -> Self {
        self.decimal_places = decimal_places;
        self
    }

    pub fn with_arguments(mut self, include: bool) -> Self {
        self.include_arguments = include;
        self
    }

    pub fn with_percentiles(mut self, include: bool) -> Self {
        self.include_percentiles = include;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_extrema_policy(mut self, policy: ExtremaPolicy) -> Self {
        self.extrema_policy = policy;
        self
    }
}
