use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::percentiles::{sort_samples, PercentileSet};
use super::window::SampleWindow;
use crate::error::TimerResult;

// ─── Public types ────────────────────────────────────────────────

/// How the running min/max behave when a window is flushed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremaPolicy {
    /// Min/max span every sample since the aggregator was created, so a
    /// window can report an extreme observed in an earlier one.
    #[default]
    Lifetime,
    /// Min/max restart with each window.
    PerWindow,
}

/// Summary emitted once per full window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    /// Number of samples in the window (always the window size)
    pub calls: usize,
    pub min: f64,
    pub max: f64,
    pub average: f64,
    /// Present only when percentiles are enabled
    pub percentiles: Option<PercentileSet>,
}

/// Single-owner windowed aggregator. Feed it elapsed seconds, get a summary
/// back every `window_size` samples.
#[derive(Debug, Clone)]
pub struct WindowedAggregator {
    window: SampleWindow,
    include_percentiles: bool,
    extrema_policy: ExtremaPolicy,
    running: Option<Extrema>,
    windows_emitted: u64,
}

/// Thread-safe wrapper: push, full-check and reset happen under one lock, so
/// every `window_size` samples yield exactly one summary no matter how many
/// threads record concurrently.
#[derive(Debug)]
pub struct SharedAggregator {
    inner: Mutex<WindowedAggregator>,
}

// ─── Internal state ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Extrema {
    min: f64,
    max: f64,
}

impl Extrema {
    fn widen(slot: &mut Option<Extrema>, value: f64) -> Extrema {
        let next = match *slot {
            Some(e) => Extrema {
                min: e.min.min(value),
                max: e.max.max(value),
            },
            None => Extrema {
                min: value,
                max: value,
            },
        };
        *slot = Some(next);
        next
    }
}

// ─── WindowedAggregator impl ─────────────────────────────────────

impl WindowedAggregator {
    pub fn new(
        window_size: usize,
        include_percentiles: bool,
        extrema_policy: ExtremaPolicy,
    ) -> TimerResult<Self> {
        Ok(Self {
            window: SampleWindow::new(window_size)?,
            include_percentiles,
            extrema_policy,
            running: None,
            windows_emitted: 0,
        })
    }

    /// Record one elapsed duration (seconds). Returns the window summary when
    /// this sample completes the window, after which the window is empty.
    pub fn record(&mut self, elapsed: f64) -> Option<AggregationResult> {
        let extrema = Extrema::widen(&mut self.running, elapsed);
        self.window.push(elapsed);

        if !self.window.is_full() {
            return None;
        }

        let result = self.summarize(extrema);
        self.window.reset();
        if self.extrema_policy == ExtremaPolicy::PerWindow {
            self.running = None;
        }
        self.windows_emitted += 1;
        Some(result)
    }

    fn summarize(&self, extrema: Extrema) -> AggregationResult {
        let calls = self.window.len();
        let average = self.window.sum() / calls as f64;

        let percentiles = if self.include_percentiles {
            PercentileSet::from_sorted(&sort_samples(self.window.samples()))
        } else {
            None
        };

        AggregationResult {
            calls,
            min: extrema.min,
            max: extrema.max,
            average,
            percentiles,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window.capacity()
    }

    /// Samples collected toward the current (unfinished) window.
    pub fn pending(&self) -> usize {
        self.window.len()
    }

    pub fn windows_emitted(&self) -> u64 {
        self.windows_emitted
    }

    pub fn includes_percentiles(&self) -> bool {
        self.include_percentiles
    }
}

// ─── SharedAggregator impl ───────────────────────────────────────

impl SharedAggregator {
    pub fn new(aggregator: WindowedAggregator) -> Self {
        Self {
            inner: Mutex::new(aggregator),
        }
    }

    pub fn record(&self, elapsed: f64) -> Option<AggregationResult> {
        self.inner.lock().record(elapsed)
    }

    pub fn pending(&self) -> usize {
        self.inner.lock().pending()
    }

    pub fn windows_emitted(&self) -> u64 {
        self.inner.lock().windows_emitted()
    }

    pub fn window_size(&self) -> usize {
        self.inner.lock().window_size()
    }
}
