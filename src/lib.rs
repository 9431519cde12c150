//! Non-invasive execution-time instrumentation for functions.
//!
//! Three flavours of [`CallTimer`]:
//!
//! - per-call: every successful call reports its elapsed time
//! - windowed: every `window_size` calls report min / avg / max
//! - windowed with percentiles: the above plus p50 / p75 / p90 / p99
//!
//! ```rust
//! use std::sync::Arc;
//! use elapsed_timer::{CallTimer, MemoryReporter, TimerConfig};
//!
//! let reporter = Arc::new(MemoryReporter::new());
//! let config = TimerConfig::default().with_window_size(2).with_percentiles(true);
//! let timer = CallTimer::windowed("square", &config, reporter.clone()).unwrap();
//!
//! let square = timer.wrap(|x: u64| x * x);
//! assert_eq!(square(3), 9);
//! assert_eq!(square(4), 16);
//! assert_eq!(reporter.len(), 1);
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod report;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{FailurePolicy, TimerConfig};
pub use error::{TimerError, TimerResult};
pub use metrics::{
    percentile, AggregationResult, ExtremaPolicy, PercentileSet, SampleWindow, WindowedAggregator,
};
pub use middleware::{CallOutcome, CallTimer};
pub use report::{
    format_report, CallSite, ConsoleReporter, JsonReporter, MemoryReporter, Report, Reporter,
    TracingReporter,
};
