pub mod collector;
pub mod percentiles;
pub mod window;

pub use collector::{AggregationResult, ExtremaPolicy, SharedAggregator, WindowedAggregator};
pub use percentiles::{percentile, PercentileSet};
pub use window::SampleWindow;
