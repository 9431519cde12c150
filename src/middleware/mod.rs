pub mod timing;

pub use timing::{CallOutcome, CallTimer};
