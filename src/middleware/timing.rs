use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::clock::{elapsed_secs, Clock, MonotonicClock};
use crate::config::{FailurePolicy, TimerConfig};
use crate::error::TimerResult;
use crate::metrics::{SharedAggregator, WindowedAggregator};
use crate::report::{CallSite, Report, Reporter};

// ─── Call outcome ────────────────────────────────────────────────

/// What the wrapped function produced: a value, or an error that cancels the
/// measurement for that call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome<T, E> {
    Completed(T),
    Failed(E),
}

impl<T, E> From<Result<T, E>> for CallOutcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Completed(value),
            Err(err) => Self::Failed(err),
        }
    }
}

// ─── Timer ───────────────────────────────────────────────────────

enum TimerKind {
    /// Report every call as it completes
    Elapsed,
    /// Aggregate calls into windows, report one summary per window
    Windowed(SharedAggregator),
}

/// Wraps calls to one named function and times them.
///
/// A timer is `Send + Sync`: clone an `Arc<CallTimer>` into as many tasks or
/// threads as needed. Windowed state is updated under a short lock that is
/// never held across an `.await`.
pub struct CallTimer {
    name: String,
    kind: TimerKind,
    include_arguments: bool,
    decimal_places: usize,
    failure_policy: FailurePolicy,
    clock: Arc<dyn Clock>,
    reporter: Arc<dyn Reporter>,
}

impl fmt::Debug for CallTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallTimer")
            .field("name", &self.name)
            .field("windowed", &self.is_windowed())
            .field("include_arguments", &self.include_arguments)
            .field("decimal_places", &self.decimal_places)
            .field("failure_policy", &self.failure_policy)
            .finish()
    }
}

impl CallTimer {
    /// Per-call timer: every successful call is reported immediately.
    pub fn elapsed(
        name: impl Into<String>,
        config: &TimerConfig,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: TimerKind::Elapsed,
            include_arguments: config.include_arguments,
            decimal_places: config.decimal_places,
            failure_policy: config.failure_policy,
            clock: Arc::new(MonotonicClock::new()),
            reporter,
        }
    }

    /// Windowed timer: min/avg/max (plus percentiles when enabled) every
    /// `config.window_size` successful calls.
    pub fn windowed(
        name: impl Into<String>,
        config: &TimerConfig,
        reporter: Arc<dyn Reporter>,
    ) -> TimerResult<Self> {
        config.validate()?;
        let aggregator = WindowedAggregator::new(
            config.window_size,
            config.include_percentiles,
            config.extrema_policy,
        )?;

        Ok(Self {
            name: name.into(),
            kind: TimerKind::Windowed(SharedAggregator::new(aggregator)),
            include_arguments: config.include_arguments,
            decimal_places: config.decimal_places,
            failure_policy: config.failure_policy,
            clock: Arc::new(MonotonicClock::new()),
            reporter,
        })
    }

    /// Swap the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_windowed(&self) -> bool {
        matches!(self.kind, TimerKind::Windowed(_))
    }

    /// Successful calls waiting in the current window (always 0 for
    /// per-call timers).
    pub fn pending(&self) -> usize {
        match &self.kind {
            TimerKind::Elapsed => 0,
            TimerKind::Windowed(agg) => agg.pending(),
        }
    }

    // ── Synchronous calls ───────────────────────────────────────

    /// Time an infallible call.
    ///
    /// # Panics
    ///
    /// A panic inside `f` is not caught; it unwinds to the caller and the
    /// call is not measured.
    pub fn call<T>(&self, f: impl FnOnce() -> T) -> T {
        self.call_with((), |()| f())
    }

    /// Time an infallible call, passing `args` through. `args` is rendered
    /// for the reporter only when arguments are enabled.
    pub fn call_with<A: fmt::Debug, T>(&self, args: A, f: impl FnOnce(A) -> T) -> T {
        let site = self.call_site(&args);
        let start = self.clock.now();
        let value = f(args);
        let elapsed = elapsed_secs(start, self.clock.now());
        self.observe(site, elapsed);
        value
    }

    /// Time a fallible call.
    ///
    /// `Ok(v)` is measured and yields `Ok(Some(v))`. `Err(e)` is not measured;
    /// it is reported as a failure and then, depending on the failure policy,
    /// swallowed (`Ok(None)`) or handed back (`Err(e)`).
    pub fn try_call<T, E: fmt::Display>(
        &self,
        f: impl FnOnce() -> Result<T, E>,
    ) -> Result<Option<T>, E> {
        self.try_call_with((), |()| f())
    }

    pub fn try_call_with<A: fmt::Debug, T, E: fmt::Display>(
        &self,
        args: A,
        f: impl FnOnce(A) -> Result<T, E>,
    ) -> Result<Option<T>, E> {
        let site = self.call_site(&args);
        let start = self.clock.now();
        let outcome = CallOutcome::from(f(args));
        let end = self.clock.now();
        self.settle(site, elapsed_secs(start, end), outcome)
    }

    // ── Asynchronous calls ──────────────────────────────────────

    /// Time a future from first poll to completion, suspension included.
    pub async fn call_async<T, F>(&self, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        let site = self.call_site(&());
        let start = self.clock.now();
        let value = fut.await;
        let elapsed = elapsed_secs(start, self.clock.now());
        self.observe(site, elapsed);
        value
    }

    pub async fn try_call_async<T, E, F>(&self, fut: F) -> Result<Option<T>, E>
    where
        E: fmt::Display,
        F: Future<Output = Result<T, E>>,
    {
        self.try_call_async_with((), |()| fut).await
    }

    pub async fn try_call_async_with<A, T, E, F, Fut>(
        &self,
        args: A,
        f: F,
    ) -> Result<Option<T>, E>
    where
        A: fmt::Debug,
        E: fmt::Display,
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let site = self.call_site(&args);
        let start = self.clock.now();
        let outcome = CallOutcome::from(f(args).await);
        let end = self.clock.now();
        self.settle(site, elapsed_secs(start, end), outcome)
    }

    // ── Decorator form ──────────────────────────────────────────

    /// Wrap an infallible function so every call goes through this timer.
    ///
    /// # Panics
    ///
    /// Panics in `f` propagate through the wrapped function unchanged; only
    /// `Err` results of [`wrap_fallible`](Self::wrap_fallible) are swallowed.
    pub fn wrap<'a, A, T, F>(&'a self, f: F) -> impl Fn(A) -> T + 'a
    where
        A: fmt::Debug,
        F: Fn(A) -> T + 'a,
    {
        move |args| self.call_with(args, &f)
    }

    /// Wrap a fallible function; the wrapped form follows the failure policy.
    pub fn wrap_fallible<'a, A, T, E, F>(&'a self, f: F) -> impl Fn(A) -> Result<Option<T>, E> + 'a
    where
        A: fmt::Debug,
        E: fmt::Display,
        F: Fn(A) -> Result<T, E> + 'a,
    {
        move |args| self.try_call_with(args, &f)
    }

    // ── Internals ───────────────────────────────────────────────

    fn call_site<A: fmt::Debug>(&self, args: &A) -> CallSite {
        let site = CallSite::new(self.name.as_str());
        if self.include_arguments {
            site.with_arguments(render_arguments(args))
        } else {
            site
        }
    }

    fn settle<T, E: fmt::Display>(
        &self,
        site: CallSite,
        elapsed: f64,
        outcome: CallOutcome<T, E>,
    ) -> Result<Option<T>, E> {
        match outcome {
            CallOutcome::Completed(value) => {
                self.observe(site, elapsed);
                Ok(Some(value))
            }
            CallOutcome::Failed(err) => {
                tracing::warn!(
                    function = %self.name,
                    error = %err,
                    policy = ?self.failure_policy,
                    "timed call failed"
                );
                self.emit(&Report::Failure {
                    site,
                    windowed: self.is_windowed(),
                    message: err.to_string(),
                });
                match self.failure_policy {
                    FailurePolicy::Suppress => Ok(None),
                    FailurePolicy::Propagate => Err(err),
                }
            }
        }
    }

    fn emit(&self, report: &Report) {
        self.reporter.report_with_precision(report, self.decimal_places);
    }

    fn observe(&self, site: CallSite, elapsed: f64) {
        match &self.kind {
            TimerKind::Elapsed => {
                self.emit(&Report::Elapsed {
                    site,
                    elapsed_secs: elapsed,
                });
            }
            TimerKind::Windowed(agg) => {
                // Lock released before reporting
                if let Some(stats) = agg.record(elapsed) {
                    tracing::debug!(
                        function = %self.name,
                        calls = stats.calls,
                        avg = stats.average,
                        "window flushed"
                    );
                    self.emit(&Report::Window { site, stats });
                }
            }
        }
    }
}

/// `()` renders as no arguments; tuples lose their outer parentheses so
/// `(1, "a")` shows up as `f(1, "a")`.
fn render_arguments<A: fmt::Debug>(args: &A) -> String {
    let raw = format!("{args:?}");
    if raw == "()" {
        return String::new();
    }
    match raw.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => inner.trim_end_matches(',').to_string(),
        None => raw,
    }
}
