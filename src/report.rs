//! Reporting sinks.
//!
//! Timers hand every observation to a [`Reporter`] as a structured [`Report`].
//! How (and whether) it gets rendered is entirely up to the sink: coloured
//! console lines, `tracing` events, JSON lines, or an in-memory buffer.

use std::fmt;
use std::io::Write;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::config::DEFAULT_DECIMAL_PLACES;
use crate::metrics::AggregationResult;

// ─── Call-site descriptor ────────────────────────────────────────

/// Identifies the instrumented function and, when requested, the arguments of
/// the call being reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSite {
    pub function: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

impl CallSite {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            arguments: None,
        }
    }

    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }
}

/// Renders as `name()` or `name(args)`.
impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arguments {
            Some(args) => write!(f, "{}({})", self.function, args),
            None => write!(f, "{}()", self.function),
        }
    }
}

// ─── Reports ─────────────────────────────────────────────────────

/// One observation handed from a timer to its reporter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    /// Single successful call measured by a per-call timer
    Elapsed { site: CallSite, elapsed_secs: f64 },
    /// Summary of a full window
    Window {
        site: CallSite,
        stats: AggregationResult,
    },
    /// The wrapped function failed; nothing was measured
    Failure {
        site: CallSite,
        windowed: bool,
        message: String,
    },
}

impl Report {
    pub fn site(&self) -> &CallSite {
        match self {
            Self::Elapsed { site, .. } | Self::Window { site, .. } | Self::Failure { site, .. } => {
                site
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

/// Plain-text rendering of a report with `decimal_places` digits for every
/// duration.
pub fn format_report(report: &Report, decimal_places: usize) -> String {
    let dp = decimal_places;
    match report {
        Report::Elapsed { site, elapsed_secs } => {
            format!("Elapsed Time for {site}: {elapsed_secs:.dp$} sec")
        }
        Report::Window { site, stats } => match &stats.percentiles {
            None => format!(
                "Elapsed Time for {site} - {} calls - Min:{:.dp$} / Avg:{:.dp$} / Max:{:.dp$}",
                stats.calls, stats.min, stats.average, stats.max
            ),
            Some(set) => {
                let ladder = set
                    .entries()
                    .iter()
                    .map(|(label, value)| format!("{label}:{value:.dp$}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!(
                    "Elapsed Time for {site} {} calls - Min:{:.dp$} Avg:{:.dp$} Max:{:.dp$} - {ladder}",
                    stats.calls, stats.min, stats.average, stats.max
                )
            }
        },
        Report::Failure {
            site,
            windowed,
            message,
        } => {
            let tag = if *windowed {
                "AVERAGE_ELAPSED_TIME_EXCEPTION"
            } else {
                "ELAPSED_TIME_EXCEPTION"
            };
            format!("[{tag}] {site}: {message}")
        }
    }
}

// ─── Reporter trait ──────────────────────────────────────────────

/// Destination for timer output. Called synchronously on the instrumented
/// call path, so implementations should be quick.
pub trait Reporter: Send + Sync {
    fn report(&self, report: &Report);

    /// Like [`report`](Reporter::report), carrying the digit count the timer
    /// was configured with. Sinks that render text should honour it.
    fn report_with_precision(&self, report: &Report, decimal_places: usize) {
        let _ = decimal_places;
        self.report(report);
    }
}

// ─── Console ─────────────────────────────────────────────────────

const RESET: &str = "\x1b[0m";

/// Coloured one-liners on stdout.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    decimal_places: usize,
    colour: bool,
}

impl ConsoleReporter {
    pub fn new(decimal_places: usize) -> Self {
        Self {
            decimal_places,
            colour: true,
        }
    }

    pub fn without_colour(mut self) -> Self {
        self.colour = false;
        self
    }

    fn colour_for(report: &Report) -> &'static str {
        match report {
            Report::Elapsed { .. } => "\x1b[33m", // yellow
            Report::Window { stats, .. } if stats.percentiles.is_some() => {
                "\x1b[38;2;255;140;0;1m" // bold orange
            }
            Report::Window { .. } => "\x1b[32;1m", // bold green
            Report::Failure { .. } => "\x1b[91m",  // bright red
        }
    }

    /// The exact line `report` would print.
    pub fn render(&self, report: &Report) -> String {
        self.render_with(report, self.decimal_places)
    }

    /// As [`render`](Self::render), with `decimal_places` overriding this
    /// reporter's own setting.
    pub fn render_with(&self, report: &Report, decimal_places: usize) -> String {
        let line = format_report(report, decimal_places);
        if self.colour {
            format!("{}{line}{RESET}", Self::colour_for(report))
        } else {
            line
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(DEFAULT_DECIMAL_PLACES)
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, report: &Report) {
        println!("{}", self.render(report));
    }

    fn report_with_precision(&self, report: &Report, decimal_places: usize) {
        println!("{}", self.render_with(report, decimal_places));
    }
}

// ─── tracing ─────────────────────────────────────────────────────

/// Emits each report as a structured `tracing` event under the
/// `elapsed_timer` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, report: &Report) {
        match report {
            Report::Elapsed { site, elapsed_secs } => {
                tracing::info!(
                    target: "elapsed_timer",
                    function = %site.function,
                    arguments = site.arguments.as_deref(),
                    elapsed_secs,
                    "call timed"
                );
            }
            Report::Window { site, stats } => {
                let p = stats.percentiles;
                tracing::info!(
                    target: "elapsed_timer",
                    function = %site.function,
                    calls = stats.calls,
                    min = stats.min,
                    avg = stats.average,
                    max = stats.max,
                    p50 = p.map(|s| s.p50),
                    p75 = p.map(|s| s.p75),
                    p90 = p.map(|s| s.p90),
                    p99 = p.map(|s| s.p99),
                    "window complete"
                );
            }
            Report::Failure { site, message, .. } => {
                tracing::warn!(
                    target: "elapsed_timer",
                    function = %site.function,
                    arguments = site.arguments.as_deref(),
                    error = %message,
                    "timed call failed"
                );
            }
        }
    }
}

// ─── JSON lines ──────────────────────────────────────────────────

#[derive(Serialize)]
struct Stamped<'a> {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    report: &'a Report,
}

/// Writes one JSON object per report, stamped with the UTC time of emission.
pub struct JsonReporter<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> Reporter for JsonReporter<W> {
    fn report(&self, report: &Report) {
        let stamped = Stamped {
            timestamp: Utc::now(),
            report,
        };
        let mut out = self.out.lock();
        let written = serde_json::to_writer(&mut *out, &stamped)
            .map_err(std::io::Error::from)
            .and_then(|_| out.write_all(b"\n"));
        if let Err(e) = written {
            tracing::warn!(error = %e, "failed to write timer report");
        }
    }
}

// ─── In-memory ───────────────────────────────────────────────────

/// Keeps every report, plus its plain-text rendering. Handy for tests and
/// for callers that render later.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    reports: Mutex<Vec<Report>>,
    lines: Mutex<Vec<String>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything received so far.
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().clone()
    }

    /// Drain everything received so far.
    pub fn take(&self) -> Vec<Report> {
        self.lines.lock().clear();
        std::mem::take(&mut *self.reports.lock())
    }

    /// Uncoloured text of every report, at the precision it arrived with.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, report: &Report) {
        self.report_with_precision(report, DEFAULT_DECIMAL_PLACES);
    }

    fn report_with_precision(&self, report: &Report, decimal_places: usize) {
        self.lines.lock().push(format_report(report, decimal_places));
        self.reports.lock().push(report.clone());
    }
}
