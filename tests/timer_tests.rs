use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use elapsed_timer::{
    percentile, CallTimer, ExtremaPolicy, FailurePolicy, ManualClock, MemoryReporter, Report,
    TimerConfig, TimerError, WindowedAggregator,
};

// ─── Helpers ─────────────────────────────────────────────────────

fn windowed_timer(config: TimerConfig) -> (CallTimer, Arc<MemoryReporter>, ManualClock) {
    let reporter = Arc::new(MemoryReporter::new());
    let clock = ManualClock::new();
    let timer = CallTimer::windowed("subject", &config, reporter.clone())
        .unwrap()
        .with_clock(Arc::new(clock.clone()));
    (timer, reporter, clock)
}

fn window_stats(report: &Report) -> &elapsed_timer::AggregationResult {
    match report {
        Report::Window { stats, .. } => stats,
        other => panic!("expected window report, got {other:?}"),
    }
}

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values
}

// ─── Scenarios ───────────────────────────────────────────────────

#[test]
fn failing_calls_never_fill_a_window() {
    let (timer, reporter, _clock) = windowed_timer(TimerConfig::default().with_window_size(5));

    for _ in 0..5 {
        let out: Result<Option<()>, &str> = timer.try_call(|| Err("unavailable"));
        assert_eq!(out, Ok(None));
    }

    let reports = reporter.take();
    assert_eq!(reports.len(), 5);
    assert!(reports.iter().all(Report::is_failure));
    assert_eq!(timer.pending(), 0);
}

#[test]
fn failures_interleaved_with_successes_do_not_count() {
    let (timer, reporter, clock) = windowed_timer(TimerConfig::default().with_window_size(2));

    timer.call(|| clock.advance(Duration::from_millis(10)));
    let _: Result<Option<()>, String> = timer.try_call(|| Err("nope".into()));
    assert_eq!(timer.pending(), 1);
    timer.call(|| clock.advance(Duration::from_millis(30)));

    let reports = reporter.take();
    assert_eq!(reports.len(), 2);
    assert!(reports[0].is_failure());
    let stats = window_stats(&reports[1]);
    assert!((stats.average - 0.02).abs() < 1e-12);
}

#[test]
fn propagate_policy_returns_the_error() {
    let config = TimerConfig::default()
        .with_window_size(3)
        .with_failure_policy(FailurePolicy::Propagate);
    let (timer, reporter, _clock) = windowed_timer(config);

    let out = timer.try_call_with("abc", |s| s.parse::<u16>());
    assert!(out.is_err());
    assert_eq!(reporter.len(), 1);
}

#[test]
fn lifetime_extrema_leak_into_later_windows() {
    let (timer, reporter, clock) = windowed_timer(TimerConfig::default().with_window_size(2));
    for ms in [100, 1, 5, 6] {
        timer.call(|| clock.advance(Duration::from_millis(ms)));
    }
    let reports = reporter.take();
    let second = window_stats(&reports[1]);
    assert!((second.max - 0.1).abs() < 1e-12);
    assert!((second.min - 0.001).abs() < 1e-12);
}

#[test]
fn per_window_extrema_stay_local() {
    let config = TimerConfig::default()
        .with_window_size(2)
        .with_extrema_policy(ExtremaPolicy::PerWindow);
    let (timer, reporter, clock) = windowed_timer(config);
    for ms in [100, 1, 5, 6] {
        timer.call(|| clock.advance(Duration::from_millis(ms)));
    }
    let reports = reporter.take();
    let second = window_stats(&reports[1]);
    assert!((second.max - 0.006).abs() < 1e-12);
    assert!((second.min - 0.005).abs() < 1e-12);
}

#[test]
fn console_lines_follow_configured_precision() {
    let reporter = Arc::new(MemoryReporter::new());
    let config = TimerConfig::default().with_window_size(2).with_decimal_places(3);
    let clock = ManualClock::new();
    let timer = CallTimer::windowed("f", &config, reporter.clone())
        .unwrap()
        .with_clock(Arc::new(clock.clone()));

    for ms in [1, 3] {
        timer.call(|| clock.advance(Duration::from_millis(ms)));
    }

    let lines = reporter.lines();
    assert_eq!(
        lines,
        vec!["Elapsed Time for f() - 2 calls - Min:0.001 / Avg:0.002 / Max:0.003".to_string()]
    );
    let console = elapsed_timer::ConsoleReporter::default().without_colour();
    assert_eq!(console.render_with(&reporter.reports()[0], 3), lines[0]);
}

#[test]
fn zero_window_fails_fast() {
    let err = CallTimer::windowed(
        "bad",
        &TimerConfig::default().with_window_size(0),
        Arc::new(MemoryReporter::new()),
    )
    .unwrap_err();
    assert!(matches!(err, TimerError::InvalidWindowSize(0)));
}

#[test]
fn threads_sharing_a_timer_get_one_summary_per_window() {
    let reporter = Arc::new(MemoryReporter::new());
    let config = TimerConfig::default().with_window_size(50).with_percentiles(true);
    let timer = Arc::new(CallTimer::windowed("shared", &config, reporter.clone()).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let timer = timer.clone();
            std::thread::spawn(move || {
                for i in 0..100u32 {
                    timer.call(|| i.wrapping_mul(t));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let reports = reporter.take();
    assert_eq!(reports.len(), 8);
    for report in &reports {
        let stats = window_stats(report);
        assert_eq!(stats.calls, 50);
        assert!(stats.percentiles.is_some());
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_tasks_share_a_timer() {
    let reporter = Arc::new(MemoryReporter::new());
    let config = TimerConfig::default().with_window_size(25);
    let timer = Arc::new(CallTimer::windowed("tasks", &config, reporter.clone()).unwrap());

    let mut set = tokio::task::JoinSet::new();
    for i in 0..100u64 {
        let timer = timer.clone();
        set.spawn(async move {
            timer
                .call_async(async move {
                    tokio::time::sleep(Duration::from_millis(i % 3)).await;
                    i
                })
                .await
        });
    }
    let mut total = 0;
    while let Some(joined) = set.join_next().await {
        total += joined.unwrap();
    }

    assert_eq!(total, (0..100).sum::<u64>());
    assert_eq!(reporter.len(), 4);
}

#[tokio::test]
async fn async_args_are_forwarded_and_captured() {
    let reporter = Arc::new(MemoryReporter::new());
    let config = TimerConfig::default().with_arguments(true);
    let timer = CallTimer::elapsed("fetch", &config, reporter.clone());

    let out = timer
        .try_call_async_with((3u8, "id"), |(n, key)| async move {
            Ok::<_, String>(format!("{key}-{n}"))
        })
        .await;
    assert_eq!(out, Ok(Some("id-3".to_string())));
    assert_eq!(reporter.take()[0].site().to_string(), "fetch(3, \"id\")");
}

// ─── Properties ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn one_summary_every_window_with_exact_average(
        size in 1usize..20,
        steps in prop::collection::vec(0u64..5_000, 0..120),
    ) {
        let (timer, reporter, clock) = windowed_timer(TimerConfig::default().with_window_size(size));
        for &us in &steps {
            timer.call(|| clock.advance(Duration::from_micros(us)));
        }

        let reports = reporter.take();
        prop_assert_eq!(reports.len(), steps.len() / size);
        prop_assert_eq!(timer.pending(), steps.len() % size);

        for (report, chunk) in reports.iter().zip(steps.chunks_exact(size)) {
            let stats = window_stats(report);
            let expected = chunk
                .iter()
                .map(|&us| Duration::from_micros(us).as_secs_f64())
                .sum::<f64>()
                / size as f64;
            prop_assert_eq!(stats.calls, size);
            prop_assert!((stats.average - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn percentile_stays_within_sample_range(
        values in prop::collection::vec(0.0f64..10.0, 1..64),
        p in 0.0f64..=100.0,
    ) {
        let sorted = sorted(values);
        let v = percentile(&sorted, p).unwrap();
        let lo = sorted[0];
        let hi = sorted[sorted.len() - 1];
        prop_assert!(v >= lo - 1e-12 && v <= hi + 1e-12);
    }

    #[test]
    fn percentile_boundaries_are_the_extremes(values in prop::collection::vec(-1e6f64..1e6, 1..64)) {
        let sorted = sorted(values);
        prop_assert_eq!(percentile(&sorted, 0.0).unwrap(), sorted[0]);
        prop_assert_eq!(percentile(&sorted, 100.0).unwrap(), sorted[sorted.len() - 1]);
    }

    #[test]
    fn identical_windows_give_identical_summaries(
        values in prop::collection::vec(0.0f64..1.0, 1..40),
    ) {
        let mut agg = WindowedAggregator::new(values.len(), true, ExtremaPolicy::Lifetime).unwrap();
        let mut first = None;
        for &v in &values {
            first = agg.record(v);
        }
        let mut second = None;
        for &v in &values {
            second = agg.record(v);
        }
        prop_assert_eq!(first, second);
    }

    #[test]
    fn out_of_range_percentiles_are_rejected(p in prop_oneof![-1e6f64..-1e-9, 100.000001f64..1e6]) {
        prop_assert!(matches!(percentile(&[1.0], p), Err(TimerError::InvalidPercentile(_))));
    }
}
