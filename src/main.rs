use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use elapsed_timer::{CallTimer, ConsoleReporter, Reporter, TimerConfig, TimerResult};

mod workload;

/// Calls per synchronous run, and tasks per asynchronous run
const CALLS: usize = 4_000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════╗");
    println!("║   ⏱   ELAPSED TIMER DEMO                         ║");
    println!("╚══════════════════════════════════════════════════╝");
    println!();

    if let Err(e) = run().await {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}

async fn run() -> TimerResult<()> {
    let base = TimerConfig::default();
    let console: Arc<dyn Reporter> = Arc::new(ConsoleReporter::new(base.decimal_places));
    let average = base.clone().with_window_size(1000);
    let percentiles = average.clone().with_percentiles(true);
    let mut rng = StdRng::seed_from_u64(42);

    // ── 1. Per-call timer ────────────────────────────────────────
    let roots = CallTimer::elapsed("roots_int2ip", &base, console.clone());
    let roots_int2ip = roots.wrap(workload::roots_int2ip);
    for _ in 0..4 {
        roots_int2ip(workload::random_ip(&mut rng));
    }

    println!("{}", "- ".repeat(40));

    // ── 2. Windowed timers, synchronous ──────────────────────────
    let ipaddress = CallTimer::windowed("ipaddress_int2ip", &average, console.clone())?;
    let ipaddress_int2ip = ipaddress.wrap(workload::ipaddress_int2ip);
    for _ in 0..CALLS {
        ipaddress_int2ip(workload::random_ip(&mut rng));
    }

    let packed = CallTimer::windowed("packed_int2ip", &percentiles, console.clone())?;
    let packed_int2ip = packed.wrap(workload::packed_int2ip);
    for _ in 0..CALLS {
        packed_int2ip(workload::random_ip(&mut rng));
    }

    println!("{}", "- ".repeat(40));

    // ── 3. Windowed timers, concurrent tasks ─────────────────────
    let ipaddress = Arc::new(CallTimer::windowed(
        "async_ipaddress_int2ip",
        &average,
        console.clone(),
    )?);
    workload::run_concurrent(ipaddress, CALLS, 1, workload::ipaddress_int2ip).await;

    let packed = Arc::new(CallTimer::windowed(
        "async_packed_int2ip",
        &percentiles,
        console.clone(),
    )?);
    workload::run_concurrent(packed, CALLS, 2, workload::packed_int2ip).await;

    println!("{}", "- ".repeat(40));

    // ── 4. Failures are reported, not raised ─────────────────────
    let parser = CallTimer::elapsed("ip2int", &base.clone().with_arguments(true), console);
    let ip2int = parser.wrap_fallible(workload::ip2int);
    for text in ["10.0.0.1", "10.0.0.256"] {
        match ip2int(text) {
            Ok(Some(value)) => println!("  {text} → {value}"),
            Ok(None) => println!("  {text} → (no result)"),
            Err(e) => println!("  {text} → error: {e}"),
        }
    }

    Ok(())
}
