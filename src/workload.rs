use std::net::Ipv4Addr;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use elapsed_timer::CallTimer;

// ─── Constants ───────────────────────────────────────────────────

/// 1.0.0.0 .. 223.255.255.255, the unicast range the demo draws from.
pub const IP_LOW: u32 = 16_777_216;
pub const IP_HIGH: u32 = 3_758_096_383;

// ─── Conversions under test ──────────────────────────────────────

/// Shift-and-mask conversion.
pub fn roots_int2ip(ip: u32) -> String {
    format!(
        "{}.{}.{}.{}",
        (ip >> 24) & 0xFF,
        (ip >> 16) & 0xFF,
        (ip >> 8) & 0xFF,
        ip & 0xFF
    )
}

/// Through the standard library address type.
pub fn ipaddress_int2ip(ip: u32) -> String {
    Ipv4Addr::from(ip).to_string()
}

/// Through big-endian packing.
pub fn packed_int2ip(ip: u32) -> String {
    let [a, b, c, d] = ip.to_be_bytes();
    format!("{a}.{b}.{c}.{d}")
}

/// Inverse conversion, fails on malformed input.
pub fn ip2int(text: &str) -> Result<u32, std::net::AddrParseError> {
    text.parse::<Ipv4Addr>().map(u32::from)
}

pub fn random_ip(rng: &mut StdRng) -> u32 {
    rng.gen_range(IP_LOW..IP_HIGH)
}

// ─── Async driver ────────────────────────────────────────────────

/// Spawns `tasks` Tokio tasks, each running one timed async conversion, and
/// waits for all of them.
pub async fn run_concurrent(
    timer: Arc<CallTimer>,
    tasks: usize,
    seed: u64,
    convert: fn(u32) -> String,
) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut handles = Vec::with_capacity(tasks);

    for _ in 0..tasks {
        let timer = timer.clone();
        let ip = random_ip(&mut rng);

        handles.push(tokio::spawn(async move {
            timer
                .call_async(async move {
                    tokio::task::yield_now().await;
                    convert(ip)
                })
                .await
        }));
    }

    for h in handles {
        if let Err(e) = h.await {
            tracing::warn!(error = %e, "conversion task aborted");
        }
    }
}
