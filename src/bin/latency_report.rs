//! Per-command latency report using an HDR histogram.
//!
//! Pre-generates the whole command stream so the measured loop contains no
//! RNG or allocation, warms up the pool and the branch predictor, then
//! times every command individually and prints percentiles.

use std::time::Instant;

use hdrhistogram::Histogram;
use matchbook::{Engine, Price, Qty, Side, PRICE_SCALE};

const WARMUP_OPS: usize = 10_000;
const MEASURED_OPS: usize = 1_000_000;

#[derive(Clone, Copy)]
enum Cmd {
    Place {
        id: u64,
        side: Side,
        price: Price,
        qty: Qty,
    },
    Cancel {
        id: u64,
    },
}

/// Deterministic stream: resting bids and asks in two non-crossing bands,
/// every 8th command a crossing order, every 16th a cancel of an earlier
/// resting order. Keeps all three hot paths (rest, sweep, cancel) in play.
fn generate_commands(count: usize, first_id: u64) -> Vec<Cmd> {
    let mut commands = Vec::with_capacity(count);
    for i in 0..count {
        let id = first_id + i as u64;
        let cmd = if i % 16 == 15 {
            Cmd::Cancel {
                id: first_id + (i as u64).saturating_sub(14),
            }
        } else if i % 8 == 7 {
            // Crossing buy: takes out whatever rests at the ask band edge.
            Cmd::Place {
                id,
                side: Side::Buy,
                price: 101 * PRICE_SCALE,
                qty: 50,
            }
        } else if i % 2 == 0 {
            Cmd::Place {
                id,
                side: Side::Buy,
                price: (99 * PRICE_SCALE) - (i as i64 % 100) * 100,
                qty: 10,
            }
        } else {
            Cmd::Place {
                id,
                side: Side::Sell,
                price: (101 * PRICE_SCALE) + (i as i64 % 100) * 100,
                qty: 10,
            }
        };
        commands.push(cmd);
    }
    commands
}

fn apply(engine: &mut Engine, cmd: Cmd) {
    match cmd {
        Cmd::Place {
            id,
            side,
            price,
            qty,
        } => {
            let _ = engine.process_new_order(id, side, price, qty);
        }
        Cmd::Cancel { id } => engine.process_cancel(id),
    }
}

fn main() {
    println!("Preparing latency benchmark...");

    let capacity = (WARMUP_OPS + MEASURED_OPS + 1) as u32;
    let mut engine = Engine::new(capacity);
    engine.warm_up();

    let mut histogram =
        Histogram::<u64>::new_with_bounds(1, 10_000_000, 3).expect("histogram bounds");

    println!("Pre-generating {} commands...", WARMUP_OPS + MEASURED_OPS);
    let warmup = generate_commands(WARMUP_OPS, 1);
    let measured = generate_commands(MEASURED_OPS, WARMUP_OPS as u64 + 1);

    println!("Warming up ({WARMUP_OPS} ops)...");
    for &cmd in &warmup {
        apply(&mut engine, cmd);
    }

    println!("Measuring {MEASURED_OPS} ops...");
    let run_start = Instant::now();
    for &cmd in &measured {
        let start = Instant::now();
        apply(&mut engine, cmd);
        let nanos = start.elapsed().as_nanos() as u64;
        histogram.saturating_record(nanos.max(1));
    }
    let total = run_start.elapsed();

    println!();
    println!("Latency (ns/command):");
    println!("  p50:    {:>8}", histogram.value_at_quantile(0.50));
    println!("  p90:    {:>8}", histogram.value_at_quantile(0.90));
    println!("  p99:    {:>8}", histogram.value_at_quantile(0.99));
    println!("  p99.9:  {:>8}", histogram.value_at_quantile(0.999));
    println!("  max:    {:>8}", histogram.max());
    println!();
    println!(
        "Throughput: {:.0} commands/sec",
        MEASURED_OPS as f64 / total.as_secs_f64()
    );
    println!("Resting orders at end: {}", engine.order_count());
    println!("Events logged: {}", engine.event_log().len());
}
