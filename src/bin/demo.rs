//! Interactive demonstration of the matching engine.
//!
//! Builds a small book, sweeps it with an aggressive order, cancels a
//! resting order, fires a market order, then persists the event log and
//! verifies that replaying it reproduces the terminal state.

use std::path::PathBuf;

use clap::Parser;
use matchbook::{Engine, Price, Replayer, ReplayError, Side, PRICE_SCALE};

#[derive(Parser)]
#[command(name = "matchbook", about = "Deterministic matching engine demonstration")]
struct Cli {
    /// Arena and event-log pre-allocation capacity.
    #[arg(short, long, default_value_t = 1_000_000)]
    capacity: u32,

    /// Where to persist the event log.
    #[arg(short, long, default_value = "matchbook.log")]
    log_file: PathBuf,
}

/// Human decimal price to scaled fixed-point.
fn px(human: f64) -> Price {
    (human * PRICE_SCALE as f64).round() as Price
}

/// Scaled fixed-point back to human decimal, for display only.
fn human(price: Price) -> f64 {
    price as f64 / PRICE_SCALE as f64
}

fn print_book(engine: &Engine) {
    println!("  {:>10} {:>12} {:>7}", "price", "volume", "orders");
    println!("  ---------------------------------");
    for row in engine.depth(Side::Sell, 5).iter().rev() {
        println!(
            "  {:>10.2} {:>12} {:>7}  ASK",
            human(row.price),
            row.total_volume,
            row.order_count
        );
    }
    for row in engine.depth(Side::Buy, 5) {
        println!(
            "  {:>10.2} {:>12} {:>7}  BID",
            human(row.price),
            row.total_volume,
            row.order_count
        );
    }
    match (engine.best_bid(), engine.best_ask()) {
        (Some(bid), Some(ask)) => println!(
            "  best bid {:.2} / best ask {:.2} (spread {:.2})",
            human(bid),
            human(ask),
            human(ask - bid)
        ),
        (Some(bid), None) => println!("  best bid {:.2} / no asks", human(bid)),
        (None, Some(ask)) => println!("  no bids / best ask {:.2}", human(ask)),
        (None, None) => println!("  book is empty"),
    }
    println!();
}

fn main() -> Result<(), ReplayError> {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut engine = Engine::new(cli.capacity);
    engine.warm_up();

    println!("========== Scenario 1: building the book ==========\n");
    println!("Adding sell orders...");
    engine.process_new_order(1, Side::Sell, px(101.0), 50)?;
    engine.process_new_order(2, Side::Sell, px(100.5), 30)?;
    engine.process_new_order(3, Side::Sell, px(100.0), 20)?;
    print_book(&engine);

    println!("Adding buy orders...");
    engine.process_new_order(4, Side::Buy, px(99.0), 40)?;
    engine.process_new_order(5, Side::Buy, px(99.5), 35)?;
    print_book(&engine);

    println!("========== Scenario 2: aggressive order ==========\n");
    println!("Aggressive buy sweeping multiple levels...");
    engine.process_new_order(6, Side::Buy, px(101.5), 80)?;
    print_book(&engine);

    println!("========== Scenario 3: cancellation ==========\n");
    println!("Cancelling order 4...");
    engine.process_cancel(4);
    print_book(&engine);

    println!("========== Scenario 4: market order ==========\n");
    println!("Market buy (price through the whole book)...");
    engine.process_new_order(7, Side::Buy, px(999_999.0), 25)?;
    print_book(&engine);

    println!("========== Event log ==========\n");
    let events = engine.event_log();
    println!("Total events: {}", events.len());
    println!("Recent events:");
    let tail = events.len().saturating_sub(5);
    for event in &events[tail..] {
        println!("  {event}");
    }
    println!();

    println!("========== Deterministic replay ==========\n");
    Replayer::save(events, &cli.log_file)?;
    println!("Saved event log to {}", cli.log_file.display());

    let replayed = Replayer::load_and_replay(&cli.log_file)?;
    println!("Replayed {} events from disk\n", events.len());

    let identical = replayed.event_log() == engine.event_log()
        && replayed.best_bid() == engine.best_bid()
        && replayed.best_ask() == engine.best_ask()
        && replayed.depth(Side::Buy, usize::MAX) == engine.depth(Side::Buy, usize::MAX)
        && replayed.depth(Side::Sell, usize::MAX) == engine.depth(Side::Sell, usize::MAX);
    println!(
        "Replay verification: {}",
        if identical { "PASSED" } else { "FAILED" }
    );
    println!(
        "Invariant check:     {}",
        if engine.check_invariants() && replayed.check_invariants() {
            "PASSED"
        } else {
            "FAILED"
        }
    );

    Ok(())
}
