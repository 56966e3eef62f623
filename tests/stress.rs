//! Stress tests - capacity edges, slot churn, and deep books.

use matchbook::{Engine, EngineError, Event, Price, Side, PRICE_SCALE};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn px(human: i64) -> Price {
    human * PRICE_SCALE
}

#[test]
fn test_near_capacity_operation() {
    const CAPACITY: u32 = 10_000;
    let mut engine = Engine::new(CAPACITY);

    // Fill to 95% capacity with non-crossing orders: bids below 90, asks
    // above 110.
    let target = (CAPACITY as f64 * 0.95) as u64;
    for i in 0..target {
        let (side, price) = if i % 2 == 0 {
            (Side::Buy, px(80) + (i as i64 % 100) * PRICE_SCALE / 10)
        } else {
            (Side::Sell, px(110) + (i as i64 % 100) * PRICE_SCALE / 10)
        };
        engine
            .process_new_order(i + 1, side, price, 100)
            .expect("within capacity");
    }

    assert_eq!(engine.order_count(), target as usize);
    assert!(!engine.is_exhausted());
    assert!(engine.check_invariants());
}

#[test]
fn test_exhaustion_surfaces_and_halts() {
    let mut engine = Engine::new(3);

    for id in 1..=3 {
        engine
            .process_new_order(id, Side::Buy, px(90), 10)
            .expect("within capacity");
    }

    let err = engine.process_new_order(4, Side::Buy, px(89), 10);
    assert_eq!(err, Err(EngineError::ArenaExhausted));
    assert!(engine.is_exhausted());

    // The failed command's ack was logged (log-first, allocate-second);
    // later new orders are refused before logging anything.
    let acks = engine
        .event_log()
        .iter()
        .filter(|event| matches!(event, Event::NewOrderAck { .. }))
        .count();
    assert_eq!(acks, 4);

    let err = engine.process_new_order(5, Side::Buy, px(88), 10);
    assert_eq!(err, Err(EngineError::ArenaExhausted));
    assert_eq!(engine.event_log().len(), 4);

    // Cancels keep working after exhaustion.
    engine.process_cancel(1);
    assert_eq!(engine.order_count(), 2);
}

#[test]
fn test_slot_churn_reuses_pool() {
    // A pool of 2 survives thousands of place/cancel cycles because every
    // cancel returns its slot to the free list.
    let mut engine = Engine::new(2);

    for round in 0..10_000u64 {
        let id = round + 1;
        engine
            .process_new_order(id, Side::Sell, px(100), 10)
            .expect("slot recycled");
        engine.process_cancel(id);
    }

    assert_eq!(engine.order_count(), 0);
    assert!(!engine.is_exhausted());
    assert_eq!(engine.event_log().len(), 20_000);
    assert!(engine.check_invariants());
}

#[test]
fn test_fill_churn_reuses_pool() {
    // Matching pairs also recycle slots: maker and taker both leave the
    // pool at the end of each round.
    let mut engine = Engine::new(2);

    for round in 0..5_000u64 {
        let maker = round * 2 + 1;
        let taker = round * 2 + 2;
        engine
            .process_new_order(maker, Side::Sell, px(100), 10)
            .expect("slot recycled");
        engine
            .process_new_order(taker, Side::Buy, px(100), 10)
            .expect("slot recycled");
    }

    assert_eq!(engine.order_count(), 0);
    assert!(engine.check_invariants());
}

#[test]
fn test_deep_sweep_thousand_levels() {
    let mut engine = Engine::new(2_000);

    for i in 0..1_000i64 {
        engine
            .process_new_order(i as u64 + 1, Side::Sell, px(100) + i * 100, 1)
            .unwrap();
    }

    engine
        .process_new_order(5_000, Side::Buy, px(999_999), 1_500)
        .unwrap();

    let trades = engine
        .event_log()
        .iter()
        .filter(|event| matches!(event, Event::Trade { .. }))
        .count();
    assert_eq!(trades, 1_000);
    assert_eq!(engine.best_ask(), None);
    assert_eq!(engine.best_bid(), Some(px(999_999)));
    assert_eq!(engine.order_count(), 1);
    assert!(engine.check_invariants());
}

#[test]
fn test_single_level_contention() {
    // Hundreds of makers at one price, consumed by one giant taker: FIFO
    // must hold across the entire queue.
    const MAKERS: u64 = 500;
    let mut engine = Engine::new(MAKERS as u32 + 1);

    for id in 1..=MAKERS {
        engine.process_new_order(id, Side::Sell, px(100), 2).unwrap();
    }
    engine
        .process_new_order(9_999, Side::Buy, px(100), MAKERS * 2)
        .unwrap();

    let passives: Vec<u64> = engine
        .event_log()
        .iter()
        .filter_map(|event| match *event {
            Event::Trade { passive_id, .. } => Some(passive_id),
            _ => None,
        })
        .collect();
    assert_eq!(passives, (1..=MAKERS).collect::<Vec<u64>>());
    assert_eq!(engine.order_count(), 0);
    assert!(engine.check_invariants());
}

#[test]
fn test_random_churn_stays_consistent() {
    const OPS: usize = 20_000;
    let mut rng = ChaCha8Rng::seed_from_u64(0xC0FFEE);
    let mut engine = Engine::new(OPS as u32 + 1);

    let mut next_id = 1u64;
    let mut active: Vec<u64> = Vec::new();

    for _ in 0..OPS {
        if active.is_empty() || rng.gen_bool(0.55) {
            let id = next_id;
            next_id += 1;
            let side = if rng.gen_bool(0.5) {
                Side::Buy
            } else {
                Side::Sell
            };
            let price = rng.gen_range(9_900i64..10_100) * PRICE_SCALE / 100;
            let qty = rng.gen_range(1..100);
            engine.process_new_order(id, side, price, qty).unwrap();
            active.push(id);
        } else {
            let idx = rng.gen_range(0..active.len());
            engine.process_cancel(active.swap_remove(idx));
        }
    }

    assert!(engine.check_invariants());

    // Drain what rests and finish on an empty, still-consistent book.
    for side in [Side::Buy, Side::Sell] {
        for row in engine.depth(side, usize::MAX) {
            for id in engine.level_queue(side, row.price) {
                engine.process_cancel(id);
            }
        }
    }
    assert_eq!(engine.order_count(), 0);
    assert_eq!(engine.best_bid(), None);
    assert_eq!(engine.best_ask(), None);
    assert!(engine.check_invariants());
}

#[test]
fn test_extreme_prices_and_quantities() {
    let mut engine = Engine::new(16);

    engine
        .process_new_order(1, Side::Sell, Price::MAX, u64::MAX / 4)
        .unwrap();
    engine
        .process_new_order(2, Side::Buy, Price::MIN + 1, u64::MAX / 4)
        .unwrap();

    // Wildly apart: no cross, both rest.
    assert_eq!(engine.order_count(), 2);
    assert_eq!(engine.best_ask(), Some(Price::MAX));
    assert_eq!(engine.best_bid(), Some(Price::MIN + 1));
    assert!(engine.check_invariants());
}
