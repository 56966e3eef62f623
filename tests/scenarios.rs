//! Golden scenarios - exact event sequences and terminal book states for
//! the canonical command scripts (prices in human form, scaled by 10,000).

use matchbook::{Engine, Event, LevelView, Price, Side, PRICE_SCALE};

fn px(human: i64) -> Price {
    human * PRICE_SCALE
}

#[test]
fn test_simple_fill() {
    let mut engine = Engine::new(16);

    engine.process_new_order(1, Side::Sell, px(100), 10).unwrap();
    engine.process_new_order(2, Side::Buy, px(100), 10).unwrap();

    assert_eq!(engine.best_bid(), None);
    assert_eq!(engine.best_ask(), None);
    assert_eq!(engine.order_count(), 0);
    assert_eq!(
        engine.event_log(),
        &[
            Event::NewOrderAck {
                ts: 1,
                id: 1,
                side: Side::Sell,
                price: 1_000_000,
                qty: 10,
            },
            Event::NewOrderAck {
                ts: 2,
                id: 2,
                side: Side::Buy,
                price: 1_000_000,
                qty: 10,
            },
            Event::Trade {
                ts: 3,
                passive_id: 1,
                aggressive_id: 2,
                price: 1_000_000,
                qty: 10,
            },
        ]
    );
    assert!(engine.check_invariants());
}

#[test]
fn test_partial_fill() {
    let mut engine = Engine::new(16);

    engine.process_new_order(1, Side::Sell, px(100), 10).unwrap();
    engine.process_new_order(2, Side::Buy, px(100), 5).unwrap();

    assert_eq!(engine.best_ask(), Some(px(100)));
    assert_eq!(engine.best_bid(), None);
    assert_eq!(
        engine.depth(Side::Sell, usize::MAX),
        vec![LevelView {
            price: px(100),
            total_volume: 5,
            order_count: 1,
        }]
    );

    let trades: Vec<&Event> = engine
        .event_log()
        .iter()
        .filter(|event| matches!(event, Event::Trade { .. }))
        .collect();
    assert_eq!(
        trades,
        vec![&Event::Trade {
            ts: 3,
            passive_id: 1,
            aggressive_id: 2,
            price: px(100),
            qty: 5,
        }]
    );
    assert!(engine.check_invariants());
}

#[test]
fn test_multi_level_sweep() {
    let mut engine = Engine::new(16);

    engine.process_new_order(1, Side::Sell, px(100), 10).unwrap();
    engine.process_new_order(2, Side::Sell, px(101), 10).unwrap();
    engine.process_new_order(3, Side::Sell, px(102), 10).unwrap();
    engine.process_new_order(4, Side::Buy, px(105), 25).unwrap();

    assert_eq!(engine.best_ask(), Some(px(102)));
    assert_eq!(engine.best_bid(), None);
    assert_eq!(
        engine.depth(Side::Sell, usize::MAX),
        vec![LevelView {
            price: px(102),
            total_volume: 5,
            order_count: 1,
        }]
    );

    let trades: Vec<(u64, Price, u64)> = engine
        .event_log()
        .iter()
        .filter_map(|event| match *event {
            Event::Trade {
                passive_id,
                price,
                qty,
                ..
            } => Some((passive_id, price, qty)),
            _ => None,
        })
        .collect();
    assert_eq!(
        trades,
        vec![
            (1, px(100), 10),
            (2, px(101), 10),
            (3, px(102), 5),
        ]
    );
    assert!(engine.check_invariants());
}

#[test]
fn test_fifo_within_level() {
    let mut engine = Engine::new(32);

    for id in 1..=10 {
        engine.process_new_order(id, Side::Sell, px(100), 10).unwrap();
    }
    engine.process_new_order(100, Side::Buy, px(100), 100).unwrap();

    let passives: Vec<u64> = engine
        .event_log()
        .iter()
        .filter_map(|event| match *event {
            Event::Trade { passive_id, .. } => Some(passive_id),
            _ => None,
        })
        .collect();
    assert_eq!(passives, (1..=10).collect::<Vec<u64>>());
    assert_eq!(engine.order_count(), 0);
    assert!(engine.check_invariants());
}

#[test]
fn test_cancel() {
    let mut engine = Engine::new(16);

    engine.process_new_order(1, Side::Sell, px(100), 10).unwrap();
    engine.process_cancel(1);

    assert_eq!(engine.best_ask(), None);
    assert_eq!(engine.order_count(), 0);
    assert_eq!(
        engine.event_log().last(),
        Some(&Event::CancelAck { ts: 2, id: 1 })
    );
    assert!(engine.check_invariants());
}

#[test]
fn test_cancel_unknown() {
    let mut engine = Engine::new(16);

    engine.process_cancel(999);

    assert_eq!(engine.best_bid(), None);
    assert_eq!(engine.best_ask(), None);
    assert_eq!(engine.order_count(), 0);
    assert_eq!(engine.event_log(), &[Event::CancelAck { ts: 1, id: 999 }]);
    assert!(engine.check_invariants());
}

// ============================================================================
// Boundary behaviors
// ============================================================================

#[test]
fn test_exact_consume_leaves_no_rest() {
    let mut engine = Engine::new(16);

    // Three makers totalling 60 at one level; a taker for exactly 60.
    engine.process_new_order(1, Side::Sell, px(100), 10).unwrap();
    engine.process_new_order(2, Side::Sell, px(100), 20).unwrap();
    engine.process_new_order(3, Side::Sell, px(100), 30).unwrap();
    engine.process_new_order(4, Side::Buy, px(100), 60).unwrap();

    // Level fully consumed and erased; the taker does not rest.
    assert_eq!(engine.best_ask(), None);
    assert_eq!(engine.best_bid(), None);
    assert_eq!(engine.order_count(), 0);
    assert!(engine.depth(Side::Sell, usize::MAX).is_empty());
    assert!(engine.check_invariants());
}

#[test]
fn test_equal_price_crosses() {
    let mut engine = Engine::new(16);

    // BUY at exactly the best ask matches.
    engine.process_new_order(1, Side::Sell, px(100), 10).unwrap();
    engine.process_new_order(2, Side::Buy, px(100), 10).unwrap();
    assert_eq!(engine.order_count(), 0);

    // SELL at exactly the best bid matches.
    engine.process_new_order(3, Side::Buy, px(99), 10).unwrap();
    engine.process_new_order(4, Side::Sell, px(99), 10).unwrap();
    assert_eq!(engine.order_count(), 0);
    assert!(engine.check_invariants());
}

#[test]
fn test_one_tick_away_does_not_cross() {
    let mut engine = Engine::new(16);

    engine.process_new_order(1, Side::Sell, px(100), 10).unwrap();
    engine
        .process_new_order(2, Side::Buy, px(100) - 1, 10)
        .unwrap();

    assert_eq!(engine.order_count(), 2);
    assert_eq!(engine.best_bid(), Some(px(100) - 1));
    assert_eq!(engine.best_ask(), Some(px(100)));
    assert!(engine.check_invariants());
}

#[test]
fn test_empty_book_queries() {
    let engine = Engine::new(16);

    assert_eq!(engine.best_bid(), None);
    assert_eq!(engine.best_ask(), None);
    assert!(engine.event_log().is_empty());
    assert!(engine.depth(Side::Buy, usize::MAX).is_empty());
    assert!(engine.depth(Side::Sell, usize::MAX).is_empty());
    assert!(engine.level_queue(Side::Buy, px(100)).is_empty());
}

#[test]
fn test_market_order_sweeps_whole_book() {
    let mut engine = Engine::new(16);

    engine.process_new_order(1, Side::Sell, px(100), 10).unwrap();
    engine.process_new_order(2, Side::Sell, px(105), 10).unwrap();
    engine.process_new_order(3, Side::Sell, px(110), 10).unwrap();

    // A limit priced through everything is a market order.
    engine
        .process_new_order(4, Side::Buy, px(999_999), 35)
        .unwrap();

    assert_eq!(engine.best_ask(), None);
    // Residual 5 rests at the aggressive limit price.
    assert_eq!(engine.best_bid(), Some(px(999_999)));
    assert_eq!(
        engine.depth(Side::Buy, usize::MAX),
        vec![LevelView {
            price: px(999_999),
            total_volume: 5,
            order_count: 1,
        }]
    );
    assert!(engine.check_invariants());
}
