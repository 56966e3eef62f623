//! Matching engine - the command state machine.
//!
//! Single-threaded and strictly deterministic: commands are applied one at a
//! time, every observable event advances the logical clock by exactly 1
//! before being appended to the log, and matching follows price-time
//! priority (best level first, FIFO within a level). Given the same command
//! sequence, the engine produces the same event log and terminal book state,
//! bit for bit.

use rustc_hash::FxHashMap;
use tracing::error;

use crate::arena::{Arena, Order, OrderHandle, NULL_HANDLE};
use crate::book::{LevelView, SideBook};
use crate::error::EngineError;
use crate::events::{Event, OrderId, Price, Qty, Side, Timestamp};

/// The matching engine for a single instrument.
///
/// Owns the order arena, both side books, the order-id index, and the
/// append-only event log. No aliasing: every collaborator refers to orders
/// through arena handles whose lifetime the engine alone controls.
pub struct Engine {
    arena: Arena,
    bids: SideBook,
    asks: SideBook,

    /// Order-id -> arena handle for exactly the currently-live orders.
    /// Aggressive orders are inserted before matching and removed again on
    /// full fill, so mid-command the entry can refer to an order that never
    /// rests.
    index: FxHashMap<OrderId, OrderHandle>,

    /// Append-only event log, by value.
    event_log: Vec<Event>,

    /// Logical clock; advanced by 1 before each event is recorded, so
    /// timestamps within one command are monotone but not uniformly spaced.
    current_time: Timestamp,

    /// Set once the pool runs dry; new-order commands then fail fast.
    exhausted: bool,
}

impl Engine {
    /// Construct an engine whose arena holds `capacity` live orders; the
    /// event log and index are pre-reserved to the same capacity.
    pub fn new(capacity: u32) -> Self {
        Self {
            arena: Arena::new(capacity),
            bids: SideBook::new(Side::Buy),
            asks: SideBook::new(Side::Sell),
            index: FxHashMap::with_capacity_and_hasher(capacity as usize, Default::default()),
            event_log: Vec::with_capacity(capacity as usize),
            current_time: 0,
            exhausted: false,
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Process a new limit order - the hot path.
    ///
    /// Sequence: validate, log the acknowledgement, allocate, index, match
    /// against the opposite side (possibly sweeping several levels), then
    /// rest any residual quantity at `price` on the own side. A "market"
    /// order is simply a limit order priced through the whole opposing book.
    pub fn process_new_order(
        &mut self,
        id: OrderId,
        side: Side,
        price: Price,
        qty: Qty,
    ) -> Result<(), EngineError> {
        if self.exhausted {
            return Err(EngineError::ArenaExhausted);
        }
        if qty == 0 {
            return Err(EngineError::InvalidQuantity);
        }
        if self.index.contains_key(&id) {
            return Err(EngineError::DuplicateOrderId(id));
        }

        self.current_time += 1;
        self.event_log.push(Event::NewOrderAck {
            ts: self.current_time,
            id,
            side,
            price,
            qty,
        });

        let Some(handle) = self.arena.allocate() else {
            // The ack is already logged (log-first, allocate-second); mark
            // the engine dead so later commands cannot append acks a replay
            // could not satisfy.
            self.exhausted = true;
            error!(order_id = id, "order pool exhausted, engine halted");
            return Err(EngineError::ArenaExhausted);
        };
        *self.arena.get_mut(handle) = Order::new(id, self.current_time, side, price, qty);
        self.index.insert(id, handle);

        self.execute_matching(handle, side, price);

        if self.arena.get(handle).remaining_qty > 0 {
            let own = match side {
                Side::Buy => &mut self.bids,
                Side::Sell => &mut self.asks,
            };
            own.find_or_create(price).push_back(&mut self.arena, handle);
        } else {
            self.index.remove(&id);
            self.arena.deallocate(handle);
        }

        Ok(())
    }

    /// Process a cancel command.
    ///
    /// The acknowledgement is logged whether or not the id is live - the
    /// audit trail records what was requested, and the replayer counts on
    /// the no-op cancel to stay clock-aligned. A live order is unlinked from
    /// its level in O(1) and its slot returned to the pool.
    pub fn process_cancel(&mut self, id: OrderId) {
        self.current_time += 1;
        self.event_log.push(Event::CancelAck {
            ts: self.current_time,
            id,
        });

        let Some(handle) = self.index.remove(&id) else {
            return;
        };

        let (side, price) = {
            let order = self.arena.get(handle);
            (order.side, order.price)
        };
        let book = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = book.get_mut(price) {
            level.unlink(&mut self.arena, handle);
            if level.is_empty() {
                book.erase(price);
            }
        }

        self.arena.deallocate(handle);
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Sweep the opposite side from its best level while prices cross and
    /// aggressive quantity remains. Emptied levels are erased before moving
    /// to the next best.
    fn execute_matching(&mut self, aggressive: OrderHandle, side: Side, limit: Price) {
        loop {
            if self.arena.get(aggressive).is_filled() {
                break;
            }

            let opposite = match side {
                Side::Buy => &self.asks,
                Side::Sell => &self.bids,
            };
            let Some(level_price) = opposite.best_price() else {
                break;
            };
            // A buy crosses at or above the ask, a sell at or below the bid.
            let crosses = match side {
                Side::Buy => limit >= level_price,
                Side::Sell => limit <= level_price,
            };
            if !crosses {
                break;
            }

            self.match_level(aggressive, side, level_price);

            let opposite = match side {
                Side::Buy => &mut self.asks,
                Side::Sell => &mut self.bids,
            };
            if opposite.get(level_price).is_some_and(|level| level.is_empty()) {
                opposite.erase(level_price);
            }
        }
    }

    /// Match the aggressive order against one opposing level, oldest order
    /// first. Each fill advances the clock, appends a `Trade` at the
    /// passive order's price, and decrements both remaining quantities and
    /// the level volume; fully-filled passives are popped, de-indexed, and
    /// returned to the pool.
    fn match_level(&mut self, aggressive: OrderHandle, side: Side, level_price: Price) {
        loop {
            let remaining = self.arena.get(aggressive).remaining_qty;
            if remaining == 0 {
                break;
            }

            let level = match side {
                Side::Buy => self.asks.get_mut(level_price),
                Side::Sell => self.bids.get_mut(level_price),
            };
            let Some(level) = level else {
                break;
            };
            if level.is_empty() {
                break;
            }

            let passive = level.front();
            let (passive_id, passive_remaining) = {
                let order = self.arena.get(passive);
                (order.id, order.remaining_qty)
            };
            let aggressive_id = self.arena.get(aggressive).id;
            let trade_qty = remaining.min(passive_remaining);

            self.current_time += 1;
            self.event_log.push(Event::Trade {
                ts: self.current_time,
                passive_id,
                aggressive_id,
                price: level_price,
                qty: trade_qty,
            });

            self.arena.get_mut(aggressive).remaining_qty -= trade_qty;
            self.arena.get_mut(passive).remaining_qty -= trade_qty;
            level.total_volume -= trade_qty;

            if passive_remaining == trade_qty {
                // pop_front leaves the aggregates to us: volume was already
                // accounted trade-by-trade, the count goes here.
                level.pop_front(&mut self.arena);
                level.order_count -= 1;
                self.index.remove(&passive_id);
                self.arena.deallocate(passive);
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Best bid price (scaled), if any.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    /// Best ask price (scaled), if any.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Immutable view of the event log.
    #[inline]
    pub fn event_log(&self) -> &[Event] {
        &self.event_log
    }

    /// Number of currently resting orders.
    #[inline]
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    /// Whether the pool ran dry and the engine stopped accepting orders.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Best-first aggregate rows for one side, at most `limit` levels.
    pub fn depth(&self, side: Side, limit: usize) -> Vec<LevelView> {
        let book = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        book.iter_best_first()
            .take(limit)
            .map(|(price, level)| LevelView {
                price,
                total_volume: level.total_volume,
                order_count: level.order_count,
            })
            .collect()
    }

    /// Look up a live resting order by id.
    #[inline]
    pub fn find_order(&self, id: OrderId) -> Option<&Order> {
        self.index.get(&id).map(|&handle| self.arena.get(handle))
    }

    /// FIFO queue of order ids at one price level, oldest first. Empty when
    /// the level does not exist.
    pub fn level_queue(&self, side: Side, price: Price) -> Vec<OrderId> {
        let book = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        let Some(level) = book.get(price) else {
            return Vec::new();
        };
        let mut ids = Vec::with_capacity(level.order_count as usize);
        let mut handle = level.head;
        while handle != NULL_HANDLE {
            let order = self.arena.get(handle);
            ids.push(order.id);
            handle = order.next;
        }
        ids
    }

    /// Pre-fault the pool's memory pages before the first command.
    pub fn warm_up(&mut self) {
        self.arena.warm_up();
    }

    // ========================================================================
    // Integrity
    // ========================================================================

    /// Verify the global invariants. O(n) walk over the whole book; meant
    /// for tests and post-mortems, not the hot path. A `false` here means a
    /// bug, not a recoverable condition.
    pub fn check_invariants(&self) -> bool {
        // 1. Non-crossing.
        if let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) {
            if bid >= ask {
                return false;
            }
        }

        let mut live_orders = 0usize;
        for book in [&self.bids, &self.asks] {
            for (price, level) in book.iter_best_first() {
                // Empty levels must have been erased.
                if level.is_empty() {
                    return false;
                }
                // 3. Null head iff null tail iff zero count.
                if (level.head == NULL_HANDLE) != (level.tail == NULL_HANDLE) {
                    return false;
                }

                let mut volume: Qty = 0;
                let mut count: u32 = 0;
                let mut handle = level.head;
                let mut prev = NULL_HANDLE;
                while handle != NULL_HANDLE {
                    let order = self.arena.get(handle);
                    // 4. Fill bound.
                    if order.remaining_qty == 0 || order.remaining_qty > order.original_qty {
                        return false;
                    }
                    if order.price != price || order.side != book.side() {
                        return false;
                    }
                    if order.prev != prev {
                        return false;
                    }
                    // 5. Index completeness, forward direction.
                    if self.index.get(&order.id) != Some(&handle) {
                        return false;
                    }
                    volume += order.remaining_qty;
                    count += 1;
                    prev = handle;
                    handle = order.next;
                }
                if prev != level.tail {
                    return false;
                }
                // 2. Volume conservation; 3. count consistency.
                if volume != level.total_volume || count != level.order_count {
                    return false;
                }
                live_orders += count as usize;
            }
        }

        // 5. Index completeness, reverse direction: no stale entries, and
        // the arena agrees on the live population.
        if live_orders != self.index.len() {
            return false;
        }
        if self.arena.allocated() as usize != live_orders {
            return false;
        }

        // 6. Monotone clock.
        self.event_log
            .windows(2)
            .all(|pair| pair[0].timestamp() <= pair[1].timestamp())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(1_000_000)
    }
}
