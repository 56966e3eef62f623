//! Scalar types, the order side, and the market event vocabulary.
//!
//! Events are the single source of truth: the book state is fully
//! reconstructible by reissuing the input-kind events (acks) to a fresh
//! engine. Each event knows how to render itself as one CSV line of the
//! persisted log format, and how to parse itself back.

use std::fmt;

/// Client-assigned order identifier.
pub type OrderId = u64;

/// Fixed-point price, scaled by [`PRICE_SCALE`]. Signed so that spreads and
/// price arithmetic never wrap. Compared as an integer, never as a float.
pub type Price = i64;

/// Order quantity.
pub type Qty = u64;

/// Logical-clock tick. Starts at 0 and advances by exactly 1 per event.
pub type Timestamp = u64;

/// Human price 100.50 is stored as 1_005_000.
pub const PRICE_SCALE: i64 = 10_000;

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    /// Returns the side an aggressive order matches against.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Wire literal used by the persisted log format.
    #[inline]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }

    /// Parses a wire literal; anything but `BUY`/`SELL` is rejected.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "BUY" => Some(Side::Buy),
            "SELL" => Some(Side::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// A market event, stored by value in the engine's append-only log.
///
/// `NewOrderAck` and `CancelAck` are the input kinds: replaying them through
/// a fresh engine regenerates every `Trade` bit-exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Logged exactly once per accepted new-order command, before matching.
    NewOrderAck {
        ts: Timestamp,
        id: OrderId,
        side: Side,
        price: Price,
        qty: Qty,
    },
    /// Logged exactly once per cancel command, live id or not.
    CancelAck { ts: Timestamp, id: OrderId },
    /// One fill. `price` is the resting (passive) order's price.
    Trade {
        ts: Timestamp,
        passive_id: OrderId,
        aggressive_id: OrderId,
        price: Price,
        qty: Qty,
    },
}

impl Event {
    #[inline]
    pub fn timestamp(&self) -> Timestamp {
        match *self {
            Event::NewOrderAck { ts, .. } => ts,
            Event::CancelAck { ts, .. } => ts,
            Event::Trade { ts, .. } => ts,
        }
    }

    /// Parses one line of the persisted log format.
    ///
    /// Returns `None` for unknown prefixes, insufficient arity, or
    /// non-numeric fields; trailing extra fields are tolerated so that
    /// hand-edited or mixed-version logs still load.
    pub fn parse_line(line: &str) -> Option<Event> {
        let mut fields = line.trim_end().split(',');
        match fields.next()? {
            "NEW_ORDER" => Some(Event::NewOrderAck {
                ts: fields.next()?.parse().ok()?,
                id: fields.next()?.parse().ok()?,
                side: Side::from_wire(fields.next()?)?,
                price: fields.next()?.parse().ok()?,
                qty: fields.next()?.parse().ok()?,
            }),
            "CANCEL_ORDER" => Some(Event::CancelAck {
                ts: fields.next()?.parse().ok()?,
                id: fields.next()?.parse().ok()?,
            }),
            "TRADE" => Some(Event::Trade {
                ts: fields.next()?.parse().ok()?,
                passive_id: fields.next()?.parse().ok()?,
                aggressive_id: fields.next()?.parse().ok()?,
                price: fields.next()?.parse().ok()?,
                qty: fields.next()?.parse().ok()?,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    /// One CSV line, no trailing newline. Prices are the scaled integers.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Event::NewOrderAck {
                ts,
                id,
                side,
                price,
                qty,
            } => write!(f, "NEW_ORDER,{ts},{id},{side},{price},{qty}"),
            Event::CancelAck { ts, id } => write!(f, "CANCEL_ORDER,{ts},{id}"),
            Event::Trade {
                ts,
                passive_id,
                aggressive_id,
                price,
                qty,
            } => write!(f, "TRADE,{ts},{passive_id},{aggressive_id},{price},{qty}"),
        }
    }
}
