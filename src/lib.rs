//! # Matchbook
//!
//! A deterministic, single-instrument limit order book matching engine.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: one thread owns the engine exclusively (no locks)
//! - **Event-Sourced**: every command appends acks and trades to an
//!   append-only log; replaying the acks regenerates the trades bit-exactly
//! - **Arena Allocation**: no heap traffic in the hot path; 64-byte aligned
//!   order slots addressed by 32-bit handles
//! - **Price-Time Priority**: best level first, FIFO within a level via
//!   intrusive doubly-linked lists
//!
//! ## Architecture
//!
//! ```text
//! [Commands] --> [Engine] --> [Event Log] --> [Replayer] --> [Engine']
//!                   |
//!        [Arena] [SideBooks] [Index]
//! ```

pub mod arena;
pub mod book;
pub mod engine;
pub mod error;
pub mod events;
pub mod price_level;
pub mod replay;

// Re-exports for convenience
pub use arena::{Arena, Order, OrderHandle, NULL_HANDLE};
pub use book::{LevelView, SideBook};
pub use engine::Engine;
pub use error::{EngineError, ReplayError};
pub use events::{Event, OrderId, Price, Qty, Side, Timestamp, PRICE_SCALE};
pub use price_level::Level;
pub use replay::Replayer;
