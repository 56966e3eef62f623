//! Error types for the engine and the replay subsystem.

use thiserror::Error;

use crate::events::OrderId;

/// Errors surfaced by engine commands.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// The order pool is exhausted. Fatal: the engine refuses all further
    /// new-order commands; cancels and queries keep working.
    #[error("order pool exhausted")]
    ArenaExhausted,

    /// A live order with this id already rests on the book. Re-use of ids
    /// is only allowed after the previous holder fills or cancels.
    #[error("another live order with id #{0} already exists")]
    DuplicateOrderId(OrderId),

    /// New-order commands must carry a positive quantity.
    #[error("order quantity must be positive")]
    InvalidQuantity,
}

/// Errors surfaced by log persistence and replay.
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("log file I/O failed")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
