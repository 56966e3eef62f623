//! Price level - an intrusive FIFO queue of resting orders at one price.
//!
//! The doubly-linked list lives inside the order slots themselves (the
//! `prev`/`next` handles), so linking and unlinking are O(1) pointer surgery
//! with no per-node allocation. Head is the oldest order and matches first.

use crate::arena::{Arena, OrderHandle, NULL_HANDLE};
use crate::events::Qty;

/// Aggregate state of a single price point on one side of the book.
///
/// `total_volume` is the sum of `remaining_qty` over the queued orders and
/// `order_count` their number; both are maintained by the callers according
/// to the per-operation conventions documented below.
#[derive(Clone, Copy, Debug, Default)]
pub struct Level {
    /// Oldest order (highest priority, first to match); null when empty.
    pub head: OrderHandle,
    /// Newest order (last to match); null when empty.
    pub tail: OrderHandle,
    /// Sum of remaining quantity across the queue.
    pub total_volume: Qty,
    /// Number of orders in the queue.
    pub order_count: u32,
}

impl Level {
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: NULL_HANDLE,
            tail: NULL_HANDLE,
            total_volume: 0,
            order_count: 0,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Append an order at the tail and fold its remaining quantity into the
    /// aggregates.
    ///
    /// The handle must reference a live order not currently linked anywhere.
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub fn push_back(&mut self, arena: &mut Arena, handle: OrderHandle) {
        let qty = arena.get(handle).remaining_qty;

        if self.tail == NULL_HANDLE {
            debug_assert!(self.head == NULL_HANDLE);
            self.head = handle;
            self.tail = handle;
            let order = arena.get_mut(handle);
            order.prev = NULL_HANDLE;
            order.next = NULL_HANDLE;
        } else {
            arena.get_mut(self.tail).next = handle;
            let order = arena.get_mut(handle);
            order.prev = self.tail;
            order.next = NULL_HANDLE;
            self.tail = handle;
        }

        self.order_count += 1;
        self.total_volume += qty;
    }

    /// Head of the queue; null when empty.
    #[inline]
    pub const fn front(&self) -> OrderHandle {
        self.head
    }

    /// Unlink the head order. Updates neither `total_volume` nor
    /// `order_count`: the match loop accounts for volume trade-by-trade and
    /// pops only once the head is fully filled, so it owns both updates.
    ///
    /// The level must be non-empty.
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub fn pop_front(&mut self, arena: &mut Arena) {
        debug_assert!(self.head != NULL_HANDLE, "pop_front on empty level");

        let handle = self.head;
        let next = arena.get(handle).next;

        if next == NULL_HANDLE {
            self.head = NULL_HANDLE;
            self.tail = NULL_HANDLE;
        } else {
            self.head = next;
            arena.get_mut(next).prev = NULL_HANDLE;
        }

        let order = arena.get_mut(handle);
        order.prev = NULL_HANDLE;
        order.next = NULL_HANDLE;
    }

    /// Unlink an order from any position and subtract its remaining
    /// quantity and count from the aggregates. This is the cancel path.
    ///
    /// The handle must be linked in this level.
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub fn unlink(&mut self, arena: &mut Arena, handle: OrderHandle) {
        let order = arena.get(handle);
        let prev = order.prev;
        let next = order.next;
        let qty = order.remaining_qty;

        // Only order in the level.
        if prev == NULL_HANDLE && next == NULL_HANDLE {
            debug_assert!(self.head == handle && self.tail == handle);
            self.head = NULL_HANDLE;
            self.tail = NULL_HANDLE;
        }
        // Head of the queue.
        else if prev == NULL_HANDLE {
            debug_assert!(self.head == handle);
            self.head = next;
            arena.get_mut(next).prev = NULL_HANDLE;
        }
        // Tail of the queue.
        else if next == NULL_HANDLE {
            debug_assert!(self.tail == handle);
            self.tail = prev;
            arena.get_mut(prev).next = NULL_HANDLE;
        }
        // Middle of the queue.
        else {
            arena.get_mut(prev).next = next;
            arena.get_mut(next).prev = prev;
        }

        self.order_count -= 1;
        self.total_volume -= qty;

        let order = arena.get_mut(handle);
        order.prev = NULL_HANDLE;
        order.next = NULL_HANDLE;
    }
}
