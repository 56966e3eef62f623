//! Arena allocator - O(1) slot pool with cache-line aligned orders.
//!
//! The arena pre-allocates its backing storage once at engine construction,
//! eliminating heap traffic on the hot path. A LIFO free list threaded
//! through the `next` link field gives O(1) allocation and deallocation, and
//! slots never relocate, so handles stay valid for as long as they are held.

use std::fmt;

use crate::events::{OrderId, Price, Qty, Side, Timestamp};

/// Sentinel value representing a null/invalid handle.
pub const NULL_HANDLE: u32 = u32::MAX;

/// Type alias for arena handles - compressed 32-bit "pointers" into the pool.
pub type OrderHandle = u32;

/// A single order - exactly 64 bytes (one cache line).
///
/// The intrusive `prev`/`next` links identify the order's neighbours within
/// its price level; they double as the free-list threading while the slot is
/// unallocated. `timestamp` records the acknowledgement tick and is
/// diagnostic only - FIFO within a level is insertion order, not a
/// timestamp comparison.
#[repr(C, align(64))]
#[derive(Clone, Copy)]
pub struct Order {
    /// Fixed-point price, scaled by `PRICE_SCALE`.
    pub price: Price,

    /// Quantity still open. Live orders always satisfy
    /// `0 < remaining_qty <= original_qty`.
    pub remaining_qty: Qty,

    /// Quantity at submission.
    pub original_qty: Qty,

    /// Client-assigned order id.
    pub id: OrderId,

    /// Logical-clock tick of the acknowledgement.
    pub timestamp: Timestamp,

    /// Next order at the same price level (toward the tail).
    pub next: OrderHandle,

    /// Previous order at the same price level; enables O(1) cancel.
    pub prev: OrderHandle,

    pub side: Side,

    _reserved: [u8; 15],
}

const _: () = assert!(
    std::mem::size_of::<Order>() == 64,
    "Order must be exactly 64 bytes (one cache line)"
);

const _: () = assert!(
    std::mem::align_of::<Order>() == 64,
    "Order must be 64-byte aligned"
);

impl Order {
    #[inline]
    pub fn new(id: OrderId, timestamp: Timestamp, side: Side, price: Price, qty: Qty) -> Self {
        Self {
            price,
            remaining_qty: qty,
            original_qty: qty,
            id,
            timestamp,
            next: NULL_HANDLE,
            prev: NULL_HANDLE,
            side,
            _reserved: [0u8; 15],
        }
    }

    /// An empty slot, used to seed the pool and the free list.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            price: 0,
            remaining_qty: 0,
            original_qty: 0,
            id: 0,
            timestamp: 0,
            next: NULL_HANDLE,
            prev: NULL_HANDLE,
            side: Side::Buy,
            _reserved: [0u8; 15],
        }
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.remaining_qty == 0
    }

    /// Reset the slot for reuse when it returns to the free list.
    #[inline]
    pub fn reset(&mut self) {
        *self = Order::empty();
    }
}

impl fmt::Debug for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Order")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp)
            .field("side", &self.side)
            .field("price", &self.price)
            .field("original_qty", &self.original_qty)
            .field("remaining_qty", &self.remaining_qty)
            .field("prev", &self.prev)
            .field("next", &self.next)
            .finish()
    }
}

/// Pre-allocated order pool with O(1) allocation and deallocation.
///
/// The free list is threaded through the `next` field of unallocated slots.
/// Exhaustion is surfaced as `None`; double-free is a programming error the
/// pool does not detect beyond debug assertions.
pub struct Arena {
    /// Contiguous block of slots; never reallocated.
    slots: Vec<Order>,

    /// Head of the free list.
    free_head: OrderHandle,

    /// Number of currently allocated slots.
    allocated_count: u32,

    capacity: u32,
}

impl Arena {
    /// Create an arena holding up to `capacity` live orders.
    ///
    /// # Panics
    /// Panics if `capacity` is not below `NULL_HANDLE` (the sentinel must
    /// stay unreachable).
    pub fn new(capacity: u32) -> Self {
        assert!(
            capacity < NULL_HANDLE,
            "capacity must be less than NULL_HANDLE"
        );

        let mut slots = vec![Order::empty(); capacity as usize];

        // Thread the free list through all slots.
        for i in 0..capacity.saturating_sub(1) {
            slots[i as usize].next = i + 1;
        }
        if capacity > 0 {
            slots[(capacity - 1) as usize].next = NULL_HANDLE;
        }

        Self {
            slots,
            free_head: if capacity > 0 { 0 } else { NULL_HANDLE },
            allocated_count: 0,
            capacity,
        }
    }

    /// Allocate a slot. Returns `None` when the pool is exhausted.
    ///
    /// The slot's contents are stale; the caller must overwrite them
    /// immediately.
    ///
    /// # Complexity
    /// O(1) - pops the free-list head.
    #[inline]
    pub fn allocate(&mut self) -> Option<OrderHandle> {
        if self.free_head == NULL_HANDLE {
            return None;
        }

        let handle = self.free_head;
        self.free_head = self.slots[handle as usize].next;
        self.allocated_count += 1;

        self.slots[handle as usize].next = NULL_HANDLE;
        self.slots[handle as usize].prev = NULL_HANDLE;

        Some(handle)
    }

    /// Return a slot to the pool.
    ///
    /// The caller must ensure the handle was previously allocated and has
    /// not already been freed.
    ///
    /// # Complexity
    /// O(1) - pushes onto the free-list head.
    #[inline]
    pub fn deallocate(&mut self, handle: OrderHandle) {
        debug_assert!(handle < self.capacity, "handle out of bounds");
        debug_assert!(self.allocated_count > 0, "double free detected");

        self.slots[handle as usize].reset();
        self.slots[handle as usize].next = self.free_head;
        self.free_head = handle;
        self.allocated_count -= 1;
    }

    /// # Complexity
    /// O(1) - direct array access.
    #[inline]
    pub fn get(&self, handle: OrderHandle) -> &Order {
        debug_assert!(handle < self.capacity, "handle out of bounds");
        &self.slots[handle as usize]
    }

    /// # Complexity
    /// O(1) - direct array access.
    #[inline]
    pub fn get_mut(&mut self, handle: OrderHandle) -> &mut Order {
        debug_assert!(handle < self.capacity, "handle out of bounds");
        &mut self.slots[handle as usize]
    }

    /// Number of currently allocated slots.
    #[inline]
    pub fn allocated(&self) -> u32 {
        self.allocated_count
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.allocated_count == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.free_head == NULL_HANDLE
    }

    /// Pre-fault all pages backing the pool.
    ///
    /// Walks every slot so the OS maps virtual pages to physical RAM before
    /// the first order arrives.
    pub fn warm_up(&mut self) {
        for slot in &mut self.slots {
            unsafe {
                std::ptr::write_volatile(&mut slot._reserved[0], 0);
            }
        }
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity)
            .field("allocated", &self.allocated_count)
            .field("free_head", &self.free_head)
            .finish()
    }
}
