//! Lock-free single-producer/single-consumer ring queue.
//!
//! A fixed-capacity FIFO split into a [`Producer`] and a [`Consumer`] handle,
//! one per endpoint thread. Push and pop never block and never allocate; they
//! fail on full and empty respectively.
//!
//! Memory-ordering contract (required on weakly-ordered hardware):
//! - producer: acquire-load `head`, write the slot, release-store `tail`
//! - consumer: acquire-load `tail`, read the slot, release-store `head`
//! - each endpoint may read its own cursor relaxed
//!
//! The release-store of `tail` publishes the slot write to the consumer's
//! acquire-load; symmetrically the release-store of `head` hands the slot
//! back to the producer. Cursors are monotonically increasing and wrapped
//! with an index mask, so capacity must be a power of two.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_utils::CachePadded;

/// Error returned by [`Producer::push`] when the queue is full.
/// Hands the rejected value back to the caller.
pub struct Full<T>(pub T);

impl<T> std::fmt::Debug for Full<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Full(..)")
    }
}

/// Compile-time capacity check, in the spirit of a `static_assert`.
struct AssertCapacity<const N: usize>;

impl<const N: usize> AssertCapacity<N> {
    const OK: () = assert!(N.is_power_of_two(), "capacity must be a power of two");
}

/// Shared ring storage. Owned jointly by the two handles via `Arc`; the
/// buffer itself never moves while either endpoint is live.
struct RingBuffer<T, const N: usize> {
    /// Read cursor. Only the consumer advances it.
    head: CachePadded<AtomicUsize>,
    /// Write cursor. Only the producer advances it.
    tail: CachePadded<AtomicUsize>,
    /// Slot storage. A slot is initialised iff its index is in `head..tail`.
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

// The handles hand slots across threads one at a time under the
// acquire/release protocol above.
unsafe impl<T: Send, const N: usize> Send for RingBuffer<T, N> {}
unsafe impl<T: Send, const N: usize> Sync for RingBuffer<T, N> {}

impl<T, const N: usize> RingBuffer<T, N> {
    const MASK: usize = N - 1;

    #[inline]
    fn slot(&self, index: usize) -> *mut MaybeUninit<T> {
        self.slots[index & Self::MASK].get()
    }

    fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        tail.wrapping_sub(head)
    }
}

impl<T, const N: usize> Drop for RingBuffer<T, N> {
    fn drop(&mut self) {
        // Both handles are gone by now; drain whatever is still constructed.
        let mut head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        while head != tail {
            unsafe { (*self.slot(head)).assume_init_drop() };
            head = head.wrapping_add(1);
        }
    }
}

/// Write endpoint. Exactly one per queue; `Send` but not `Clone`.
pub struct Producer<T, const N: usize> {
    buf: Arc<RingBuffer<T, N>>,
}

/// Read endpoint. Exactly one per queue; `Send` but not `Clone`.
pub struct Consumer<T, const N: usize> {
    buf: Arc<RingBuffer<T, N>>,
}

/// Create a ring queue of capacity `N` (a power of two) and split it into
/// its two endpoints.
pub fn ring<T, const N: usize>() -> (Producer<T, N>, Consumer<T, N>) {
    let () = AssertCapacity::<N>::OK;
    let buf = Arc::new(RingBuffer {
        head: CachePadded::new(AtomicUsize::new(0)),
        tail: CachePadded::new(AtomicUsize::new(0)),
        slots: (0..N)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect(),
    });
    (
        Producer {
            buf: Arc::clone(&buf),
        },
        Consumer { buf },
    )
}

impl<T, const N: usize> Producer<T, N> {
    /// Append a value at the tail. Fails and returns the value when the
    /// queue holds `N` records.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), Full<T>> {
        let buf = &*self.buf;
        let tail = buf.tail.load(Ordering::Relaxed);
        let head = buf.head.load(Ordering::Acquire);
        if tail.wrapping_sub(head) >= N {
            return Err(Full(value));
        }
        unsafe { (*buf.slot(tail)).write(value) };
        buf.tail.store(tail.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Number of records currently in the queue.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total slot count.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T, const N: usize> Consumer<T, N> {
    /// Remove and return the record at the head, or `None` when empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        let buf = &*self.buf;
        let head = buf.head.load(Ordering::Relaxed);
        let tail = buf.tail.load(Ordering::Acquire);
        if head == tail {
            return None;
        }
        let value = unsafe { (*buf.slot(head)).assume_init_read() };
        buf.head.store(head.wrapping_add(1), Ordering::Release);
        Some(value)
    }

    /// Number of records currently in the queue.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total slot count.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}
