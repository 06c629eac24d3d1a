pub mod bounded;
pub mod cached;
pub mod heap;

pub use bounded::BoundedPool;
pub use cached::{CachedPool, PoolConfig};
pub use heap::HeapPool;

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU32, Ordering};

/// Nil handle. Never a valid slot index or node address.
pub(crate) const NIL: usize = usize::MAX;

/// Nil link word inside the arena pools.
pub(crate) const NIL_IDX: u32 = u32::MAX;

#[inline]
pub(crate) fn idx_to_handle(word: u32) -> usize {
    if word == NIL_IDX {
        NIL
    } else {
        word as usize
    }
}

#[inline]
pub(crate) fn handle_to_idx(handle: usize) -> u32 {
    if handle == NIL {
        NIL_IDX
    } else {
        handle as u32
    }
}

/// One arena slot: a link word and space for a payload.
///
/// The link doubles as the free-list link while the slot is unallocated,
/// the same field reuse as an intrusive node's `next`.
pub(crate) struct Slot<T> {
    next: AtomicU32,
    item: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    pub(crate) fn new() -> Self {
        Slot {
            next: AtomicU32::new(NIL_IDX),
            item: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    #[inline]
    pub(crate) fn link(&self) -> u32 {
        self.next.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn set_link(&self, word: u32) {
        self.next.store(word, Ordering::Release);
    }

    /// Caller must own the slot and the payload must be initialized.
    #[inline]
    pub(crate) unsafe fn take(&self) -> T {
        (*self.item.get()).assume_init_read()
    }

    /// Caller must own the slot; any previous payload must already be gone.
    #[inline]
    pub(crate) unsafe fn write(&self, item: T) {
        (*self.item.get()).write(item);
    }
}

/// Node allocation behind the containers.
///
/// Handles are opaque `usize` values private to the pool that produced
/// them; `usize::MAX` is reserved as nil. The handle-level methods are
/// unsafe because the pool cannot check ownership: callers must only pass
/// handles obtained from this pool's `allocate`, must `take` a payload
/// exactly once after the matching `write`, and must not touch a handle
/// after `release`.
///
/// # Safety
///
/// Implementations must hand out each node to at most one caller at a
/// time and must keep a node's memory valid until `release`.
pub unsafe trait NodePool<T>: Send + Sync {
    /// Reserve a node with a nil link and an uninitialized payload.
    /// `None` means the pool is out of capacity.
    fn allocate(&self) -> Option<usize>;

    unsafe fn write(&self, node: usize, item: T);

    unsafe fn take(&self, node: usize) -> T;

    unsafe fn link(&self, node: usize) -> usize;

    unsafe fn set_link(&self, node: usize, next: usize);

    /// Return a node whose payload has already been taken (or never
    /// written) to the pool.
    unsafe fn release(&self, node: usize);

    /// `None` for unbounded pools.
    fn capacity(&self) -> Option<usize>;

    /// Best-effort: whether `allocate` would fail right now.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Pools whose handles fit in 32 bits and whose node memory stays mapped
/// for the pool's whole lifetime.
///
/// # Safety
///
/// Implementations must guarantee that `link` on any handle ever returned
/// by `allocate` stays memory-safe even after the node was released. The
/// versioned CAS loops read the link of a node they do not yet own and
/// rely on the version check, not the read, for correctness.
pub unsafe trait StableIndexPool<T>: NodePool<T> {}
