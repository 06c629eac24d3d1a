use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

use crate::pool::{handle_to_idx, idx_to_handle, NodePool, Slot, StableIndexPool, NIL_IDX};
use crate::stack::tagged::TaggedHead;

/// Segment count. With the minimum first-segment size of 32 slots the
/// whole 32-bit index space is covered well before the table runs out.
const SEGMENTS: usize = 32;

/// Valid indices are 0..u32::MAX-1; u32::MAX is the nil link word.
const MAX_SLOTS: usize = u32::MAX as usize;

/// Sizing knobs for [`CachedPool`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Slot count of the first segment. Rounded up to a power of two,
    /// minimum 32. Later segments double.
    pub first_segment_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            first_segment_capacity: 64,
        }
    }
}

/// Unbounded caching node pool.
///
/// Slot storage is a chain of geometrically growing segments; a segment is
/// allocated at most once and never returned to the OS, so every index
/// stays resolvable for the pool's lifetime. `allocate` pops the lock-free
/// free list first and only bumps into fresh segment space when the cache
/// is empty, which amortizes to zero heap traffic under steady churn.
pub struct CachedPool<T> {
    segments: [AtomicPtr<Slot<T>>; SEGMENTS],
    next_fresh: CachePadded<AtomicUsize>,
    free: TaggedHead,
    first_len: usize,
    first_shift: u32,
}

unsafe impl<T: Send> Send for CachedPool<T> {}
unsafe impl<T: Send> Sync for CachedPool<T> {}

impl<T: Send + 'static> CachedPool<T> {
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    pub fn with_config(config: PoolConfig) -> Self {
        let first_len = config.first_segment_capacity.max(32).next_power_of_two();
        CachedPool {
            segments: std::array::from_fn(|_| AtomicPtr::new(ptr::null_mut())),
            next_fresh: CachePadded::new(AtomicUsize::new(0)),
            free: TaggedHead::new(),
            first_len,
            first_shift: first_len.trailing_zeros(),
        }
    }

    /// Maps a global slot index to (segment, offset). Segment k holds
    /// `first_len << k` slots, so `index + first_len` has its top bit in
    /// position `first_shift + k`.
    #[inline]
    fn locate(&self, index: usize) -> (usize, usize) {
        let n = index + self.first_len;
        let segment = (usize::BITS - 1 - n.leading_zeros() - self.first_shift) as usize;
        (segment, n - (self.first_len << segment))
    }

    #[inline]
    fn slot(&self, index: usize) -> &Slot<T> {
        let (segment, offset) = self.locate(index);
        let base = self.segments[segment].load(Ordering::Acquire);
        debug_assert!(!base.is_null());
        // The segment was installed before any index inside it was handed
        // out, and it is never freed while the pool lives.
        unsafe { &*base.add(offset) }
    }

    /// Returns the segment base, installing the segment on first use.
    fn segment(&self, index: usize) -> *mut Slot<T> {
        let slot = self.segments[index].load(Ordering::Acquire);
        if !slot.is_null() {
            return slot;
        }
        let len = self.first_len << index;
        let fresh: Box<[Slot<T>]> = (0..len).map(|_| Slot::new()).collect();
        let fresh = Box::into_raw(fresh) as *mut Slot<T>;
        match self.segments[index].compare_exchange(
            ptr::null_mut(),
            fresh,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                tracing::trace!(segment = index, slots = len, "node pool grew a segment");
                fresh
            }
            Err(installed) => {
                // Lost the install race; drop our copy and use the winner's.
                unsafe { drop(Box::from_raw(ptr::slice_from_raw_parts_mut(fresh, len))) };
                installed
            }
        }
    }
}

impl<T: Send + 'static> Default for CachedPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl<T: Send + 'static> NodePool<T> for CachedPool<T> {
    fn allocate(&self) -> Option<usize> {
        if let Some(index) = self.free.pop(self) {
            self.slot(index as usize).set_link(NIL_IDX);
            return Some(index as usize);
        }
        let index = self.next_fresh.fetch_add(1, Ordering::Relaxed);
        assert!(index < MAX_SLOTS, "node pool index space exhausted");
        let (segment, _) = self.locate(index);
        self.segment(segment);
        // A fresh slot already carries a nil link and no payload.
        Some(index)
    }

    unsafe fn write(&self, node: usize, item: T) {
        self.slot(node).write(item);
    }

    unsafe fn take(&self, node: usize) -> T {
        self.slot(node).take()
    }

    unsafe fn link(&self, node: usize) -> usize {
        idx_to_handle(self.slot(node).link())
    }

    unsafe fn set_link(&self, node: usize, next: usize) {
        self.slot(node).set_link(handle_to_idx(next));
    }

    unsafe fn release(&self, node: usize) {
        self.free.push(self, node as u32);
    }

    fn capacity(&self) -> Option<usize> {
        None
    }
}

unsafe impl<T: Send + 'static> StableIndexPool<T> for CachedPool<T> {}

impl<T> Drop for CachedPool<T> {
    fn drop(&mut self) {
        for (k, segment) in self.segments.iter_mut().enumerate() {
            let base = *segment.get_mut();
            if base.is_null() {
                continue;
            }
            let len = self.first_len << k;
            unsafe { drop(Box::from_raw(ptr::slice_from_raw_parts_mut(base, len))) };
        }
    }
}
