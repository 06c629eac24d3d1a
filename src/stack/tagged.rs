// Versioned head word: `(version << 32) | index` in one AtomicU64.
//
// A naive CAS on a bare head index is ABA-unsafe: between a reader's load
// of `head` and its CAS, the head slot can be popped, recycled through the
// pool and pushed again, so the CAS matches an index that no longer means
// the same node. Folding a counter into the same word makes the CAS
// observe both the index and the number of mutations; every successful
// push, pop and detach bumps the counter, so a recycled head fails the
// compare. The counter wraps at 2^32, which would need that many
// interleaved operations inside one CAS window to go unnoticed.

use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::pool::{handle_to_idx, idx_to_handle, NodePool, StableIndexPool, NIL_IDX};

#[inline]
fn pack(index: u32, version: u32) -> u64 {
    ((version as u64) << 32) | index as u64
}

#[inline]
fn unpack(word: u64) -> (u32, u32) {
    (word as u32, (word >> 32) as u32)
}

pub(crate) struct TaggedHead {
    word: CachePadded<AtomicU64>,
}

impl TaggedHead {
    pub(crate) fn new() -> Self {
        TaggedHead {
            word: CachePadded::new(AtomicU64::new(pack(NIL_IDX, 0))),
        }
    }

    /// A head already pointing at `index`, for pools that preload their
    /// free list.
    pub(crate) fn with_head(index: u32) -> Self {
        TaggedHead {
            word: CachePadded::new(AtomicU64::new(pack(index, 0))),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        unpack(self.word.load(Ordering::Acquire)).0 == NIL_IDX
    }

    pub(crate) fn push<T, P: StableIndexPool<T>>(&self, pool: &P, index: u32) {
        let mut cur = self.word.load(Ordering::Relaxed);
        loop {
            let (head, version) = unpack(cur);
            unsafe { pool.set_link(index as usize, idx_to_handle(head)) };
            match self.word.compare_exchange_weak(
                cur,
                pack(index, version.wrapping_add(1)),
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(word) => cur = word,
            }
        }
    }

    pub(crate) fn pop<T, P: StableIndexPool<T>>(&self, pool: &P) -> Option<u32> {
        let mut cur = self.word.load(Ordering::Acquire);
        loop {
            let (head, version) = unpack(cur);
            if head == NIL_IDX {
                return None;
            }
            // This link read may be stale if `head` was popped and recycled
            // in race. The pool keeps the slot mapped, so the read is
            // memory-safe, and the version compare below rejects the value.
            let next = handle_to_idx(unsafe { pool.link(head as usize) });
            match self.word.compare_exchange_weak(
                cur,
                pack(next, version.wrapping_add(1)),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(head),
                Err(word) => cur = word,
            }
        }
    }

    /// Detach the whole chain, leaving the head empty. Returns the old
    /// head index (`NIL_IDX` when there was nothing to take).
    pub(crate) fn take_all(&self) -> u32 {
        let mut cur = self.word.load(Ordering::Acquire);
        loop {
            let (head, version) = unpack(cur);
            if head == NIL_IDX {
                return NIL_IDX;
            }
            match self.word.compare_exchange_weak(
                cur,
                pack(NIL_IDX, version.wrapping_add(1)),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return head,
                Err(word) => cur = word,
            }
        }
    }
}
