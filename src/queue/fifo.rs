use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

use crate::error::Full;
use crate::pool::{CachedPool, NodePool, PoolConfig, StableIndexPool, NIL};
use crate::BoundedPool;

/// Multi-producer single-consumer FIFO queue.
///
/// Producers publish with one atomic tail swap and then link the previous
/// tail forward, so a push never loops no matter how many producers race.
/// The consumer walks the forward links from a dummy node: each pop hands
/// the payload of `head.next` out, promotes that node to be the new dummy
/// and recycles the old one through the pool.
///
/// `pop` (and only `pop`) is single-consumer: two threads popping at once
/// race on the head and may hand out the same payload twice. That is a
/// contract violation, not something the type system rules out, same as
/// the drain side of [`MpscQueue`](crate::MpscQueue).
pub struct FifoQueue<T: Send + 'static, P: StableIndexPool<T> = CachedPool<T>> {
    head: CachePadded<AtomicUsize>,
    tail: CachePadded<AtomicUsize>,
    pool: P,
    _items: PhantomData<T>,
}

unsafe impl<T: Send + 'static, P: StableIndexPool<T>> Send for FifoQueue<T, P> {}
unsafe impl<T: Send + 'static, P: StableIndexPool<T>> Sync for FifoQueue<T, P> {}

impl<T: Send + 'static> FifoQueue<T, BoundedPool<T>> {
    /// A queue that accepts at most `capacity` items at a time.
    ///
    /// The pool is sized one past `capacity` because the dummy node always
    /// occupies a slot; users get the full advertised capacity.
    pub fn bounded(capacity: usize) -> Self {
        assert!(capacity > 0, "bounded queue needs capacity for one item");
        Self::with_pool(BoundedPool::new(capacity + 1))
    }
}

impl<T: Send + 'static> FifoQueue<T, CachedPool<T>> {
    pub fn unbounded() -> Self {
        Self::with_pool(CachedPool::new())
    }

    pub fn with_config(config: PoolConfig) -> Self {
        Self::with_pool(CachedPool::with_config(config))
    }
}

impl<T: Send + 'static> Default for FifoQueue<T, CachedPool<T>> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T: Send + 'static, P: StableIndexPool<T>> FifoQueue<T, P> {
    pub fn with_pool(pool: P) -> Self {
        let dummy = pool
            .allocate()
            .expect("node pool must hold at least the dummy node");
        FifoQueue {
            head: CachePadded::new(AtomicUsize::new(dummy)),
            tail: CachePadded::new(AtomicUsize::new(dummy)),
            pool,
            _items: PhantomData,
        }
    }

    /// Wait-free per producer: one swap, one link store.
    pub fn push(&self, item: T) -> Result<(), Full<T>> {
        let Some(node) = self.pool.allocate() else {
            return Err(Full(item));
        };
        unsafe {
            self.pool.write(node, item);
            self.pool.set_link(node, NIL);
        }
        let prev = self.tail.swap(node, Ordering::AcqRel);
        // `prev` is exclusively ours to link: every producer gets a
        // distinct previous tail out of the swap.
        unsafe { self.pool.set_link(prev, node) };
        Ok(())
    }

    /// Single-consumer pop, oldest item first.
    ///
    /// May report empty while a racing push has swapped the tail but not
    /// linked yet; the item is visible to the next call.
    pub fn pop(&self) -> Option<T> {
        let head = self.head.load(Ordering::Acquire);
        let next = unsafe { self.pool.link(head) };
        if next == NIL {
            return None;
        }
        let item = unsafe { self.pool.take(next) };
        self.head.store(next, Ordering::Release);
        unsafe { self.pool.release(head) };
        Some(item)
    }

    /// Racy by nature under concurrent pushes.
    pub fn is_empty(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        unsafe { self.pool.link(head) == NIL }
    }

    /// Best-effort: a racing pop can open a slot right after this returns.
    pub fn is_full(&self) -> bool {
        self.pool.is_exhausted()
    }

    /// User-visible capacity, dummy slot excluded. `None` when unbounded.
    pub fn capacity(&self) -> Option<usize> {
        self.pool.capacity().map(|slots| slots - 1)
    }
}

impl<T: Send + 'static, P: StableIndexPool<T>> Drop for FifoQueue<T, P> {
    fn drop(&mut self) {
        while self.pop().is_some() {}
        // Only the dummy is left; its payload is already gone.
        unsafe { self.pool.release(self.head.load(Ordering::Relaxed)) };
    }
}
