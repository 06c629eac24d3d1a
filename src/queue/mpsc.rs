use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

use crate::chain::{self, Drain};
use crate::error::Full;
use crate::pool::{HeapPool, NodePool, NIL};

/// Multi-producer chain queue with batch consumption.
///
/// Producers CAS new nodes onto a single head word; the consumer detaches
/// the whole chain in one exchange. The exchange is immune to recycled
/// nodes (it compares nothing), and the push CAS only needs the head it
/// links to, so this works over any pool policy including [`HeapPool`].
///
/// Every push that completed before a `pop_all` is in its result; a push
/// racing the exchange lands entirely in this batch or entirely in the
/// next one. Draining from several threads at once is memory-safe (each
/// exchange takes a disjoint chain) but forfeits any cross-batch ordering,
/// so keep a single consumer when order matters.
pub struct MpscQueue<T: Send + 'static, P: NodePool<T> = HeapPool<T>> {
    head: CachePadded<AtomicUsize>,
    pool: P,
    _items: PhantomData<T>,
}

unsafe impl<T: Send + 'static, P: NodePool<T>> Send for MpscQueue<T, P> {}
unsafe impl<T: Send + 'static, P: NodePool<T>> Sync for MpscQueue<T, P> {}

impl<T: Send + 'static> MpscQueue<T, HeapPool<T>> {
    pub fn new() -> Self {
        Self::with_pool(HeapPool::new())
    }
}

impl<T: Send + 'static> Default for MpscQueue<T, HeapPool<T>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static, P: NodePool<T>> MpscQueue<T, P> {
    pub fn with_pool(pool: P) -> Self {
        MpscQueue {
            head: CachePadded::new(AtomicUsize::new(NIL)),
            pool,
            _items: PhantomData,
        }
    }

    /// Lock-free push; many producers may race, losers retry their CAS.
    pub fn push(&self, item: T) -> Result<(), Full<T>> {
        let Some(node) = self.pool.allocate() else {
            return Err(Full(item));
        };
        unsafe { self.pool.write(node, item) };
        let mut head = self.head.load(Ordering::Relaxed);
        loop {
            unsafe { self.pool.set_link(node, head) };
            match self.head.compare_exchange_weak(
                head,
                node,
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(()),
                Err(current) => head = current,
            }
        }
    }

    /// Detaches the whole chain and yields it oldest-first. Pays one O(n)
    /// reversal pass over the detached nodes.
    pub fn pop_all(&self) -> Drain<'_, T, P> {
        let head = self.head.swap(NIL, Ordering::AcqRel);
        let head = unsafe { chain::reverse(&self.pool, head) };
        Drain::new(&self.pool, head)
    }

    /// Detaches the whole chain and yields it newest-first; nothing beyond
    /// the exchange itself.
    pub fn pop_all_reverse(&self) -> Drain<'_, T, P> {
        Drain::new(&self.pool, self.head.swap(NIL, Ordering::AcqRel))
    }

    /// Racy by nature under concurrent pushes.
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == NIL
    }

    pub fn capacity(&self) -> Option<usize> {
        self.pool.capacity()
    }
}

impl<T: Send + 'static, P: NodePool<T>> Drop for MpscQueue<T, P> {
    fn drop(&mut self) {
        self.pop_all_reverse();
    }
}
