use std::marker::PhantomData;

use crate::chain::{self, Drain};
use crate::error::Full;
use crate::pool::{idx_to_handle, CachedPool, NodePool, StableIndexPool};
use crate::stack::tagged::TaggedHead;
use crate::{BoundedPool, DrainOrder};

/// Lock-free LIFO stack over a node pool.
///
/// The head is a version-tagged index word, so pop is safe against the
/// classic recycle-in-race ABA case without any deferred reclamation:
/// popped nodes go straight back to the pool. Push, pop and drain may all
/// run concurrently from any number of threads.
pub struct VersionedStack<T: Send + 'static, P: StableIndexPool<T> = CachedPool<T>> {
    head: TaggedHead,
    pool: P,
    _items: PhantomData<T>,
}

unsafe impl<T: Send + 'static, P: StableIndexPool<T>> Send for VersionedStack<T, P> {}
unsafe impl<T: Send + 'static, P: StableIndexPool<T>> Sync for VersionedStack<T, P> {}

impl<T: Send + 'static> VersionedStack<T, BoundedPool<T>> {
    /// A stack that holds at most `capacity` items and never allocates
    /// after construction.
    pub fn bounded(capacity: usize) -> Self {
        Self::with_pool(BoundedPool::new(capacity))
    }
}

impl<T: Send + 'static> VersionedStack<T, CachedPool<T>> {
    pub fn unbounded() -> Self {
        Self::with_pool(CachedPool::new())
    }
}

impl<T: Send + 'static> Default for VersionedStack<T, CachedPool<T>> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T: Send + 'static, P: StableIndexPool<T>> VersionedStack<T, P> {
    pub fn with_pool(pool: P) -> Self {
        VersionedStack {
            head: TaggedHead::new(),
            pool,
            _items: PhantomData,
        }
    }

    /// Pushes on top of the stack. Fails only when the pool is out of
    /// nodes; the rejected value rides back in the error.
    pub fn push(&self, item: T) -> Result<(), Full<T>> {
        let Some(node) = self.pool.allocate() else {
            return Err(Full(item));
        };
        unsafe { self.pool.write(node, item) };
        self.head.push(&self.pool, node as u32);
        Ok(())
    }

    /// Pops the most recently pushed item.
    pub fn pop(&self) -> Option<T> {
        let index = self.head.pop(&self.pool)?;
        let node = index as usize;
        unsafe {
            let item = self.pool.take(node);
            self.pool.release(node);
            Some(item)
        }
    }

    /// Atomically detaches everything currently on the stack.
    ///
    /// `DrainOrder::Lifo` yields newest-first, straight off the chain.
    /// `DrainOrder::Fifo` pays one O(n) reversal pass over the detached
    /// chain so iteration matches insertion order.
    pub fn drain(&self, order: DrainOrder) -> Drain<'_, T, P> {
        let mut head = idx_to_handle(self.head.take_all());
        if order == DrainOrder::Fifo {
            head = unsafe { chain::reverse(&self.pool, head) };
        }
        Drain::new(&self.pool, head)
    }

    /// Racy by nature: concurrent pushes and pops can invalidate the
    /// answer before it returns.
    pub fn is_empty(&self) -> bool {
        self.head.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.pool.capacity()
    }
}

impl<T: Send + 'static, P: StableIndexPool<T>> Drop for VersionedStack<T, P> {
    fn drop(&mut self) {
        self.drain(DrainOrder::Lifo);
    }
}
