use std::time::{Duration, Instant};

use crate::error::Full;
use crate::event::Event;
use crate::pool::{CachedPool, PoolConfig, StableIndexPool};
use crate::queue::FifoQueue;
use crate::{BoundedPool, WakePolicy};

/// [`FifoQueue`] plus a wait primitive on the consumer side.
///
/// The consumer is single by contract (see [`FifoQueue::pop`]), so a push
/// always wakes at most one waiter. Producers keep the queue's wait-free
/// push; the notification fast path is one atomic read.
pub struct BlockingQueue<T: Send + 'static, P: StableIndexPool<T> = CachedPool<T>> {
    queue: FifoQueue<T, P>,
    event: Event,
}

impl<T: Send + 'static> BlockingQueue<T, BoundedPool<T>> {
    pub fn bounded(capacity: usize) -> Self {
        assert!(capacity > 0, "bounded queue needs capacity for one item");
        Self::with_pool(BoundedPool::new(capacity + 1))
    }
}

impl<T: Send + 'static> BlockingQueue<T, CachedPool<T>> {
    pub fn unbounded() -> Self {
        Self::with_pool(CachedPool::new())
    }

    pub fn with_config(config: PoolConfig) -> Self {
        Self::with_pool(CachedPool::with_config(config))
    }
}

impl<T: Send + 'static, P: StableIndexPool<T>> BlockingQueue<T, P> {
    pub fn with_pool(pool: P) -> Self {
        BlockingQueue {
            queue: FifoQueue::with_pool(pool),
            event: Event::new(),
        }
    }

    pub fn push(&self, item: T) -> Result<(), Full<T>> {
        self.queue.push(item)?;
        self.event.notify(WakePolicy::One);
        Ok(())
    }

    /// Non-blocking pop.
    pub fn pop(&self) -> Option<T> {
        self.queue.pop()
    }

    /// Blocks until an item is available or `timeout` elapses.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        self.pop_deadline(Instant::now() + timeout)
    }

    pub fn pop_deadline(&self, deadline: Instant) -> Option<T> {
        loop {
            if let Some(item) = self.queue.pop() {
                return Some(item);
            }
            if !self
                .event
                .wait_deadline(deadline, || !self.queue.is_empty())
            {
                // Timed out; take a push that raced the deadline if any.
                return self.queue.pop();
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.queue.capacity()
    }
}
