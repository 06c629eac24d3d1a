use std::time::{Duration, Instant};

use crate::chain::Drain;
use crate::error::Full;
use crate::event::Event;
use crate::pool::{CachedPool, StableIndexPool};
use crate::stack::VersionedStack;
use crate::{BoundedPool, DrainOrder, WakePolicy};

/// [`VersionedStack`] plus a wait primitive, so consumers can park until
/// data arrives instead of spinning.
///
/// Pushes stay lock-free; the notification fast path is a single atomic
/// read when nobody is waiting. Several consumers may block at once; the
/// wake policy decides whether a push wakes one of them or all of them.
pub struct BlockingStack<T: Send + 'static, P: StableIndexPool<T> = CachedPool<T>> {
    stack: VersionedStack<T, P>,
    event: Event,
    wake: WakePolicy,
}

impl<T: Send + 'static> BlockingStack<T, BoundedPool<T>> {
    pub fn bounded(capacity: usize) -> Self {
        Self::with_pool(BoundedPool::new(capacity))
    }
}

impl<T: Send + 'static> BlockingStack<T, CachedPool<T>> {
    pub fn unbounded() -> Self {
        Self::with_pool(CachedPool::new())
    }
}

impl<T: Send + 'static, P: StableIndexPool<T>> BlockingStack<T, P> {
    pub fn with_pool(pool: P) -> Self {
        BlockingStack {
            stack: VersionedStack::with_pool(pool),
            event: Event::new(),
            wake: WakePolicy::One,
        }
    }

    /// Builder-style wake policy override.
    pub fn wake_policy(mut self, wake: WakePolicy) -> Self {
        self.wake = wake;
        self
    }

    /// Pushes and wakes parked consumers per the wake policy.
    pub fn push(&self, item: T) -> Result<(), Full<T>> {
        self.stack.push(item)?;
        self.event.notify(self.wake);
        Ok(())
    }

    /// Non-blocking pop.
    pub fn pop(&self) -> Option<T> {
        self.stack.pop()
    }

    /// Blocks until an item is available or `timeout` elapses.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        self.pop_deadline(Instant::now() + timeout)
    }

    pub fn pop_deadline(&self, deadline: Instant) -> Option<T> {
        loop {
            if let Some(item) = self.stack.pop() {
                return Some(item);
            }
            if !self
                .event
                .wait_deadline(deadline, || !self.stack.is_empty())
            {
                // Timed out. A push can still have raced the deadline, so
                // data beats the timeout if both are there.
                return self.stack.pop();
            }
            // Readiness was observed, but another consumer may have taken
            // the item in between; go around and re-check.
        }
    }

    /// Blocks until the stack is non-empty, then detaches everything, or
    /// returns `None` on timeout.
    pub fn drain_timeout(&self, timeout: Duration, order: DrainOrder) -> Option<Drain<'_, T, P>> {
        self.drain_deadline(Instant::now() + timeout, order)
    }

    pub fn drain_deadline(&self, deadline: Instant, order: DrainOrder) -> Option<Drain<'_, T, P>> {
        loop {
            if !self.stack.is_empty() {
                let drained = self.stack.drain(order);
                if !drained.is_empty() {
                    return Some(drained);
                }
                // Raced with another consumer; fall through to the wait.
            }
            if !self
                .event
                .wait_deadline(deadline, || !self.stack.is_empty())
            {
                let drained = self.stack.drain(order);
                return if drained.is_empty() {
                    None
                } else {
                    Some(drained)
                };
            }
        }
    }

    /// Non-blocking detach, same as the plain stack's `drain`.
    pub fn drain(&self, order: DrainOrder) -> Drain<'_, T, P> {
        self.stack.drain(order)
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.stack.capacity()
    }
}
