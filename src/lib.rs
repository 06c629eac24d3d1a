pub mod chain;
pub mod error;
mod event;
pub mod pool;
pub mod queue;
pub mod stack;

pub use chain::Drain;
pub use error::Full;
pub use pool::{BoundedPool, CachedPool, HeapPool, NodePool, PoolConfig, StableIndexPool};
pub use queue::{BlockingQueue, FifoQueue, MpscQueue};
pub use stack::{BlockingStack, VersionedStack};

/// Iteration order of a detached chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOrder {
    /// Newest first, the chain as detached.
    Lifo,
    /// Insertion order, one reversal pass over the detached chain.
    Fifo,
}

/// How many parked consumers a push wakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakePolicy {
    One,
    All,
}

// Common interface for the stack containers.
pub trait ConcurrentStack<T: Send>: Send + Sync + 'static {
    type PushError;

    fn push(&self, item: T) -> Result<(), Self::PushError>;
    fn pop(&self) -> Option<T>;
    fn is_empty(&self) -> bool;
}

// Common interface for the FIFO queue containers. `pop` carries the
// single-consumer contract of the concrete type.
pub trait ConcurrentFifo<T: Send>: Send + Sync + 'static {
    type PushError;

    fn push(&self, item: T) -> Result<(), Self::PushError>;
    fn pop(&self) -> Option<T>;
    fn is_empty(&self) -> bool;
    fn is_full(&self) -> bool;
}

impl<T, P> ConcurrentStack<T> for VersionedStack<T, P>
where
    T: Send + 'static,
    P: StableIndexPool<T> + 'static,
{
    type PushError = Full<T>;

    fn push(&self, item: T) -> Result<(), Full<T>> {
        VersionedStack::push(self, item)
    }

    fn pop(&self) -> Option<T> {
        VersionedStack::pop(self)
    }

    fn is_empty(&self) -> bool {
        VersionedStack::is_empty(self)
    }
}

impl<T, P> ConcurrentStack<T> for BlockingStack<T, P>
where
    T: Send + 'static,
    P: StableIndexPool<T> + 'static,
{
    type PushError = Full<T>;

    fn push(&self, item: T) -> Result<(), Full<T>> {
        BlockingStack::push(self, item)
    }

    fn pop(&self) -> Option<T> {
        BlockingStack::pop(self)
    }

    fn is_empty(&self) -> bool {
        BlockingStack::is_empty(self)
    }
}

impl<T, P> ConcurrentFifo<T> for FifoQueue<T, P>
where
    T: Send + 'static,
    P: StableIndexPool<T> + 'static,
{
    type PushError = Full<T>;

    fn push(&self, item: T) -> Result<(), Full<T>> {
        FifoQueue::push(self, item)
    }

    fn pop(&self) -> Option<T> {
        FifoQueue::pop(self)
    }

    fn is_empty(&self) -> bool {
        FifoQueue::is_empty(self)
    }

    fn is_full(&self) -> bool {
        FifoQueue::is_full(self)
    }
}

impl<T, P> ConcurrentFifo<T> for BlockingQueue<T, P>
where
    T: Send + 'static,
    P: StableIndexPool<T> + 'static,
{
    type PushError = Full<T>;

    fn push(&self, item: T) -> Result<(), Full<T>> {
        BlockingQueue::push(self, item)
    }

    fn pop(&self) -> Option<T> {
        BlockingQueue::pop(self)
    }

    fn is_empty(&self) -> bool {
        BlockingQueue::is_empty(self)
    }

    fn is_full(&self) -> bool {
        BlockingQueue::is_full(self)
    }
}

// The usable pool/algorithm pairings, spelled out.
pub type BoundedStack<T> = VersionedStack<T, BoundedPool<T>>;
pub type UnboundedStack<T> = VersionedStack<T, CachedPool<T>>;
pub type BoundedBlockingStack<T> = BlockingStack<T, BoundedPool<T>>;
pub type UnboundedBlockingStack<T> = BlockingStack<T, CachedPool<T>>;
pub type BoundedFifo<T> = FifoQueue<T, BoundedPool<T>>;
pub type UnboundedFifo<T> = FifoQueue<T, CachedPool<T>>;
pub type BoundedBlockingQueue<T> = BlockingQueue<T, BoundedPool<T>>;
pub type UnboundedBlockingQueue<T> = BlockingQueue<T, CachedPool<T>>;
