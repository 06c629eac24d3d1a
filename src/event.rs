use std::sync::atomic::{fence, AtomicUsize, Ordering};
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use crate::WakePolicy;

/// Wait/notify primitive behind the blocking containers.
///
/// Producers stay lock-free unless a consumer is actually parked: `notify`
/// reads the waiter count and returns without touching the mutex when it
/// is zero. The SeqCst fences pair the producer's "data then count" order
/// against the waiter's "count then data" order, so either the waiter sees
/// the data or the producer sees the waiter.
pub(crate) struct Event {
    mutex: Mutex<()>,
    cond: Condvar,
    waiters: AtomicUsize,
}

impl Event {
    pub(crate) fn new() -> Self {
        Event {
            mutex: Mutex::new(()),
            cond: Condvar::new(),
            waiters: AtomicUsize::new(0),
        }
    }

    /// Callers publish their data before calling this.
    pub(crate) fn notify(&self, policy: WakePolicy) {
        fence(Ordering::SeqCst);
        if self.waiters.load(Ordering::Relaxed) == 0 {
            return;
        }
        // Taking the mutex orders this notify against a waiter that has
        // registered but not yet parked: it holds the lock from the
        // readiness check until the wait itself.
        let _guard = self.mutex.lock();
        match policy {
            WakePolicy::One => {
                self.cond.notify_one();
            }
            WakePolicy::All => {
                self.cond.notify_all();
            }
        };
    }

    /// Blocks until `ready` observes true or `deadline` passes. Returns
    /// whether readiness was observed. Wakes are only hints: the predicate
    /// is re-checked after every wake, spurious or not.
    pub(crate) fn wait_deadline(&self, deadline: Instant, mut ready: impl FnMut() -> bool) -> bool {
        let mut guard = self.mutex.lock();
        self.waiters.fetch_add(1, Ordering::Relaxed);
        fence(Ordering::SeqCst);
        let observed = loop {
            if ready() {
                break true;
            }
            if self.cond.wait_until(&mut guard, deadline).timed_out() {
                // One last look; a push may have landed right at the edge.
                break ready();
            }
        };
        self.waiters.fetch_sub(1, Ordering::Relaxed);
        observed
    }
}
