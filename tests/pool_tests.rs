use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use rand::Rng;

use verq::{BoundedFifo, BoundedStack, DrainOrder, PoolConfig, UnboundedFifo, VersionedStack};

#[test]
fn test_bounded_pool_exact_capacity() {
    // Exactly k pushes succeed on a fresh container, the k+1-th fails.
    for k in [1usize, 2, 7, 64, 1000] {
        let stack = BoundedStack::bounded(k);
        for i in 0..k {
            assert!(stack.push(i).is_ok(), "push {} of {} failed", i, k);
        }
        assert!(stack.push(k).is_err(), "push past capacity {} succeeded", k);

        // Every release opens exactly one slot.
        stack.pop().unwrap();
        assert!(stack.push(k).is_ok());
        assert!(stack.push(k + 1).is_err());
    }
}

#[test]
fn test_fifo_pool_pays_for_dummy_itself() {
    // The dummy slot comes out of the pool, not the advertised capacity.
    for k in [1usize, 3, 16] {
        let queue = BoundedFifo::bounded(k);
        assert_eq!(queue.capacity(), Some(k));
        for i in 0..k {
            queue.push(i).unwrap();
        }
        assert!(queue.push(k).is_err());
    }
}

#[test]
fn test_cached_pool_reuses_before_growing() {
    // Small first segment, heavy churn: the free list must absorb it all.
    let queue = UnboundedFifo::with_config(PoolConfig {
        first_segment_capacity: 32,
    });
    for round in 0..10_000 {
        queue.push(round).unwrap();
        assert_eq!(queue.pop(), Some(round));
    }
    assert!(queue.is_empty());
}

#[test]
fn test_cached_pool_growth_under_load() {
    // Push far past the first segment before popping anything.
    let queue = UnboundedFifo::with_config(PoolConfig {
        first_segment_capacity: 32,
    });
    const N: usize = 10_000;
    for i in 0..N {
        queue.push(i).unwrap();
    }
    for i in 0..N {
        assert_eq!(queue.pop(), Some(i));
    }
    assert_eq!(queue.pop(), None);
}

#[test]
fn test_randomized_churn_bounded_stack() {
    const CAPACITY: usize = 16;
    const THREADS: usize = 4;
    const OPS: usize = 20_000;

    let stack = Arc::new(VersionedStack::bounded(CAPACITY));
    let barrier = Arc::new(Barrier::new(THREADS));
    let pushed = Arc::new(AtomicUsize::new(0));
    let popped = Arc::new(AtomicUsize::new(0));
    let mut handles = vec![];

    for _ in 0..THREADS {
        let stack = Arc::clone(&stack);
        let barrier = Arc::clone(&barrier);
        let pushed = Arc::clone(&pushed);
        let popped = Arc::clone(&popped);
        handles.push(thread::spawn(move || {
            let mut rng = rand::thread_rng();
            barrier.wait();
            for _ in 0..OPS {
                if rng.gen_range(0..2) == 0 {
                    if stack.push(rng.gen_range(0..u64::MAX)).is_ok() {
                        pushed.fetch_add(1, Ordering::Relaxed);
                    }
                } else if stack.pop().is_some() {
                    popped.fetch_add(1, Ordering::Relaxed);
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Conservation: whatever went in and did not come out is still there.
    let remaining = stack.drain(DrainOrder::Lifo).count();
    assert_eq!(
        pushed.load(Ordering::Relaxed),
        popped.load(Ordering::Relaxed) + remaining
    );
    assert!(remaining <= CAPACITY);
}

#[test]
fn test_node_reuse_keeps_payloads_intact() {
    // Round-trip distinct payloads through the same few slots and make
    // sure a recycled slot never leaks an old value.
    let stack = BoundedStack::bounded(2);
    for i in 0..1000u64 {
        stack.push(i * 2).unwrap();
        stack.push(i * 2 + 1).unwrap();
        assert_eq!(stack.pop(), Some(i * 2 + 1));
        assert_eq!(stack.pop(), Some(i * 2));
        assert_eq!(stack.pop(), None);
    }
}
