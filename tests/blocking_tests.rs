use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use verq::{
    BlockingQueue, BlockingStack, BoundedBlockingQueue, DrainOrder, UnboundedBlockingQueue,
    UnboundedBlockingStack, WakePolicy,
};

// Generous upper bound for scheduler noise on loaded CI machines.
const SLACK: Duration = Duration::from_millis(500);

#[test]
fn test_stack_pop_timeout_expires() {
    let stack = UnboundedBlockingStack::<i32>::unbounded();
    let timeout = Duration::from_millis(150);

    let started = Instant::now();
    assert_eq!(stack.pop_timeout(timeout), None);
    let elapsed = started.elapsed();

    // Never earlier than the timeout, and not wildly later.
    assert!(elapsed >= timeout, "woke early after {:?}", elapsed);
    assert!(elapsed < timeout + SLACK, "woke late after {:?}", elapsed);
}

#[test]
fn test_stack_drain_timeout_expires() {
    let stack = UnboundedBlockingStack::<i32>::unbounded();
    let timeout = Duration::from_millis(150);

    let started = Instant::now();
    assert!(stack.drain_timeout(timeout, DrainOrder::Fifo).is_none());
    assert!(started.elapsed() >= timeout);
}

#[test]
fn test_stack_wakes_on_push() {
    let stack = Arc::new(UnboundedBlockingStack::unbounded());
    let barrier = Arc::new(Barrier::new(2));

    let consumer = {
        let stack = Arc::clone(&stack);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            let started = Instant::now();
            let item = stack.pop_timeout(Duration::from_secs(5));
            (item, started.elapsed())
        })
    };

    barrier.wait();
    thread::sleep(Duration::from_millis(100));
    stack.push(7).unwrap();

    let (item, elapsed) = consumer.join().unwrap();
    assert_eq!(item, Some(7));
    // Must return on the push, nowhere near the 5s timeout.
    assert!(elapsed < Duration::from_secs(2), "waited {:?}", elapsed);
}

#[test]
fn test_stack_drain_returns_pushed_batch() {
    let stack = Arc::new(UnboundedBlockingStack::unbounded());
    let barrier = Arc::new(Barrier::new(2));

    let consumer = {
        let stack = Arc::clone(&stack);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            stack
                .drain_timeout(Duration::from_secs(5), DrainOrder::Fifo)
                .map(|drained| drained.collect::<Vec<i32>>())
        })
    };

    barrier.wait();
    thread::sleep(Duration::from_millis(50));
    stack.push(1).unwrap();

    let drained = consumer.join().unwrap().expect("drain timed out");
    assert!(!drained.is_empty());
    assert_eq!(drained[0], 1);
}

#[test]
fn test_wake_all_reaches_every_waiter() {
    const WAITERS: usize = 3;

    let stack = Arc::new(
        UnboundedBlockingStack::unbounded().wake_policy(WakePolicy::All),
    );
    let barrier = Arc::new(Barrier::new(WAITERS + 1));
    let woken = Arc::new(AtomicUsize::new(0));
    let mut handles = vec![];

    for _ in 0..WAITERS {
        let stack = Arc::clone(&stack);
        let barrier = Arc::clone(&barrier);
        let woken = Arc::clone(&woken);
        handles.push(thread::spawn(move || {
            barrier.wait();
            // Every waiter eventually gets one item.
            let item = stack.pop_timeout(Duration::from_secs(5));
            if item.is_some() {
                woken.fetch_add(1, Ordering::SeqCst);
            }
        }));
    }

    barrier.wait();
    thread::sleep(Duration::from_millis(100));
    for i in 0..WAITERS {
        stack.push(i).unwrap();
    }

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(woken.load(Ordering::SeqCst), WAITERS);
}

#[test]
fn test_queue_pop_timeout_expires() {
    let queue = UnboundedBlockingQueue::<i32>::unbounded();
    let timeout = Duration::from_millis(150);

    let started = Instant::now();
    assert_eq!(queue.pop_timeout(timeout), None);
    let elapsed = started.elapsed();
    assert!(elapsed >= timeout);
    assert!(elapsed < timeout + SLACK);
}

#[test]
fn test_queue_wakes_on_push() {
    let queue = Arc::new(UnboundedBlockingQueue::unbounded());
    let barrier = Arc::new(Barrier::new(2));

    let consumer = {
        let queue = Arc::clone(&queue);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            queue.pop_timeout(Duration::from_secs(5))
        })
    };

    barrier.wait();
    thread::sleep(Duration::from_millis(100));
    queue.push(11).unwrap();
    assert_eq!(consumer.join().unwrap(), Some(11));
}

#[test]
fn test_queue_keeps_fifo_order_through_waits() {
    let queue = Arc::new(UnboundedBlockingQueue::unbounded());

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut received = Vec::new();
            while received.len() < 100 {
                match queue.pop_timeout(Duration::from_secs(5)) {
                    Some(value) => received.push(value),
                    None => break,
                }
            }
            received
        })
    };

    for i in 0..100 {
        queue.push(i).unwrap();
        if i % 10 == 0 {
            thread::sleep(Duration::from_millis(1));
        }
    }

    assert_eq!(consumer.join().unwrap(), (0..100).collect::<Vec<_>>());
}

#[test]
fn test_bounded_blocking_queue_capacity() {
    let queue = BoundedBlockingQueue::bounded(2);
    assert_eq!(queue.capacity(), Some(2));

    queue.push(1).unwrap();
    queue.push(2).unwrap();
    assert!(queue.push(3).is_err());
    assert_eq!(queue.pop_timeout(Duration::from_millis(10)), Some(1));
    queue.push(3).unwrap();
    assert_eq!(queue.pop(), Some(2));
    assert_eq!(queue.pop(), Some(3));
}

#[test]
fn test_deadline_already_passed() {
    let queue = BlockingQueue::<i32>::unbounded();
    let stack = BlockingStack::<i32>::unbounded();

    // An expired deadline degrades to a non-blocking pop.
    let past = Instant::now() - Duration::from_millis(1);
    assert_eq!(queue.pop_deadline(past), None);
    assert_eq!(stack.pop_deadline(past), None);

    queue.push(5).unwrap();
    stack.push(6).unwrap();
    assert_eq!(queue.pop_deadline(past), Some(5));
    assert_eq!(stack.pop_deadline(past), Some(6));
}
