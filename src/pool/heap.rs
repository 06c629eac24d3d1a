use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::pool::{NodePool, NIL};

struct HeapNode<T> {
    next: AtomicUsize,
    item: UnsafeCell<MaybeUninit<T>>,
}

/// One heap allocation per node, returned to the heap on release.
///
/// No free-list cache and no capacity limit; a failed heap allocation
/// aborts the process like any other Rust allocation failure. Handles are
/// node addresses, so this pool cannot back the versioned-CAS containers
/// (it is not a [`StableIndexPool`](crate::pool::StableIndexPool)): a
/// released node is gone and a stale link read would be a use after free.
pub struct HeapPool<T> {
    _items: PhantomData<T>,
}

unsafe impl<T: Send> Send for HeapPool<T> {}
unsafe impl<T: Send> Sync for HeapPool<T> {}

impl<T: Send + 'static> HeapPool<T> {
    pub fn new() -> Self {
        HeapPool {
            _items: PhantomData,
        }
    }
}

impl<T: Send + 'static> Default for HeapPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn node_ptr<T>(handle: usize) -> *mut HeapNode<T> {
    handle as *mut HeapNode<T>
}

unsafe impl<T: Send + 'static> NodePool<T> for HeapPool<T> {
    fn allocate(&self) -> Option<usize> {
        let node = Box::new(HeapNode {
            next: AtomicUsize::new(NIL),
            item: UnsafeCell::new(MaybeUninit::<T>::uninit()),
        });
        Some(Box::into_raw(node) as usize)
    }

    unsafe fn write(&self, node: usize, item: T) {
        (*(*node_ptr::<T>(node)).item.get()).write(item);
    }

    unsafe fn take(&self, node: usize) -> T {
        (*(*node_ptr::<T>(node)).item.get()).assume_init_read()
    }

    unsafe fn link(&self, node: usize) -> usize {
        (*node_ptr::<T>(node)).next.load(Ordering::Acquire)
    }

    unsafe fn set_link(&self, node: usize, next: usize) {
        (*node_ptr::<T>(node)).next.store(next, Ordering::Release);
    }

    unsafe fn release(&self, node: usize) {
        drop(Box::from_raw(node_ptr::<T>(node)));
    }

    fn capacity(&self) -> Option<usize> {
        None
    }
}
