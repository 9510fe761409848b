use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Ordered, de-duplicating queue shared between producer and consumer threads.
///
/// Producers `push`; consumers block in the `wait_*` calls until an item shows
/// up or the timeout runs out. Every push wakes all waiters.
#[derive(Debug)]
pub struct RequestQueue<T> {
    items: Mutex<VecDeque<T>>,
    ready: Condvar,
}

impl<T> Default for RequestQueue<T> {
    fn default() -> Self {
        RequestQueue {
            items: Mutex::new(VecDeque::new()),
            ready: Condvar::new(),
        }
    }
}

impl<T: Clone + PartialEq> RequestQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `item` unless an equal item is already queued. Returns whether it
    /// was added.
    pub fn push(&self, item: T) -> bool {
        let mut items = self.items.lock();
        if items.contains(&item) {
            return false;
        }
        items.push_back(item);
        self.ready.notify_all();
        true
    }

    /// Blocks until the queue holds something. Returns false on timeout.
    pub fn wait_non_empty(&self, timeout: Duration) -> bool {
        let mut items = self.items.lock();
        self.wait_locked(&mut items, timeout);
        !items.is_empty()
    }

    /// Waits like `wait_non_empty`, then removes the newest item.
    pub fn wait_pop_back(&self, timeout: Duration) -> Option<T> {
        let mut items = self.items.lock();
        self.wait_locked(&mut items, timeout);
        items.pop_back()
    }

    /// Lets `pick` inspect the queue under the lock and removes the item at the
    /// index it returns, along with whatever else it decided.
    pub fn take_with<R, F>(&self, pick: F) -> Option<(T, R)>
    where
        F: FnOnce(&[T]) -> Option<(usize, R)>,
    {
        let mut items = self.items.lock();
        let (index, decision) = pick(items.make_contiguous())?;
        let item = items.remove(index)?;
        Some((item, decision))
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.items.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    fn wait_locked(&self, items: &mut parking_lot::MutexGuard<'_, VecDeque<T>>, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        while items.is_empty() {
            if self.ready.wait_until(items, deadline).timed_out() {
                break;
            }
        }
    }
}
