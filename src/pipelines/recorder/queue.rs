// SPDX-License-Identifier: GPL-3.0-only

//! Mutex-guarded FIFO shared between the recorder and one worker
//!
//! The lock is held only for push/pop. An item popped by the worker stays
//! counted as pending until the worker calls [`WorkQueue::finish`] or hands
//! it back with [`WorkQueue::requeue`], so `pending() == 0` means the
//! pipeline has nothing left to do.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    in_flight: usize,
}

#[derive(Debug)]
pub struct WorkQueue<T> {
    state: Mutex<QueueState<T>>,
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                in_flight: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        // Queue contents stay consistent even if a holder panicked
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an item at the tail
    pub fn push(&self, item: T) {
        self.lock().items.push_back(item);
    }

    /// Append several items under one lock
    pub fn extend<I: IntoIterator<Item = T>>(&self, items: I) {
        self.lock().items.extend(items);
    }

    /// Take the head item, marking it in flight
    pub fn pop(&self) -> Option<T> {
        let mut state = self.lock();
        let item = state.items.pop_front()?;
        state.in_flight += 1;
        Some(item)
    }

    /// Mark a popped item as done
    pub fn finish(&self) {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }

    /// Return a popped item to the tail of the queue
    pub fn requeue(&self, item: T) {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        state.items.push_back(item);
    }

    /// Items waiting in the queue, excluding in-flight work
    pub fn queued(&self) -> usize {
        self.lock().items.len()
    }

    /// Items waiting plus items being processed
    pub fn pending(&self) -> usize {
        let state = self.lock();
        state.items.len() + state.in_flight
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let queue = WorkQueue::new();
        queue.extend([1, 2, 3]);
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_in_flight_counts_as_pending() {
        let queue = WorkQueue::new();
        queue.push("a");
        let item = queue.pop().unwrap();
        assert_eq!(item, "a");
        assert_eq!(queue.queued(), 0);
        assert_eq!(queue.pending(), 1);

        queue.finish();
        assert!(queue.is_idle());
    }

    #[test]
    fn test_requeue_goes_to_tail() {
        let queue = WorkQueue::new();
        queue.extend([1, 2]);
        let failed = queue.pop().unwrap();
        queue.requeue(failed);

        assert_eq!(queue.pending(), 2);
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(1));
    }

    #[test]
    fn test_finish_without_pop_is_harmless() {
        let queue: WorkQueue<u8> = WorkQueue::new();
        queue.finish();
        assert_eq!(queue.pending(), 0);
    }
}
