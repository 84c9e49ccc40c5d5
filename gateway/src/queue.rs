//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Bounded per-session receive queue

use std::sync::{Mutex, MutexGuard};

/// Bounded circular buffer that drops its oldest entry when full
///
/// A queue of capacity `C` holds at most `C - 1` entries; one slot always
/// stays free so that full and empty are told apart by the cursors alone.
/// Every operation takes the internal lock for O(1) work only.
///
/// ```
/// use uvscp_gateway::EventQueue;
///
/// let queue = EventQueue::new(3);
/// queue.push(1);
/// queue.push(2);
/// queue.push(3);
/// assert_eq!(queue.used(), 2);
/// assert_eq!(queue.pop(), Some(2));
/// assert_eq!(queue.pop(), Some(3));
/// assert_eq!(queue.pop(), None);
/// ```
#[derive(Debug)]
pub struct EventQueue<T> {
    ring: Mutex<Ring<T>>,
}

#[derive(Debug)]
struct Ring<T> {
    slots: Box<[Option<T>]>,
    read: usize,
    write: usize,
}

impl<T> Ring<T> {
    fn advance(&self, index: usize) -> usize {
        (index + 1) % self.slots.len()
    }

    fn is_full(&self) -> bool {
        self.advance(self.write) == self.read
    }

    fn used(&self) -> usize {
        (self.write + self.slots.len() - self.read) % self.slots.len()
    }

    fn pop(&mut self) -> Option<T> {
        if self.read == self.write {
            return None;
        }
        let item = self.slots[self.read].take();
        self.read = self.advance(self.read);
        item
    }
}

impl<T> EventQueue<T> {
    /// Create a queue with `capacity` slots
    ///
    /// Capacities below two are raised to two so the queue can hold at least
    /// one entry.
    pub fn new(capacity: usize) -> Self {
        let slots = std::iter::repeat_with(|| None)
            .take(capacity.max(2))
            .collect();
        Self {
            ring: Mutex::new(Ring {
                slots,
                read: 0,
                write: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ring<T>> {
        self.ring.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append an entry, dropping the oldest one if the queue is full
    ///
    /// Returns `true` if an entry was dropped.
    pub fn push(&self, item: T) -> bool {
        let mut ring = self.lock();
        let overrun = ring.is_full();
        if overrun {
            ring.pop();
        }
        let write = ring.write;
        let next = ring.advance(write);
        ring.slots[write] = Some(item);
        ring.write = next;
        overrun
    }

    /// Remove and return the oldest entry
    pub fn pop(&self) -> Option<T> {
        self.lock().pop()
    }

    /// Number of entries held
    pub fn used(&self) -> usize {
        self.lock().used()
    }

    /// Check if the queue holds no entries
    pub fn is_empty(&self) -> bool {
        self.used() == 0
    }

    /// Total number of slots, including the reserved one
    pub fn capacity(&self) -> usize {
        self.lock().slots.len()
    }

    /// Discard all entries
    pub fn flush(&self) {
        let mut ring = self.lock();
        ring.slots.iter_mut().for_each(|slot| *slot = None);
        ring.read = 0;
        ring.write = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;
    use std::sync::Arc;

    #[test]
    fn test_empty_queue() {
        let queue: EventQueue<u32> = EventQueue::new(4);
        assert_eq!(queue.used(), 0);
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.capacity(), 4);
    }

    #[test]
    fn test_fifo_order() {
        let queue = EventQueue::new(8);
        for i in 0..5 {
            assert!(!queue.push(i));
        }
        assert_eq!(queue.used(), 5);
        let drained: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_overwrite_oldest() {
        let capacity = 5;
        let extra = 3;
        let queue = EventQueue::new(capacity);
        let mut overruns = 0;
        for i in 0..(capacity + extra) {
            if queue.push(i) {
                overruns += 1;
            }
        }
        assert_eq!(queue.used(), capacity - 1);
        assert_eq!(overruns, extra + 1);

        let drained: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(drained, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_wraparound() {
        let queue = EventQueue::new(3);
        for round in 0..10 {
            queue.push(round);
            assert_eq!(queue.pop(), Some(round));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_flush() {
        let queue = EventQueue::new(4);
        queue.push("a");
        queue.push("b");
        queue.flush();
        assert_eq!(queue.used(), 0);
        assert_eq!(queue.pop(), None);
        queue.push("c");
        assert_eq!(queue.pop(), Some("c"));
    }

    #[test]
    fn test_minimum_capacity() {
        let queue = EventQueue::new(0);
        assert_eq!(queue.capacity(), 2);
        queue.push(1);
        queue.push(2);
        assert_eq!(queue.used(), 1);
        assert_eq!(queue.pop(), Some(2));
    }

    #[test]
    fn test_concurrent_push() {
        let queue = Arc::new(EventQueue::new(1024));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let queue = queue.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        queue.push(t * 100 + i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(queue.used(), 400);
    }

    proptest! {
        #[test]
        fn prop_matches_bounded_deque(
            capacity in 2usize..16,
            ops in proptest::collection::vec(proptest::option::of(any::<u16>()), 0..200),
        ) {
            let queue = EventQueue::new(capacity);
            let mut model = VecDeque::new();
            for op in ops {
                match op {
                    Some(value) => {
                        let overrun = model.len() == capacity - 1;
                        if overrun {
                            model.pop_front();
                        }
                        model.push_back(value);
                        prop_assert_eq!(queue.push(value), overrun);
                    }
                    None => prop_assert_eq!(queue.pop(), model.pop_front()),
                }
                prop_assert_eq!(queue.used(), model.len());
            }
        }
    }
}
