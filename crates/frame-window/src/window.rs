//! Generic sliding window

use std::collections::VecDeque;

/// Bounded FIFO. Appending past capacity evicts the oldest element.
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    data: VecDeque<T>,
    capacity: usize,
}

impl<T> SlidingWindow<T> {
    /// Create a window holding at most `capacity` elements
    pub fn new(capacity: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append an item, then evict the oldest if over capacity.
    /// Returns the evicted item, if any.
    pub fn push(&mut self, item: T) -> Option<T> {
        self.data.push_back(item);
        if self.data.len() > self.capacity {
            self.data.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.data.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent item
    pub fn back(&self) -> Option<&T> {
        self.data.back()
    }

    /// Oldest item
    pub fn front(&self) -> Option<&T> {
        self.data.front()
    }

    /// Iterate in arrival order (oldest first)
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}
