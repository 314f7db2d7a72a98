//! Fixed-capacity ring buffer for rolling statistics

use std::collections::VecDeque;

/// Keeps the most recent `capacity` values, oldest first
///
/// Pushing into a full window evicts the oldest value. The buffer is
/// allocated once at construction.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buf: VecDeque<T>,
    capacity: usize,
}

impl<T: Copy> RollingWindow<T> {
    /// `capacity` is clamped to at least 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn push(&mut self, value: T) {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(value);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent value
    #[inline]
    pub fn last(&self) -> Option<T> {
        self.buf.back().copied()
    }

    /// Value `back` steps before the most recent one (0 is the most recent)
    #[inline]
    pub fn from_end(&self, back: usize) -> Option<T> {
        let len = self.buf.len();
        if back >= len {
            return None;
        }
        self.buf.get(len - 1 - back).copied()
    }

    /// The most recent `n` values, oldest first (fewer if the window is shorter)
    pub fn tail(&self, n: usize) -> impl Iterator<Item = T> + Clone + '_ {
        let skip = self.buf.len().saturating_sub(n);
        self.buf.iter().skip(skip).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + Clone + '_ {
        self.buf.iter().copied()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
