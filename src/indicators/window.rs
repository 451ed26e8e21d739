//! Fixed-capacity running-sum window
//!
//! Circular storage of the last `period` values plus their sum. Pushing into a
//! window that is not yet full is O(1). Evicting rebuilds the sum from the held
//! values, oldest first, so the sum never carries rounding error from a value
//! that has already left the window and always equals a fresh re-sum.

use crate::{AnalysisError, Period, Result};

/// Bounded circular buffer with a running sum.
#[derive(Debug, Clone)]
pub struct RunningWindow {
    buf: Vec<f64>,
    head: usize,
    len: usize,
    sum: f64,
}

impl RunningWindow {
    pub fn new(period: Period) -> Self {
        Self {
            buf: vec![0.0; period.get()],
            head: 0,
            len: 0,
            sum: 0.0,
        }
    }

    /// Fixed capacity (the period this window was built with)
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    #[inline]
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Mean of the held values, only once the window is full
    #[inline]
    pub fn mean(&self) -> Option<f64> {
        self.is_full().then(|| self.sum / self.capacity() as f64)
    }

    /// Append a value, evicting the oldest one when at capacity.
    pub fn push(&mut self, value: f64) {
        if self.is_full() {
            self.evict();
        }
        let tail = (self.head + self.len) % self.capacity();
        self.buf[tail] = value;
        self.len += 1;
        self.sum += value;
    }

    /// Remove and return the oldest value.
    pub fn dequeue(&mut self) -> Result<f64> {
        if self.is_empty() {
            return Err(AnalysisError::EmptyWindow);
        }
        Ok(self.evict())
    }

    /// Drop the oldest value and re-sum the rest. Caller ensures `len > 0`.
    fn evict(&mut self) -> f64 {
        let value = self.buf[self.head];
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        self.sum = self.iter().sum();
        value
    }

    /// Held values, oldest first
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len).map(move |i| self.buf[(self.head + i) % self.capacity()])
    }
}
