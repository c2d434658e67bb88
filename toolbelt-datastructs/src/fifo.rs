//! Locked first-in first-out queue.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe FIFO: `pop` returns the oldest pushed value.
pub struct Fifo<T> {
    queue: RwLock<VecDeque<T>>,
}

impl<T> Default for Fifo<T> {
    fn default() -> Self {
        Self {
            queue: RwLock::new(VecDeque::new()),
        }
    }
}

impl<T> Fifo<T> {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, VecDeque<T>> {
        self.queue.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, VecDeque<T>> {
        self.queue.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `value` behind every queued value.
    pub fn push(&self, value: T) {
        self.write().push_back(value);
    }

    /// Remove and return the oldest value.
    pub fn pop(&self) -> Option<T> {
        self.write().pop_front()
    }

    /// Oldest value without removing it.
    pub fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        self.read().front().cloned()
    }

    /// Values currently queued.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

/// Newest to oldest, joined with `->`.
impl<T: fmt::Display> fmt::Display for Fifo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.read();
        for (i, v) in queue.iter().rev().enumerate() {
            if i > 0 {
                write!(f, "->")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl<T: fmt::Debug> fmt::Debug for Fifo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.read().iter()).finish()
    }
}
