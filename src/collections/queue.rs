//! # Ordered queue with positional operations and equality-based lookup.
//!
//! [`ComparisonQueue`] backs the four user lists of the admission state
//! machine. Positional operations (`push`, `unshift`, `insert`, `shift`)
//! ignore the comparator; lookup operations (`index_of`, `has`, `remove`)
//! use it.
//!
//! ## Rules
//! - [`ComparisonQueue::insert`] clamps the index to `[0, len]`.
//! - [`ComparisonQueue::remove`] removes **all** equal occurrences and
//!   returns the **last** one removed.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use queueboard::collections::ComparisonQueue;
//!
//! let mut q: ComparisonQueue<u32> = ComparisonQueue::new(Arc::new(|a, b| a == b));
//! q.push(1);
//! q.push(2);
//! q.insert(9, 1);
//! assert_eq!(q.iter().copied().collect::<Vec<_>>(), vec![1, 9, 2]);
//! assert_eq!(q.shift(), Some(1));
//! ```

use super::Comparator;

/// Ordered sequence of values with a caller-supplied equality rule.
#[derive(Clone)]
pub struct ComparisonQueue<T> {
    values: Vec<T>,
    comparator: Comparator<T>,
}

impl<T> ComparisonQueue<T> {
    /// Creates an empty queue with the given equality rule.
    pub fn new(comparator: Comparator<T>) -> Self {
        Self {
            values: Vec::new(),
            comparator,
        }
    }

    /// Appends `value` to the back, returning its index.
    pub fn push(&mut self, value: T) -> usize {
        self.values.push(value);
        self.values.len() - 1
    }

    /// Prepends `value` to the front.
    pub fn unshift(&mut self, value: T) {
        self.values.insert(0, value);
    }

    /// Inserts `value` at `index`, clamped to `[0, len]`. Returns the
    /// position actually used.
    pub fn insert(&mut self, value: T, index: usize) -> usize {
        let index = index.min(self.values.len());
        self.values.insert(index, value);
        index
    }

    /// Removes and returns the front value, or `None` when empty.
    pub fn shift(&mut self) -> Option<T> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.values.remove(0))
        }
    }

    /// Returns the value at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    /// Index of the first value equal to `value` under the comparator.
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.values.iter().position(|v| (self.comparator)(value, v))
    }

    /// True if an equal value is present.
    pub fn has(&self, value: &T) -> bool {
        self.index_of(value).is_some()
    }

    /// Removes **all** occurrences equal to `value`; returns the last removed.
    pub fn remove(&mut self, value: &T) -> Option<T> {
        let mut removed = None;
        while let Some(i) = self.index_of(value) {
            removed = Some(self.values.remove(i));
        }
        removed
    }

    /// Values in order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    /// Maps each value through `f`, in order.
    pub fn map<R>(&self, f: impl FnMut(&T) -> R) -> Vec<R> {
        self.values.iter().map(f).collect()
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the queue has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
