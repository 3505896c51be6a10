//! # Ordered set keyed by an equality predicate.
//!
//! [`ComparisonSet`] is [`ComparisonMap`](super::ComparisonMap) with the
//! value elided: insertion order is preserved and `add` is a no-op for a
//! value already present under the comparator.

use super::Comparator;

/// Ordered unique values under a caller-supplied equality rule.
#[derive(Clone)]
pub struct ComparisonSet<T> {
    values: Vec<T>,
    comparator: Comparator<T>,
}

impl<T> ComparisonSet<T> {
    /// Creates an empty set with the given equality rule.
    pub fn new(comparator: Comparator<T>) -> Self {
        Self {
            values: Vec::new(),
            comparator,
        }
    }

    fn index_of(&self, value: &T) -> Option<usize> {
        self.values.iter().position(|v| (self.comparator)(v, value))
    }

    /// Adds `value` unless an equal value is already present.
    pub fn add(&mut self, value: T) {
        if self.index_of(&value).is_none() {
            self.values.push(value);
        }
    }

    /// Removes the value equal to `value`, returning it, or `None` if absent.
    pub fn remove(&mut self, value: &T) -> Option<T> {
        let i = self.index_of(value)?;
        Some(self.values.remove(i))
    }

    /// True if an equal value is present.
    pub fn has(&self, value: &T) -> bool {
        self.index_of(value).is_some()
    }

    /// Values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the set has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
