//! # Ordered map keyed by an equality predicate.
//!
//! [`ComparisonMap`] stores (key, value) pairs in insertion order. Keys are
//! unique under the comparator: [`ComparisonMap::add`] overwrites the value
//! of an existing key **in place** (no reorder), otherwise appends.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use queueboard::collections::ComparisonMap;
//!
//! let mut map: ComparisonMap<u32, &str> = ComparisonMap::new(Arc::new(|a, b| a == b));
//! map.add(1, "a");
//! map.add(2, "b");
//! map.add(1, "z"); // overwrite, position preserved
//!
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
//! assert_eq!(map.get(&1), Some(&"z"));
//! ```

use super::Comparator;

/// One (key, value) pair of a [`ComparisonMap`].
#[derive(Clone, Debug)]
pub struct MapEntry<K, V> {
    pub key: K,
    pub value: V,
}

/// Ordered list of (key, value) pairs with comparator-unique keys.
#[derive(Clone)]
pub struct ComparisonMap<K, V> {
    entries: Vec<MapEntry<K, V>>,
    comparator: Comparator<K>,
}

impl<K, V> ComparisonMap<K, V> {
    /// Creates an empty map with the given equality rule.
    pub fn new(comparator: Comparator<K>) -> Self {
        Self {
            entries: Vec::new(),
            comparator,
        }
    }

    fn index_of(&self, key: &K) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| (self.comparator)(&entry.key, key))
    }

    /// Inserts or overwrites. An existing key keeps its original position.
    pub fn add(&mut self, key: K, value: V) {
        match self.index_of(&key) {
            Some(i) => self.entries[i].value = value,
            None => self.entries.push(MapEntry { key, value }),
        }
    }

    /// Removes the entry for `key`, returning its value, or `None` if absent.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let i = self.index_of(key)?;
        Some(self.entries.remove(i).value)
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.index_of(key).map(|i| &self.entries[i].value)
    }

    /// Returns a mutable reference to the value for `key`, if present.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let i = self.index_of(key)?;
        Some(&mut self.entries[i].value)
    }

    /// Returns the value for `key`, or a caller-supplied default.
    pub fn get_or<'a>(&'a self, key: &K, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    /// True if `key` is present under the comparator.
    pub fn has(&self, key: &K) -> bool {
        self.index_of(key).is_some()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &MapEntry<K, V>> {
        self.entries.iter()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|e| &e.key)
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|e| &e.value)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
