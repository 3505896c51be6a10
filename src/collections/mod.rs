//! Equality-keyed containers.
//!
//! Ordered collections keyed by a caller-supplied equality predicate rather
//! than `Hash`/`Eq`. User and emoji handles are opaque platform objects whose
//! identity is a *comparison rule* (id equality; custom-emoji vs. textual
//! identifier), so hashing is not available at the seams where these are used.
//!
//! ## Contents
//! - [`ComparisonMap`] — ordered (key, value) pairs, unique keys
//! - [`ComparisonSet`] — ordered unique values
//! - [`ComparisonQueue`] — ordered sequence with positional operations
//!
//! ## Rules
//! - Lookup is linear; correctness, not throughput, is the contract
//!   (option lists and user queues stay small).
//! - All operations are total: no error conditions, absent keys return
//!   `None` or a caller-supplied default.

mod map;
mod queue;
mod set;

pub use map::{ComparisonMap, MapEntry};
pub use queue::ComparisonQueue;
pub use set::ComparisonSet;

use std::sync::Arc;

/// Caller-supplied equality predicate.
///
/// Stored as an `Arc` so containers sharing one rule stay cheaply cloneable.
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;
