//! # Admission events emitted by the slot queue.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Membership events**: a user entered or left the admission system
//! - **Transition events**: movement between queue/pending/active
//! - **Board events**: the public board message was re-rendered
//!
//! The [`Event`] struct carries metadata such as the subject user, the list
//! involved, and skip/timeout pass outcomes.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use queueboard::events::{Event, EventKind, PassKind};
//! use queueboard::platform::UserRef;
//!
//! let ev = Event::new(EventKind::UserPassed)
//!     .with_user(UserRef::new("1", "@ada"))
//!     .with_pass(PassKind::Skip, true);
//!
//! assert_eq!(ev.kind, EventKind::UserPassed);
//! assert_eq!(ev.returned, Some(true));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::platform::UserRef;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Which internal list an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueList {
    Available,
    Active,
    Pending,
    Queue,
}

impl QueueList {
    /// Short stable label (snake_case) for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            QueueList::Available => "available",
            QueueList::Active => "active",
            QueueList::Pending => "pending",
            QueueList::Queue => "queue",
        }
    }
}

/// How a user declined (or lost) an offered slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Voluntary decline via the skip option.
    Skip,
    /// The accept/skip prompt expired.
    Timeout,
}

impl PassKind {
    /// Short stable label (snake_case) for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            PassKind::Skip => "skip",
            PassKind::Timeout => "timeout",
        }
    }
}

/// Classification of admission events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Membership events ===
    /// A user entered the admission system (board reaction collected).
    ///
    /// Sets: `user`, `at`, `seq`.
    UserAdded,

    /// A user left the admission system (reaction removed, or dropped after
    /// exhausting a retry limit).
    ///
    /// Sets: `user`, `list` (the list they were removed from, if any),
    /// `at`, `seq`.
    UserRemoved,

    // === Transition events ===
    /// A user was appended to the waiting queue.
    ///
    /// Sets: `user`, `at`, `seq`.
    UserQueued,

    /// A user was promoted to pending and prompted to accept.
    ///
    /// Sets: `user`, `at`, `seq`.
    UserPending,

    /// A user accepted a slot and became active.
    ///
    /// Sets: `user`, `at`, `seq`.
    UserActive,

    /// A pending user skipped or timed out.
    ///
    /// Sets: `user`, `pass` (skip vs timeout), `returned` (whether they
    /// were reinserted near the front of the queue or dropped entirely),
    /// `at`, `seq`.
    UserPassed,

    // === Board events ===
    /// The board message body was regenerated and written.
    ///
    /// Sets: `at`, `seq`.
    BoardUpdated,
}

/// Admission event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Subject user, if applicable.
    pub user: Option<UserRef>,
    /// List involved (for removals).
    pub list: Option<QueueList>,
    /// Skip vs timeout (for [`EventKind::UserPassed`]).
    pub pass: Option<PassKind>,
    /// Whether a passed user was returned to the queue.
    pub returned: Option<bool>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and
    /// next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            user: None,
            list: None,
            pass: None,
            returned: None,
        }
    }

    /// Attaches the subject user.
    #[inline]
    pub fn with_user(mut self, user: UserRef) -> Self {
        self.user = Some(user);
        self
    }

    /// Attaches the list involved.
    #[inline]
    pub fn with_list(mut self, list: QueueList) -> Self {
        self.list = Some(list);
        self
    }

    /// Attaches a pass outcome.
    #[inline]
    pub fn with_pass(mut self, pass: PassKind, returned: bool) -> Self {
        self.pass = Some(pass);
        self.returned = Some(returned);
        self
    }
}
