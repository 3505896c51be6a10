//! # Per-queue configuration.
//!
//! Provides [`QueueConfig`] — centralized settings for one slot queue.
//!
//! ## Field semantics
//! - `capacity`: fixed slot count, or demand-driven (capacity equals the
//!   size of the available pool)
//! - `pending_timeout`: how long a promoted user may sit on the
//!   accept/skip prompt before passing by timeout
//! - `max_pending_timeouts` / `max_pending_skips`: per-user retry maxima;
//!   reaching one drops the user from the queue system entirely
//! - `message_debounce`: coalescing window shared by board rewrites and
//!   reaction reconciliation
//! - `existing_message`: resume an existing board instead of posting a new
//!   one
//!
//! ## Notes
//! All fields are public for flexibility. [`QueueConfig::validate`] is the
//! single construction-time check: a queue must either have a fixed
//! non-zero capacity or be demand-driven.

use std::sync::Arc;
use std::time::Duration;

use crate::error::QueueError;
use crate::events::QueueList;
use crate::options::ReactionOption;
use crate::platform::{Emoji, MessageRef, UserRef};

use super::PassCounts;

/// How the number of slots is determined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capacity {
    /// A configured number of slots.
    Fixed(usize),
    /// As many slots as users currently in the available pool.
    Demand,
}

/// Renders a prompt body for one user ("accept?" / "accept or skip?").
pub type PromptTemplate = Arc<dyn Fn(&UserRef, PassCounts) -> String + Send + Sync>;

/// Styles a user's name for display in a board column.
pub type UserToString = Arc<dyn Fn(&UserRef, QueueList) -> String + Send + Sync>;

/// Configuration for one slot queue.
#[derive(Clone)]
pub struct QueueConfig {
    /// Board title.
    pub title: String,
    /// Capacity mode and value.
    pub capacity: Capacity,

    /// Time a user may hold a pending prompt before timing out.
    ///
    /// Only armed while someone is waiting behind them; an accept-only
    /// prompt never expires.
    pub pending_timeout: Duration,
    /// Timeouts allowed before a user is dropped entirely.
    pub max_pending_timeouts: u32,
    /// Skips allowed before a user is dropped entirely.
    pub max_pending_skips: u32,

    /// Board button to join/leave the queue.
    pub queue_emoji: Emoji,
    /// Board button to join/leave the available pool (demand capacity).
    pub available_emoji: Emoji,
    /// Prompt button to accept an open slot.
    pub accept_emoji: Emoji,
    /// Prompt button to skip an open slot.
    pub skip_emoji: Emoji,

    /// Coalescing window for board rewrites and reconciliation passes.
    pub message_debounce: Duration,
    /// Event bus ring buffer size.
    pub bus_capacity: usize,

    /// Resume this board message instead of posting a new one.
    pub existing_message: Option<MessageRef>,
    /// Extra reaction options surfaced on the board.
    pub additional_options: Vec<ReactionOption>,

    /// Prompt body when the user can accept or skip.
    pub accept_or_skip_message: PromptTemplate,
    /// Prompt body when the user can only accept (no one waiting behind).
    pub accept_message: PromptTemplate,
    /// Display transform for user names on the board.
    pub user_to_string: UserToString,
}

impl QueueConfig {
    /// Settings for a titled queue; everything else defaults.
    pub fn new(title: impl Into<String>, capacity: Capacity) -> Self {
        Self {
            capacity,
            title: title.into(),
            ..Self::default()
        }
    }

    /// Construction-time check: a queue must either be demand-driven or
    /// have a non-zero fixed capacity.
    pub fn validate(&self) -> Result<(), QueueError> {
        match self.capacity {
            Capacity::Fixed(0) => Err(QueueError::InvalidCapacity),
            _ => Ok(()),
        }
    }

    /// Retry maximum for one pass kind.
    pub(crate) fn max_for(&self, kind: crate::events::PassKind) -> u32 {
        match kind {
            crate::events::PassKind::Skip => self.max_pending_skips,
            crate::events::PassKind::Timeout => self.max_pending_timeouts,
        }
    }
}

impl Default for QueueConfig {
    /// Default configuration:
    ///
    /// - `capacity = Fixed(1)`
    /// - `pending_timeout = 600s`
    /// - `max_pending_timeouts = 1`, `max_pending_skips = 3`
    /// - emoji: 🎫 queue, 📋 available, ✔️ accept, ✖️ skip
    /// - `message_debounce = 300ms`, `bus_capacity = 1024`
    /// - pending users italicized on the board
    fn default() -> Self {
        Self {
            title: String::new(),
            capacity: Capacity::Fixed(1),
            pending_timeout: Duration::from_secs(600),
            max_pending_timeouts: 1,
            max_pending_skips: 3,
            queue_emoji: Emoji::unicode("🎫"),
            available_emoji: Emoji::unicode("📋"),
            accept_emoji: Emoji::unicode("✔️"),
            skip_emoji: Emoji::unicode("✖️"),
            message_debounce: Duration::from_millis(300),
            bus_capacity: 1024,
            existing_message: None,
            additional_options: Vec::new(),
            accept_or_skip_message: Arc::new(|user, _counts| {
                format!("{user} - Accept newly active slot or return to the front of the queue?")
            }),
            accept_message: Arc::new(|user, _counts| format!("{user} - Accept newly active slot?")),
            user_to_string: Arc::new(|user, list| {
                if list == QueueList::Pending {
                    format!("_{user}_")
                } else {
                    user.to_string()
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_zero_capacity_is_rejected() {
        let config = QueueConfig::new("q", Capacity::Fixed(0));
        assert!(matches!(
            config.validate(),
            Err(QueueError::InvalidCapacity)
        ));
    }

    #[test]
    fn test_demand_capacity_is_valid() {
        assert!(QueueConfig::new("q", Capacity::Demand).validate().is_ok());
        assert!(QueueConfig::new("q", Capacity::Fixed(5)).validate().is_ok());
    }
}
