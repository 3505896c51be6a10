//! # queueboard
//!
//! **Queueboard** is a reaction-driven admission queue for chat platforms.
//!
//! A [`SlotQueue`] owns one "board" message in a channel. Users take a
//! ticket by reacting to it; the queue hands out a limited number of
//! active slots, prompts the next user in line when one opens, and keeps
//! the board and its reaction buttons consistent with the real state at
//! all times.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                     board message (one per SlotQueue)
//!                    ┌───────────────────────────────┐
//!    user reactions  │  🎫 join    📋 offer capacity │
//!   ───────────────► └───────────────┬───────────────┘
//!                                    │ live feed + debounced rebuild
//!                                    ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  SlotQueue                                                        │
//! │  - lists: available / active / pending / queue (disjoint)         │
//! │  - ReactionReconciler (board buttons ↔ membership)                │
//! │  - Debounce (coalesced board repaints)                            │
//! │  - Bus (broadcast events) ─► SubscriberSet (per-sub workers)      │
//! └──────┬──────────────────────────┬─────────────────────────────────┘
//!        │ slot opens               │ publishes Events:
//!        ▼                          │ - UserAdded / UserRemoved
//! ┌──────────────────┐              │ - UserQueued / UserPending
//! │  UserPrompt (DM) │              │ - UserActive / UserPassed
//! │  ✔️ accept       │              │ - BoardUpdated
//! │  ✖️ skip         │              ▼
//! └──────────────────┘         subscribers (logging, metrics, ...)
//! ```
//!
//! ### Lifecycle of one user
//! ```text
//! react 🎫 ──► add_user()
//!   ├─ slot free ──► active
//!   └─ full ──────► queue (FIFO, retry counters reset)
//!
//! slot opens ──► promote queue head to pending ──► UserPrompt
//!   ├─ ✔️ accept ─────────► active
//!   ├─ ✖️ skip ──┐
//!   └─ timeout ──┴─► pass():
//!        ├─ under retry maximum ─► reinserted just behind the queue head
//!        └─ maximum reached ─────► dropped, board reaction pruned
//!
//! unreact 🎫 ──► remove_user() (any list, outstanding offer cancelled)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                        |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Queue**         | Slot admission, FIFO promotion, skip/timeout retry maxima.   | [`SlotQueue`], [`QueueConfig`]            |
//! | **Reconciliation**| Keep a message's reactions equal to its declared options.    | [`ReactionReconciler`], [`ReactionOption`]|
//! | **Prompts**       | Cancellable, re-usable per-user offers over direct messages. | [`UserPrompt`], [`PromptOption`]          |
//! | **Platform**      | Seam to the chat backend; mock it in tests.                  | [`Platform`]                              |
//! | **Subscriber API**| Hook into admission events (logging, metrics, custom).       | [`Subscribe`]                             |
//! | **Errors**        | Typed errors with stable snake_case labels.                  | [`QueueError`], [`PlatformError`]         |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use queueboard::{Capacity, QueueConfig};
//!
//! // Two slots; offers expire after two minutes and a user may skip
//! // twice before being dropped from the queue.
//! let config = QueueConfig {
//!     pending_timeout: Duration::from_secs(120),
//!     max_pending_skips: 2,
//!     ..QueueConfig::new("Duos", Capacity::Fixed(2))
//! };
//! assert!(config.validate().is_ok());
//! assert_eq!(config.queue_emoji.identifier(), "🎫");
//!
//! // With a platform adapter in hand:
//! // let queue = SlotQueue::start(platform, channel, config, subs).await?;
//! ```

pub mod collections;
pub mod events;
pub mod platform;
pub mod queue;
pub mod subscribers;

mod error;
mod options;
mod prompt;
mod reconciler;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use error::{PlatformError, QueueError};
pub use events::{Bus, Event, EventKind, PassKind, QueueList};
pub use options::{OptionCallbacks, ReactionOption};
pub use platform::{compare_emoji, ChannelRef, Emoji, MessageBody, MessageRef, Platform, PlatformRef, UserRef};
pub use prompt::{PromptOption, UserPrompt};
pub use queue::{Capacity, PassCounts, QueueConfig, SlotQueue};
pub use reconciler::{ReactionReconciler, ReconcilerSettings};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
