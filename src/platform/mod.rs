//! Messaging-platform boundary.
//!
//! The queue core never talks to a concrete chat backend; everything it
//! needs is expressed by the [`Platform`] trait and a handful of opaque
//! handle types. The collaborator is injected at construction (no global
//! client/session), which is also what makes the core testable against an
//! in-memory platform.
//!
//! ## Contents
//! - [`Platform`] — async collaborator contract (send/edit/react/fetch/...)
//! - [`UserRef`], [`ChannelRef`], [`MessageRef`], [`MessageBody`] — handles
//! - [`Emoji`], [`compare_emoji`] — emoji identity
//! - [`ReactionFeed`], [`ReactionSignal`] — live per-message event stream
//!
//! ## Rules
//! - The platform is asynchronous, rate-limited, and may report
//!   [`PlatformError::NotFound`] for entities that vanished concurrently;
//!   callers at reconciliation boundaries absorb those.
//! - `delete_message` is idempotent: deleting an already-deleted message
//!   succeeds.

mod emoji;
mod feed;
mod types;

pub use emoji::{compare_emoji, emoji_comparator, Emoji};
pub use feed::{ReactionFeed, ReactionSignal};
pub use types::{BodyField, ChannelRef, MessageBody, MessageRef, ReactionState, UserRef};

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PlatformError;

/// Shared handle to the platform collaborator.
pub type PlatformRef = Arc<dyn Platform>;

/// Contract the queue core requires from a messaging platform.
///
/// Implementations wrap a real chat client; tests use an in-memory one.
/// All calls are suspension points: state mutated by the core between two
/// platform calls is atomic with respect to other logical operations, but
/// anything awaited here must re-validate its assumptions after resuming.
#[async_trait]
pub trait Platform: Send + Sync + 'static {
    /// Posts a new message and returns its handle.
    async fn send_message(
        &self,
        channel: &ChannelRef,
        body: &MessageBody,
    ) -> Result<MessageRef, PlatformError>;

    /// Edits an existing message in place. The returned handle refers to
    /// the same message identity.
    async fn edit_message(
        &self,
        message: &MessageRef,
        body: &MessageBody,
    ) -> Result<MessageRef, PlatformError>;

    /// Deletes a message. Deleting an already-deleted message is not an error.
    async fn delete_message(&self, message: &MessageRef) -> Result<(), PlatformError>;

    /// Adds the bot's own reaction to a message.
    async fn react(&self, message: &MessageRef, emoji: &Emoji) -> Result<(), PlatformError>;

    /// Removes one user's reaction for `emoji`.
    async fn remove_reaction(
        &self,
        message: &MessageRef,
        emoji: &Emoji,
        user: &UserRef,
    ) -> Result<(), PlatformError>;

    /// Removes the reaction for `emoji` entirely, for all users.
    async fn clear_reaction(&self, message: &MessageRef, emoji: &Emoji)
        -> Result<(), PlatformError>;

    /// Current reaction state of a message: every present emoji with the
    /// users reacting with it (the bot included).
    async fn fetch_reactions(
        &self,
        message: &MessageRef,
    ) -> Result<Vec<ReactionState>, PlatformError>;

    /// Handles of the messages currently in a channel.
    async fn fetch_messages(&self, channel: &ChannelRef)
        -> Result<Vec<MessageRef>, PlatformError>;

    /// Opens (or reuses) a direct channel to `user`.
    ///
    /// Fails with [`PlatformError::DmUnavailable`] when the user cannot be
    /// messaged privately; callers may catch that to fall back to a public
    /// channel.
    async fn create_direct_channel(&self, user: &UserRef) -> Result<ChannelRef, PlatformError>;

    /// Subscribes to live reaction events on one message.
    ///
    /// The feed stays open until [`ReactionFeed::stop`] (or the platform
    /// drops the message); one message may be watched by several feeds.
    fn watch(&self, message: &MessageRef) -> ReactionFeed;

    /// The identity the platform authenticated as.
    fn bot_user(&self) -> UserRef;
}
