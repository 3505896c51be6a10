//! # Live reaction event stream for one message.
//!
//! [`ReactionFeed`] is a cancellable subscription yielding three distinct
//! signal kinds over the lifetime of one message:
//!
//! - [`ReactionSignal::Added`] — a user added a reaction
//! - [`ReactionSignal::Removed`] — a user removed their reaction
//! - [`ReactionSignal::Disposed`] — the platform evicted the reaction from
//!   its cache without an explicit removal
//!
//! The feed ends when [`ReactionFeed::stop`] is called (idempotent) or when
//! the platform closes its side; [`ReactionFeed::next`] then returns `None`.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::emoji::Emoji;
use super::types::UserRef;

/// One raw reaction event from the platform.
#[derive(Clone, Debug)]
pub enum ReactionSignal {
    /// A user added a reaction.
    Added { emoji: Emoji, user: UserRef },
    /// A user removed their reaction.
    Removed { emoji: Emoji, user: UserRef },
    /// The platform evicted the reaction without an explicit removal.
    Disposed { emoji: Emoji, user: UserRef },
}

impl ReactionSignal {
    /// The user the signal is about.
    pub fn user(&self) -> &UserRef {
        match self {
            ReactionSignal::Added { user, .. }
            | ReactionSignal::Removed { user, .. }
            | ReactionSignal::Disposed { user, .. } => user,
        }
    }

    /// The emoji the signal is about.
    pub fn emoji(&self) -> &Emoji {
        match self {
            ReactionSignal::Added { emoji, .. }
            | ReactionSignal::Removed { emoji, .. }
            | ReactionSignal::Disposed { emoji, .. } => emoji,
        }
    }
}

/// Cancellable subscription to one message's reaction events.
pub struct ReactionFeed {
    rx: mpsc::Receiver<ReactionSignal>,
    token: CancellationToken,
}

impl ReactionFeed {
    /// Wraps a receiver the platform adapter feeds signals into.
    pub fn new(rx: mpsc::Receiver<ReactionSignal>) -> Self {
        Self {
            rx,
            token: CancellationToken::new(),
        }
    }

    /// Creates a connected (sender, feed) pair. Convenience for adapters
    /// and tests.
    pub fn pair(buffer: usize) -> (mpsc::Sender<ReactionSignal>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, Self::new(rx))
    }

    /// Next signal, or `None` once the feed is stopped or the platform
    /// closed its side.
    pub async fn next(&mut self) -> Option<ReactionSignal> {
        tokio::select! {
            _ = self.token.cancelled() => None,
            signal = self.rx.recv() => signal,
        }
    }

    /// Stops the subscription. Idempotent; a pending `next()` resolves to
    /// `None`.
    pub fn stop(&self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_feed_yields_signals_in_order() {
        let (tx, mut feed) = ReactionFeed::pair(8);
        let emoji = Emoji::unicode("🎫");
        let user = UserRef::new("1", "@a");

        tx.send(ReactionSignal::Added {
            emoji: emoji.clone(),
            user: user.clone(),
        })
        .await
        .ok();
        tx.send(ReactionSignal::Removed { emoji, user }).await.ok();

        assert!(matches!(
            feed.next().await,
            Some(ReactionSignal::Added { .. })
        ));
        assert!(matches!(
            feed.next().await,
            Some(ReactionSignal::Removed { .. })
        ));
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_ends_feed() {
        let (_tx, mut feed) = ReactionFeed::pair(1);
        feed.stop();
        feed.stop();
        assert!(feed.next().await.is_none());
    }

    #[tokio::test]
    async fn test_sender_drop_ends_feed() {
        let (tx, mut feed) = ReactionFeed::pair(1);
        drop(tx);
        assert!(feed.next().await.is_none());
    }
}
