//! In-memory [`Platform`] used by the test suites.
//!
//! Holds messages and reactions behind one async mutex. Only
//! `user_reacts` / `user_unreacts` emit live feed signals; bot-initiated
//! writes through the [`Platform`] trait mutate state silently, which is
//! what real chat platforms look like from the bot's own point of view
//! once self-echo filtering is on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::PlatformError;
use crate::platform::{
    compare_emoji, ChannelRef, Emoji, MessageBody, MessageRef, Platform, ReactionFeed,
    ReactionSignal, ReactionState, UserRef,
};

struct StoredMessage {
    message: MessageRef,
    body: MessageBody,
    reactions: Vec<ReactionState>,
}

#[derive(Default)]
struct MockState {
    messages: Vec<StoredMessage>,
    watchers: HashMap<String, Vec<mpsc::Sender<ReactionSignal>>>,
    closed_dms: Vec<String>,
    /// Mutating calls made through the [`Platform`] trait.
    writes: usize,
}

pub struct MockPlatform {
    state: Mutex<MockState>,
    next_id: AtomicU64,
}

impl MockPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MockState::default()),
            next_id: AtomicU64::new(1),
        })
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// The direct channel id this mock assigns to a user id.
    pub fn dm_channel_id(&self, user_id: &str) -> String {
        format!("dm:{user_id}")
    }

    /// Pre-opens the direct channel for a user (for seeding messages).
    pub async fn open_dm(&self, user: &UserRef) -> ChannelRef {
        ChannelRef::new(self.dm_channel_id(user.id()))
    }

    /// Makes `create_direct_channel` fail for this user from now on.
    pub async fn close_dms(&self, user: UserRef) {
        let mut state = self.lock();
        state.closed_dms.push(user.id().to_string());
    }

    /// Places a message without counting it as a bot write.
    pub async fn seed_message(&self, channel: &ChannelRef, body: MessageBody) -> MessageRef {
        let message = MessageRef::new(channel.clone(), self.fresh_id());
        let mut state = self.lock();
        state.messages.push(StoredMessage {
            message: message.clone(),
            body,
            reactions: Vec::new(),
        });
        message
    }

    /// Places a reaction without emitting a feed signal (pre-existing
    /// state, as seen by a cold `fetch_reactions`).
    pub async fn seed_reaction(&self, message: &MessageRef, emoji: Emoji, user: UserRef) {
        let mut state = self.lock();
        if let Some(stored) = find_mut(&mut state.messages, message) {
            add_reaction(&mut stored.reactions, emoji, user);
        }
    }

    /// A user presses a reaction: mutates state and emits `Added` to every
    /// live watcher of the message.
    pub async fn user_reacts(&self, message: &MessageRef, emoji: Emoji, user: UserRef) {
        let mut state = self.lock();
        if let Some(stored) = find_mut(&mut state.messages, message) {
            add_reaction(&mut stored.reactions, emoji.clone(), user.clone());
        }
        notify(&mut state, message, ReactionSignal::Added { emoji, user });
    }

    /// A user withdraws a reaction: mutates state and emits `Removed`.
    pub async fn user_unreacts(&self, message: &MessageRef, emoji: Emoji, user: UserRef) {
        let mut state = self.lock();
        if let Some(stored) = find_mut(&mut state.messages, message) {
            remove_reaction(&mut stored.reactions, &emoji, &user);
        }
        notify(&mut state, message, ReactionSignal::Removed { emoji, user });
    }

    /// Current reactions on a message (empty if it does not exist).
    pub async fn reactions_on(&self, message: &MessageRef) -> Vec<ReactionState> {
        let state = self.lock();
        find(&state.messages, message)
            .map(|m| m.reactions.clone())
            .unwrap_or_default()
    }

    /// Wipes every reaction from a message without counting a write.
    pub async fn clear_all_reactions(&self, message: &MessageRef) {
        let mut state = self.lock();
        if let Some(stored) = find_mut(&mut state.messages, message) {
            stored.reactions.clear();
        }
    }

    pub async fn message_body(&self, message: &MessageRef) -> Option<MessageBody> {
        let state = self.lock();
        find(&state.messages, message).map(|m| m.body.clone())
    }

    pub async fn message_exists(&self, message: &MessageRef) -> bool {
        let state = self.lock();
        find(&state.messages, message).is_some()
    }

    /// Messages currently in a channel, oldest first.
    pub async fn messages_in(&self, channel: &ChannelRef) -> Vec<MessageRef> {
        let state = self.lock();
        state
            .messages
            .iter()
            .filter(|m| m.message.channel().same_as(channel))
            .map(|m| m.message.clone())
            .collect()
    }

    /// Count of mutating calls made through the [`Platform`] trait.
    pub async fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Lets in-flight feed signals and their dispatch tasks run.
    pub async fn drain_signals(&self) {
        for _ in 0..100 {
            tokio::task::yield_now().await;
        }
    }

    fn fresh_id(&self) -> String {
        format!("m{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

fn find<'a>(messages: &'a [StoredMessage], message: &MessageRef) -> Option<&'a StoredMessage> {
    messages.iter().find(|m| m.message.same_as(message))
}

fn find_mut<'a>(
    messages: &'a mut [StoredMessage],
    message: &MessageRef,
) -> Option<&'a mut StoredMessage> {
    messages.iter_mut().find(|m| m.message.same_as(message))
}

fn add_reaction(reactions: &mut Vec<ReactionState>, emoji: Emoji, user: UserRef) {
    match reactions.iter_mut().find(|r| compare_emoji(&r.emoji, &emoji)) {
        Some(r) => {
            if !r.users.iter().any(|u| u.same_as(&user)) {
                r.users.push(user);
            }
        }
        None => reactions.push(ReactionState {
            emoji,
            users: vec![user],
        }),
    }
}

fn remove_reaction(reactions: &mut Vec<ReactionState>, emoji: &Emoji, user: &UserRef) {
    if let Some(r) = reactions.iter_mut().find(|r| compare_emoji(&r.emoji, emoji)) {
        r.users.retain(|u| !u.same_as(user));
    }
    reactions.retain(|r| !r.users.is_empty());
}

fn notify(state: &mut MockState, message: &MessageRef, signal: ReactionSignal) {
    if let Some(senders) = state.watchers.get_mut(message.id()) {
        senders.retain(|tx| !tx.is_closed());
        for tx in senders.iter() {
            // Tests never push enough signals to fill a feed buffer.
            let _ = tx.try_send(signal.clone());
        }
    }
}

fn not_found(what: &str) -> PlatformError {
    PlatformError::NotFound {
        what: what.to_string(),
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn send_message(
        &self,
        channel: &ChannelRef,
        body: &MessageBody,
    ) -> Result<MessageRef, PlatformError> {
        let message = MessageRef::new(channel.clone(), self.fresh_id());
        let mut state = self.lock();
        state.writes += 1;
        state.messages.push(StoredMessage {
            message: message.clone(),
            body: body.clone(),
            reactions: Vec::new(),
        });
        Ok(message)
    }

    async fn edit_message(
        &self,
        message: &MessageRef,
        body: &MessageBody,
    ) -> Result<MessageRef, PlatformError> {
        let mut state = self.lock();
        state.writes += 1;
        let stored = find_mut(&mut state.messages, message).ok_or_else(|| not_found("message"))?;
        stored.body = body.clone();
        Ok(stored.message.clone())
    }

    async fn delete_message(&self, message: &MessageRef) -> Result<(), PlatformError> {
        let mut state = self.lock();
        state.writes += 1;
        // Idempotent: deleting an absent message succeeds.
        state.messages.retain(|m| !m.message.same_as(message));
        Ok(())
    }

    async fn react(&self, message: &MessageRef, emoji: &Emoji) -> Result<(), PlatformError> {
        let bot = self.bot_user();
        let mut state = self.lock();
        state.writes += 1;
        let stored = find_mut(&mut state.messages, message).ok_or_else(|| not_found("message"))?;
        add_reaction(&mut stored.reactions, emoji.clone(), bot);
        Ok(())
    }

    async fn remove_reaction(
        &self,
        message: &MessageRef,
        emoji: &Emoji,
        user: &UserRef,
    ) -> Result<(), PlatformError> {
        let mut state = self.lock();
        state.writes += 1;
        let stored = find_mut(&mut state.messages, message).ok_or_else(|| not_found("message"))?;
        remove_reaction(&mut stored.reactions, emoji, user);
        Ok(())
    }

    async fn clear_reaction(
        &self,
        message: &MessageRef,
        emoji: &Emoji,
    ) -> Result<(), PlatformError> {
        let mut state = self.lock();
        state.writes += 1;
        let stored = find_mut(&mut state.messages, message).ok_or_else(|| not_found("message"))?;
        stored.reactions.retain(|r| !compare_emoji(&r.emoji, emoji));
        Ok(())
    }

    async fn fetch_reactions(
        &self,
        message: &MessageRef,
    ) -> Result<Vec<ReactionState>, PlatformError> {
        let state = self.lock();
        find(&state.messages, message)
            .map(|m| m.reactions.clone())
            .ok_or_else(|| not_found("message"))
    }

    async fn fetch_messages(
        &self,
        channel: &ChannelRef,
    ) -> Result<Vec<MessageRef>, PlatformError> {
        Ok(self.messages_in(channel).await)
    }

    async fn create_direct_channel(&self, user: &UserRef) -> Result<ChannelRef, PlatformError> {
        let state = self.lock();
        if state.closed_dms.iter().any(|id| id == user.id()) {
            return Err(PlatformError::DmUnavailable {
                user: user.tag().to_string(),
            });
        }
        Ok(ChannelRef::new(self.dm_channel_id(user.id())))
    }

    fn watch(&self, message: &MessageRef) -> ReactionFeed {
        let (tx, feed) = ReactionFeed::pair(64);
        let id = message.id().to_string();
        self.lock().watchers.entry(id).or_default().push(tx);
        feed
    }

    fn bot_user(&self) -> UserRef {
        UserRef::new("bot", "@bot")
    }
}
