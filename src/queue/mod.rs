//! # Slot queue: reaction-driven admission around a board message.
//!
//! One [`SlotQueue`] owns a single board message and four disjoint user
//! lists:
//!
//! - `available` — users offering capacity (demand mode only)
//! - `active`    — users currently holding a slot
//! - `pending`   — users offered a slot, prompted to accept or skip
//! - `queue`     — users waiting, in arrival order
//!
//! ```text
//!   board reaction        promote (FIFO)           accept
//!   ────────────►  queue  ──────────────► pending ────────► active
//!                    ▲                       │
//!                    └── skip / timeout ─────┘  (reinserted behind the
//!                        until the retry         head, or dropped when
//!                        maximum is reached)     a maximum is reached)
//! ```
//!
//! Joining and leaving happen through reactions on the board, reconciled
//! by a [`ReactionReconciler`]; slot offers go out as [`UserPrompt`]s.
//! Board rewrites are debounced on the same window as reconciliation, so
//! a burst of presses produces one repaint. Every state transition is
//! published on an internal [`Bus`] and fanned out to subscribers.
//!
//! ## Example
//!
//! ```
//! use queueboard::queue::{Capacity, QueueConfig};
//! use std::time::Duration;
//!
//! let config = QueueConfig {
//!     pending_timeout: Duration::from_secs(120),
//!     max_pending_skips: 2,
//!     ..QueueConfig::new("Duos", Capacity::Fixed(2))
//! };
//! assert!(config.validate().is_ok());
//! ```

mod config;
mod render;

pub use config::{Capacity, PromptTemplate, QueueConfig, UserToString};

use std::sync::{Arc, Mutex as StdMutex, MutexGuard, Weak};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::{broadcast, Mutex};

use crate::collections::{Comparator, ComparisonMap, ComparisonQueue};
use crate::error::QueueError;
use crate::events::{Bus, Event, EventKind, PassKind, QueueList};
use crate::options::{OptionCallbacks, ReactionOption};
use crate::platform::{ChannelRef, Emoji, MessageBody, MessageRef, PlatformRef, UserRef};
use crate::prompt::{PromptOption, UserPrompt};
use crate::reconciler::{Debounce, ReactionReconciler, ReconcilerSettings};
use crate::subscribers::{Subscribe, SubscriberSet};

use render::render_board;

/// Per-user pass tally. Reset each time the user re-enters the queue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassCounts {
    pub timeouts: u32,
    pub skips: u32,
}

impl PassCounts {
    /// Records one pass and returns the new tally for that kind.
    fn bump(&mut self, kind: PassKind) -> u32 {
        match kind {
            PassKind::Timeout => {
                self.timeouts += 1;
                self.timeouts
            }
            PassKind::Skip => {
                self.skips += 1;
                self.skips
            }
        }
    }
}

/// An outstanding slot offer and the shape it was issued with.
struct PromptRecord {
    prompt: UserPrompt,
    /// Whether the offer carried a skip button (someone was waiting).
    skippable: bool,
}

fn user_comparator() -> Comparator<UserRef> {
    Arc::new(|a: &UserRef, b: &UserRef| a.same_as(b))
}

/// The four user lists plus per-user bookkeeping. One logical operation
/// mutates this atomically under the queue's state lock.
pub(crate) struct QueueState {
    pub(crate) available: ComparisonQueue<UserRef>,
    pub(crate) active: ComparisonQueue<UserRef>,
    pub(crate) pending: ComparisonQueue<UserRef>,
    pub(crate) queue: ComparisonQueue<UserRef>,
    prompts: ComparisonMap<UserRef, PromptRecord>,
    counters: ComparisonMap<UserRef, PassCounts>,
    /// Slot count in fixed-capacity mode; ignored in demand mode.
    max_active: usize,
}

impl Default for QueueState {
    fn default() -> Self {
        Self {
            available: ComparisonQueue::new(user_comparator()),
            active: ComparisonQueue::new(user_comparator()),
            pending: ComparisonQueue::new(user_comparator()),
            queue: ComparisonQueue::new(user_comparator()),
            prompts: ComparisonMap::new(user_comparator()),
            counters: ComparisonMap::new(user_comparator()),
            max_active: 0,
        }
    }
}

struct QueueInner {
    platform: PlatformRef,
    channel: ChannelRef,
    config: QueueConfig,
    bus: Bus,
    message: MessageRef,
    state: Mutex<QueueState>,
    /// Debounced board repaint.
    update: Debounce,
    reconciler: StdMutex<Option<ReactionReconciler>>,
}

/// A reaction-driven admission queue around one board message.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct SlotQueue {
    inner: Arc<QueueInner>,
}

impl SlotQueue {
    /// Posts (or resumes) the board message, seeds its reaction buttons
    /// and starts listening.
    ///
    /// `subscribers` receive every published [`Event`] on their own
    /// worker tasks; pass an empty vec to observe via [`SlotQueue::subscribe`]
    /// instead.
    pub async fn start(
        platform: PlatformRef,
        channel: ChannelRef,
        config: QueueConfig,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Result<Self, QueueError> {
        config.validate()?;

        let bus = Bus::new(config.bus_capacity);
        if !subscribers.is_empty() {
            spawn_forwarder(&bus, SubscriberSet::new(subscribers));
        }

        let mut state = QueueState::default();
        if let Capacity::Fixed(max) = config.capacity {
            state.max_active = max;
        }

        let initial_max = match config.capacity {
            Capacity::Fixed(max) => max,
            Capacity::Demand => 0,
        };
        let body = render_board(&state, &config, initial_max);
        let message = match &config.existing_message {
            // Resuming repaints immediately: the stored body may be stale.
            Some(existing) => platform.edit_message(existing, &body).await?,
            None => platform.send_message(&channel, &body).await?,
        };

        let window = config.message_debounce;
        let inner = Arc::new_cyclic(|weak: &Weak<QueueInner>| {
            let weak = weak.clone();
            let update = Debounce::new(window, move || {
                let weak = weak.clone();
                async move {
                    if let Some(inner) = weak.upgrade() {
                        inner.repaint().await;
                    }
                }
            });
            QueueInner {
                platform: Arc::clone(&platform),
                channel,
                config,
                bus,
                message: message.clone(),
                state: Mutex::new(state),
                update,
                reconciler: StdMutex::new(None),
            }
        });

        let settings = ReconcilerSettings::default()
            .with_debounce_window(window)
            .with_default_option(OptionCallbacks::reject_all());
        let reconciler = ReactionReconciler::start(
            Arc::clone(&platform),
            message,
            board_options(&inner),
            settings,
        )
        .await?;
        *inner.lock_reconciler() = Some(reconciler);

        Ok(Self { inner })
    }

    /// Admits a user: straight to active if a slot is free, otherwise to
    /// the back of the queue with a fresh retry record. Admitting a
    /// current member is a silent success.
    pub async fn add_user(&self, user: UserRef) -> bool {
        self.inner.add_user(user).await
    }

    /// Withdraws a user from whichever list holds them and cancels any
    /// outstanding offer. Unknown users are a no-op.
    pub async fn remove_user(&self, user: &UserRef) {
        self.inner.remove_user(user).await;
    }

    /// Adds a user to the available pool (demand capacity).
    pub async fn add_available_user(&self, user: UserRef) -> bool {
        self.inner.add_available_user(user).await
    }

    /// Removes a user from the available pool. Users they admitted stay
    /// active.
    pub async fn remove_available_user(&self, user: &UserRef) {
        self.inner.remove_available_user(user).await;
    }

    /// Whether the user is anywhere in the admission system (active,
    /// pending or waiting).
    pub async fn is_user_queued(&self, user: &UserRef) -> bool {
        self.inner.is_user_queued(user).await
    }

    /// Changes the fixed slot count and promotes into any new room.
    pub async fn set_max_active(&self, max: usize) {
        self.inner.set_max_active(max).await;
    }

    /// Current slot count (pool size in demand mode).
    pub async fn get_max_active(&self) -> usize {
        let state = self.inner.state.lock().await;
        self.inner.max_for_state(&state)
    }

    pub async fn active_users(&self) -> Vec<UserRef> {
        self.inner.state.lock().await.active.map(UserRef::clone)
    }

    pub async fn pending_users(&self) -> Vec<UserRef> {
        self.inner.state.lock().await.pending.map(UserRef::clone)
    }

    pub async fn queued_users(&self) -> Vec<UserRef> {
        self.inner.state.lock().await.queue.map(UserRef::clone)
    }

    pub async fn available_users(&self) -> Vec<UserRef> {
        self.inner.state.lock().await.available.map(UserRef::clone)
    }

    /// The board message this queue owns.
    pub fn message(&self) -> &MessageRef {
        &self.inner.message
    }

    /// Direct event tap, independent of registered subscribers.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Stops listening and cancels every outstanding offer. The board
    /// message is left in place.
    pub async fn stop(&self) {
        if let Some(reconciler) = self.inner.board_reconciler() {
            reconciler.stop();
        }
        let prompts: Vec<UserPrompt> = {
            let state = self.inner.state.lock().await;
            state.prompts.values().map(|r| r.prompt.clone()).collect()
        };
        for prompt in prompts {
            prompt.cancel().await;
        }
    }

    /// Waits until no board repaint or reconciliation pass is in flight.
    /// Test hook.
    pub async fn settle(&self) {
        self.inner.update.settle().await;
        if let Some(reconciler) = self.inner.board_reconciler() {
            reconciler.settle().await;
        }
    }
}

impl QueueInner {
    fn publish(&self, event: Event) {
        self.bus.publish(event);
    }

    fn lock_reconciler(&self) -> MutexGuard<'_, Option<ReactionReconciler>> {
        match self.reconciler.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn board_reconciler(&self) -> Option<ReactionReconciler> {
        self.lock_reconciler().clone()
    }

    /// Effective slot count under the given state snapshot.
    fn max_for_state(&self, state: &QueueState) -> usize {
        match self.config.capacity {
            Capacity::Demand => state.available.len(),
            Capacity::Fixed(_) => state.max_active,
        }
    }

    async fn is_user_queued(&self, user: &UserRef) -> bool {
        let state = self.state.lock().await;
        state.active.has(user) || state.pending.has(user) || state.queue.has(user)
    }

    async fn add_user(self: &Arc<Self>, user: UserRef) -> bool {
        enum Placed {
            Already,
            Active,
            Queued,
        }
        let placed = {
            let mut state = self.state.lock().await;
            if state.active.has(&user) || state.pending.has(&user) || state.queue.has(&user) {
                Placed::Already
            } else if state.active.len() + state.pending.len() < self.max_for_state(&state) {
                state.active.push(user.clone());
                Placed::Active
            } else {
                // Re-entering starts a fresh retry record.
                state.counters.add(user.clone(), PassCounts::default());
                state.queue.push(user.clone());
                Placed::Queued
            }
        };
        match placed {
            Placed::Already => return true,
            Placed::Active => {
                self.publish(Event::new(EventKind::UserActive).with_user(user.clone()));
            }
            Placed::Queued => {
                self.publish(Event::new(EventKind::UserQueued).with_user(user.clone()));
                self.refresh_prompts().await;
            }
        }
        self.promote_waiting().await;
        self.publish(Event::new(EventKind::UserAdded).with_user(user));
        self.update.call();
        true
    }

    async fn remove_user(self: &Arc<Self>, user: &UserRef) {
        let (record, from) = {
            let mut state = self.state.lock().await;
            let mut from = None;
            if state.active.remove(user).is_some() {
                from = Some(QueueList::Active);
            }
            if state.pending.remove(user).is_some() {
                from = Some(QueueList::Pending);
            }
            if state.queue.remove(user).is_some() {
                from = Some(QueueList::Queue);
            }
            (state.prompts.remove(user), from)
        };
        if let Some(record) = record {
            record.prompt.cancel().await;
        }
        let Some(list) = from else { return };
        self.publish(
            Event::new(EventKind::UserRemoved)
                .with_user(user.clone())
                .with_list(list),
        );
        self.refresh_prompts().await;
        self.promote_waiting().await;
        self.update.call();
    }

    async fn add_available_user(self: &Arc<Self>, user: UserRef) -> bool {
        {
            let mut state = self.state.lock().await;
            if state.available.has(&user) {
                return true;
            }
            state.available.push(user);
        }
        self.promote_waiting().await;
        self.update.call();
        true
    }

    async fn remove_available_user(self: &Arc<Self>, user: &UserRef) {
        let removed = self.state.lock().await.available.remove(user).is_some();
        if !removed {
            return;
        }
        self.publish(
            Event::new(EventKind::UserRemoved)
                .with_user(user.clone())
                .with_list(QueueList::Available),
        );
        self.update.call();
    }

    async fn set_max_active(self: &Arc<Self>, max: usize) {
        self.state.lock().await.max_active = max;
        self.promote_waiting().await;
        self.refresh_prompts().await;
        self.update.call();
    }

    /// Promotes queue heads into pending while room remains, offering a
    /// slot to each.
    async fn promote_waiting(self: &Arc<Self>) {
        loop {
            let next = {
                let mut state = self.state.lock().await;
                if state.active.len() + state.pending.len() >= self.max_for_state(&state) {
                    None
                } else {
                    state.queue.shift().map(|user| {
                        state.pending.push(user.clone());
                        user
                    })
                }
            };
            let Some(user) = next else { break };
            self.publish(Event::new(EventKind::UserPending).with_user(user.clone()));
            self.send_prompt(user).await;
            self.update.call();
        }
    }

    /// Issues (or re-issues) the slot offer to a pending user.
    ///
    /// The skip button only appears while someone is waiting behind them,
    /// and only a skippable offer can time out.
    ///
    /// Boxed because the offer callbacks recurse back into this method
    /// through `pass` and `refresh_prompts`.
    fn send_prompt(self: &Arc<Self>, user: UserRef) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let (prompt, skippable, counts) = {
                let mut state = self.state.lock().await;
                if !state.pending.has(&user) {
                    return;
                }
                let skippable = !state.queue.is_empty();
                let counts = state.counters.get(&user).copied().unwrap_or_default();
                let prompt = match state.prompts.get(&user) {
                    Some(record) => record.prompt.clone(),
                    None => UserPrompt::new(
                        Arc::clone(&self.platform),
                        user.clone(),
                        Some(self.channel.clone()),
                    ),
                };
                state.prompts.add(
                    user.clone(),
                    PromptRecord {
                        prompt: prompt.clone(),
                        skippable,
                    },
                );
                (prompt, skippable, counts)
            };

            let weak = Arc::downgrade(self);
            let mut options = vec![PromptOption::new(self.config.accept_emoji.clone(), {
                let weak = weak.clone();
                move |user: UserRef| {
                    let weak = weak.clone();
                    async move {
                        if let Some(inner) = weak.upgrade() {
                            inner.accept_user(user).await;
                        }
                    }
                    .boxed()
                }
            })];
            let timeout = if skippable {
                options.push(PromptOption::new(self.config.skip_emoji.clone(), {
                    let weak = weak.clone();
                    move |user: UserRef| {
                        let weak = weak.clone();
                        async move {
                            if let Some(inner) = weak.upgrade() {
                                inner.pass(user, PassKind::Skip).await;
                            }
                        }
                        .boxed()
                    }
                }));
                self.config.pending_timeout
            } else {
                Duration::ZERO
            };

            let template = if skippable {
                self.config.accept_or_skip_message.as_ref()
            } else {
                self.config.accept_message.as_ref()
            };
            let body = MessageBody::text(template(&user, counts));

            let on_timeout = move |user: UserRef| -> BoxFuture<'static, ()> {
                let weak = weak.clone();
                Box::pin(async move {
                    if let Some(inner) = weak.upgrade() {
                        inner.pass(user, PassKind::Timeout).await;
                    }
                })
            };

            if let Err(e) = prompt.prompt(options, timeout, on_timeout, body).await {
                eprintln!("[queueboard] offer to {} failed: {}", user, e.as_label());
            }
        })
    }

    /// A pending user accepted: they take the slot.
    async fn accept_user(self: &Arc<Self>, user: UserRef) {
        let record = {
            let mut state = self.state.lock().await;
            if state.pending.remove(&user).is_none() {
                return;
            }
            state.active.push(user.clone());
            state.prompts.remove(&user)
        };
        if let Some(record) = record {
            record.prompt.cancel().await;
        }
        self.publish(Event::new(EventKind::UserActive).with_user(user));
        self.update.call();
    }

    /// A pending user skipped or timed out: reinsert them just behind the
    /// queue head, or drop them once their retry maximum is reached.
    async fn pass(self: &Arc<Self>, user: UserRef, kind: PassKind) {
        let (record, returned) = {
            let mut state = self.state.lock().await;
            // Skip and timeout can race; the first one wins.
            if state.pending.remove(&user).is_none() {
                return;
            }
            let record = state.prompts.remove(&user);
            let returned = match state.counters.get_mut(&user) {
                Some(counts) => counts.bump(kind) < self.config.max_for(kind),
                // No retry record survives for this user; count from zero.
                None => true,
            };
            if returned {
                state.queue.insert(user.clone(), 1);
            } else {
                state.counters.remove(&user);
            }
            (record, returned)
        };
        if let Some(record) = record {
            record.prompt.cancel().await;
        }
        self.publish(
            Event::new(EventKind::UserPassed)
                .with_user(user.clone())
                .with_pass(kind, returned),
        );
        if !returned {
            self.publish(
                Event::new(EventKind::UserRemoved)
                    .with_user(user)
                    .with_list(QueueList::Pending),
            );
            // Their board reaction is now stale; let reconciliation prune it.
            if let Some(reconciler) = self.board_reconciler() {
                reconciler.rebuild_reactions();
            }
        }
        self.refresh_prompts().await;
        self.promote_waiting().await;
        self.update.call();
    }

    /// Re-issues any outstanding offer whose skippability no longer
    /// matches the queue (someone arrived behind a lone pending user, or
    /// the last waiter left).
    async fn refresh_prompts(self: &Arc<Self>) {
        let stale: Vec<UserRef> = {
            let state = self.state.lock().await;
            let skippable = !state.queue.is_empty();
            state
                .prompts
                .entries()
                .filter(|entry| entry.value.skippable != skippable)
                .map(|entry| entry.key.clone())
                .collect()
        };
        for user in stale {
            self.send_prompt(user).await;
        }
    }

    async fn repaint(self: &Arc<Self>) {
        let body = {
            let state = self.state.lock().await;
            render_board(&state, &self.config, self.max_for_state(&state))
        };
        if let Err(e) = self.platform.edit_message(&self.message, &body).await {
            eprintln!("[queueboard] board update failed: {}", e.as_label());
            return;
        }
        self.publish(Event::new(EventKind::BoardUpdated));
    }
}

/// The board's reaction buttons: join the queue, join the available pool
/// (demand mode only), plus any configured extras. Reactions matching
/// nothing are rejected wholesale by the reconciler's default option.
fn board_options(inner: &Arc<QueueInner>) -> Vec<ReactionOption> {
    let weak = Arc::downgrade(inner);

    let join = ReactionOption::new(inner.config.queue_emoji.clone())
        .on_validate({
            let weak = weak.clone();
            move |who| {
                let weak = weak.clone();
                async move {
                    let Some(inner) = weak.upgrade() else { return false };
                    match who {
                        Some(user) => inner.is_user_queued(&user).await,
                        None => false,
                    }
                }
            }
        })
        .on_collect({
            let weak = weak.clone();
            move |user| {
                let weak = weak.clone();
                async move {
                    match weak.upgrade() {
                        Some(inner) => inner.add_user(user).await,
                        None => false,
                    }
                }
            }
        })
        .on_remove({
            let weak = weak.clone();
            move |user: UserRef| {
                let weak = weak.clone();
                async move {
                    if let Some(inner) = weak.upgrade() {
                        inner.remove_user(&user).await;
                    }
                }
            }
        });

    let mut options = vec![join];

    // On fixed boards the pool button is not declared at all, so a stray
    // press falls through to the reconciler's reject-all default.
    if matches!(inner.config.capacity, Capacity::Demand) {
        options.push(host_option(inner.config.available_emoji.clone(), &weak));
    }
    options.extend(inner.config.additional_options.iter().cloned());
    options
}

/// The available-pool button, offered on demand-capacity boards only.
fn host_option(emoji: Emoji, weak: &Weak<QueueInner>) -> ReactionOption {
    ReactionOption::new(emoji)
        .on_validate({
            let weak = weak.clone();
            move |who| {
                let weak = weak.clone();
                async move {
                    let Some(inner) = weak.upgrade() else { return false };
                    match who {
                        Some(user) => inner.state.lock().await.available.has(&user),
                        None => false,
                    }
                }
            }
        })
        .on_collect({
            let weak = weak.clone();
            move |user| {
                let weak = weak.clone();
                async move {
                    match weak.upgrade() {
                        Some(inner) => inner.add_available_user(user).await,
                        None => false,
                    }
                }
            }
        })
        .on_remove({
            let weak = weak.clone();
            move |user: UserRef| {
                let weak = weak.clone();
                async move {
                    if let Some(inner) = weak.upgrade() {
                        inner.remove_available_user(&user).await;
                    }
                }
            }
        })
}

/// Relays bus events to a subscriber set until the queue is dropped.
fn spawn_forwarder(bus: &Bus, set: SubscriberSet) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => set.emit(&event),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPlatform;
    use std::sync::Mutex as SyncMutex;

    fn user(id: &str) -> UserRef {
        UserRef::new(id.to_string(), format!("@{id}"))
    }

    fn fast(config: QueueConfig) -> QueueConfig {
        QueueConfig {
            message_debounce: Duration::from_millis(1),
            ..config
        }
    }

    async fn fixture(capacity: Capacity) -> (Arc<MockPlatform>, SlotQueue) {
        fixture_with(QueueConfig::new("Duos", capacity)).await
    }

    async fn fixture_with(config: QueueConfig) -> (Arc<MockPlatform>, SlotQueue) {
        let platform = MockPlatform::new();
        let queue = SlotQueue::start(
            platform.clone(),
            ChannelRef::new("lobby"),
            fast(config),
            Vec::new(),
        )
        .await
        .unwrap();
        (platform, queue)
    }

    /// The single message in a user's direct channel: their live offer.
    async fn offer_message(platform: &Arc<MockPlatform>, id: &str) -> MessageRef {
        let dm = ChannelRef::new(platform.dm_channel_id(id));
        let mut messages = platform.messages_in(&dm).await;
        assert_eq!(messages.len(), 1, "expected exactly one offer for {id}");
        messages.pop().unwrap()
    }

    fn ids(users: Vec<UserRef>) -> Vec<String> {
        users.iter().map(|u| u.id().to_string()).collect()
    }

    async fn assert_disjoint(queue: &SlotQueue) {
        let lists = [
            queue.available_users().await,
            queue.active_users().await,
            queue.pending_users().await,
            queue.queued_users().await,
        ];
        for (i, a) in lists.iter().enumerate() {
            for b in lists.iter().skip(i + 1) {
                for member in a {
                    assert!(
                        !b.iter().any(|u| u.same_as(member)),
                        "{member} appears in two lists"
                    );
                }
            }
        }
    }

    /// Kinds published so far, board repaints filtered out.
    fn transition_kinds(rx: &mut broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if event.kind != EventKind::BoardUpdated {
                kinds.push(event.kind);
            }
        }
        kinds
    }

    #[tokio::test]
    async fn test_start_posts_board_with_join_button() {
        let (platform, queue) = fixture(Capacity::Fixed(2)).await;

        let body = platform.message_body(queue.message()).await.unwrap();
        assert_eq!(body.title.as_deref(), Some("Duos"));
        assert_eq!(body.fields[0].name, "Active 0/2");

        let reactions = platform.reactions_on(queue.message()).await;
        assert!(reactions.iter().any(|r| r.emoji.identifier() == "🎫"));
        // Fixed capacity: no available-pool button.
        assert!(reactions.iter().all(|r| r.emoji.identifier() != "📋"));
        queue.stop().await;
    }

    #[tokio::test]
    async fn test_demand_board_offers_available_button() {
        let (platform, queue) = fixture(Capacity::Demand).await;

        let reactions = platform.reactions_on(queue.message()).await;
        assert!(reactions.iter().any(|r| r.emoji.identifier() == "🎫"));
        assert!(reactions.iter().any(|r| r.emoji.identifier() == "📋"));
        queue.stop().await;
    }

    #[tokio::test]
    async fn test_add_user_takes_free_slot_directly() {
        let (_platform, queue) = fixture(Capacity::Fixed(2)).await;
        let mut rx = queue.subscribe();

        assert!(queue.add_user(user("a")).await);
        assert_eq!(ids(queue.active_users().await), ["a"]);
        assert!(queue.queued_users().await.is_empty());
        assert_eq!(
            transition_kinds(&mut rx),
            [EventKind::UserActive, EventKind::UserAdded]
        );
        queue.stop().await;
    }

    #[tokio::test]
    async fn test_duplicate_add_is_silent_success() {
        let (_platform, queue) = fixture(Capacity::Fixed(2)).await;

        assert!(queue.add_user(user("a")).await);
        let mut rx = queue.subscribe();
        assert!(queue.add_user(user("a")).await);

        assert_eq!(queue.active_users().await.len(), 1);
        assert!(transition_kinds(&mut rx).is_empty());
        queue.stop().await;
    }

    #[tokio::test]
    async fn test_overflow_queues_in_arrival_order() {
        let (_platform, queue) = fixture(Capacity::Fixed(1)).await;

        queue.add_user(user("a")).await;
        queue.add_user(user("b")).await;
        queue.add_user(user("c")).await;

        assert_eq!(ids(queue.active_users().await), ["a"]);
        assert_eq!(ids(queue.queued_users().await), ["b", "c"]);
        assert_disjoint(&queue).await;
        queue.stop().await;
    }

    #[tokio::test]
    async fn test_removal_promotes_queue_head_with_offer() {
        let (platform, queue) = fixture(Capacity::Fixed(1)).await;
        queue.add_user(user("a")).await;
        queue.add_user(user("b")).await;
        queue.add_user(user("c")).await;
        let mut rx = queue.subscribe();

        queue.remove_user(&user("a")).await;

        assert!(queue.active_users().await.is_empty());
        assert_eq!(ids(queue.pending_users().await), ["b"]);
        assert_eq!(ids(queue.queued_users().await), ["c"]);
        assert_eq!(
            transition_kinds(&mut rx),
            [EventKind::UserRemoved, EventKind::UserPending]
        );

        // Someone is waiting behind b, so the offer carries a skip button.
        let offer = offer_message(&platform, "b").await;
        let text = platform.message_body(&offer).await.unwrap().text.unwrap();
        assert!(text.contains("@b"));
        assert!(text.contains("front of the queue"));
        queue.stop().await;
    }

    #[tokio::test]
    async fn test_accept_takes_the_slot() {
        let (platform, queue) = fixture(Capacity::Fixed(1)).await;
        queue.add_user(user("a")).await;
        queue.add_user(user("b")).await;
        queue.remove_user(&user("a")).await;

        let offer = offer_message(&platform, "b").await;
        platform
            .user_reacts(&offer, Emoji::unicode("✔️"), user("b"))
            .await;
        platform.drain_signals().await;

        assert_eq!(ids(queue.active_users().await), ["b"]);
        assert!(queue.pending_users().await.is_empty());
        assert!(!platform.message_exists(&offer).await);
        assert_disjoint(&queue).await;
        queue.stop().await;
    }

    #[tokio::test]
    async fn test_skip_reinserts_just_behind_the_head() {
        let (platform, queue) = fixture(Capacity::Fixed(1)).await;
        for id in ["a", "b", "c", "d"] {
            queue.add_user(user(id)).await;
        }
        queue.remove_user(&user("a")).await;
        assert_eq!(ids(queue.pending_users().await), ["b"]);

        let offer = offer_message(&platform, "b").await;
        platform
            .user_reacts(&offer, Emoji::unicode("✖️"), user("b"))
            .await;
        platform.drain_signals().await;

        // b steps aside for c but keeps their place ahead of d.
        assert_eq!(ids(queue.pending_users().await), ["c"]);
        assert_eq!(ids(queue.queued_users().await), ["b", "d"]);
        assert_disjoint(&queue).await;
        queue.stop().await;
    }

    #[tokio::test]
    async fn test_skip_maximum_drops_user_entirely() {
        let config = QueueConfig {
            max_pending_skips: 1,
            ..QueueConfig::new("q", Capacity::Fixed(1))
        };
        let (platform, queue) = fixture_with(config).await;
        queue.add_user(user("a")).await;
        queue.add_user(user("b")).await;
        queue.add_user(user("c")).await;
        queue.remove_user(&user("a")).await;
        let mut rx = queue.subscribe();

        let offer = offer_message(&platform, "b").await;
        platform
            .user_reacts(&offer, Emoji::unicode("✖️"), user("b"))
            .await;
        platform.drain_signals().await;

        assert!(!queue.is_user_queued(&user("b")).await);
        assert_eq!(ids(queue.pending_users().await), ["c"]);
        let kinds = transition_kinds(&mut rx);
        assert!(kinds.contains(&EventKind::UserPassed));
        assert!(kinds.contains(&EventKind::UserRemoved));

        // Dropping is not a ban: re-entry starts a fresh retry record.
        assert!(queue.add_user(user("b")).await);
        assert!(queue.is_user_queued(&user("b")).await);
        queue.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_maximum_drops_user() {
        let config = QueueConfig {
            pending_timeout: Duration::from_secs(5),
            ..QueueConfig::new("q", Capacity::Fixed(1))
        };
        let (platform, queue) = fixture_with(config).await;
        queue.add_user(user("a")).await;
        queue.add_user(user("b")).await;
        queue.add_user(user("c")).await;
        queue.remove_user(&user("a")).await;

        tokio::time::sleep(Duration::from_secs(6)).await;
        platform.drain_signals().await;

        // Default maximum is one timeout: b is gone, c holds the offer.
        assert!(!queue.is_user_queued(&user("b")).await);
        assert_eq!(ids(queue.pending_users().await), ["c"]);

        // c's offer is accept-only (no one waiting), so it never expires.
        tokio::time::sleep(Duration::from_secs(3600)).await;
        platform.drain_signals().await;
        assert_eq!(ids(queue.pending_users().await), ["c"]);
        queue.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_lone_offer_has_no_skip_and_no_deadline() {
        let (platform, queue) = fixture(Capacity::Fixed(1)).await;
        queue.add_user(user("a")).await;
        queue.add_user(user("b")).await;
        queue.remove_user(&user("a")).await;
        platform.drain_signals().await;

        let offer = offer_message(&platform, "b").await;
        let text = platform.message_body(&offer).await.unwrap().text.unwrap();
        assert!(!text.contains("front of the queue"));
        let reactions = platform.reactions_on(&offer).await;
        assert!(reactions.iter().any(|r| r.emoji.identifier() == "✔️"));
        assert!(reactions.iter().all(|r| r.emoji.identifier() != "✖️"));

        tokio::time::sleep(Duration::from_secs(86_400)).await;
        platform.drain_signals().await;
        assert_eq!(ids(queue.pending_users().await), ["b"]);
        queue.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_offer_gains_skip_when_someone_queues_behind() {
        let (platform, queue) = fixture(Capacity::Fixed(1)).await;
        queue.add_user(user("a")).await;
        queue.add_user(user("b")).await;
        queue.remove_user(&user("a")).await;
        platform.drain_signals().await;
        let before = offer_message(&platform, "b").await;

        queue.add_user(user("c")).await;
        platform.drain_signals().await;

        // Same message, re-issued in place with the skip path added.
        let after = offer_message(&platform, "b").await;
        assert!(before.same_as(&after));
        let text = platform.message_body(&after).await.unwrap().text.unwrap();
        assert!(text.contains("front of the queue"));
        let reactions = platform.reactions_on(&after).await;
        assert!(reactions.iter().any(|r| r.emoji.identifier() == "✖️"));
        queue.stop().await;
    }

    #[tokio::test]
    async fn test_board_reactions_drive_membership() {
        let (platform, queue) = fixture(Capacity::Fixed(1)).await;
        let board = queue.message().clone();

        platform
            .user_reacts(&board, Emoji::unicode("🎫"), user("a"))
            .await;
        platform.drain_signals().await;
        assert_eq!(ids(queue.active_users().await), ["a"]);

        platform
            .user_reacts(&board, Emoji::unicode("🎫"), user("b"))
            .await;
        platform.drain_signals().await;
        assert_eq!(ids(queue.queued_users().await), ["b"]);

        platform
            .user_unreacts(&board, Emoji::unicode("🎫"), user("a"))
            .await;
        platform.drain_signals().await;
        assert!(queue.active_users().await.is_empty());
        assert_eq!(ids(queue.pending_users().await), ["b"]);
        queue.stop().await;
    }

    #[tokio::test]
    async fn test_stray_board_reaction_is_cleared() {
        let (platform, queue) = fixture(Capacity::Fixed(1)).await;
        let board = queue.message().clone();

        platform
            .user_reacts(&board, Emoji::unicode("💀"), user("x"))
            .await;
        platform.drain_signals().await;
        queue.settle().await;

        let reactions = platform.reactions_on(&board).await;
        assert!(reactions.iter().all(|r| r.emoji.identifier() != "💀"));
        queue.stop().await;
    }

    #[tokio::test]
    async fn test_pool_button_is_inert_on_fixed_boards() {
        let (platform, queue) = fixture(Capacity::Fixed(1)).await;
        let board = queue.message().clone();

        platform
            .user_reacts(&board, Emoji::unicode("📋"), user("x"))
            .await;
        platform.drain_signals().await;
        queue.settle().await;

        assert!(queue.available_users().await.is_empty());
        let reactions = platform.reactions_on(&board).await;
        assert!(reactions.iter().all(|r| r.emoji.identifier() != "📋"));
        queue.stop().await;
    }

    #[tokio::test]
    async fn test_set_max_active_opens_room() {
        let (platform, queue) = fixture(Capacity::Fixed(1)).await;
        queue.add_user(user("a")).await;
        queue.add_user(user("b")).await;

        queue.set_max_active(2).await;
        platform.drain_signals().await;

        assert_eq!(queue.get_max_active().await, 2);
        assert_eq!(ids(queue.pending_users().await), ["b"]);
        assert!(queue.queued_users().await.is_empty());
        queue.stop().await;
    }

    #[tokio::test]
    async fn test_demand_capacity_follows_available_pool() {
        let (platform, queue) = fixture(Capacity::Demand).await;
        assert_eq!(queue.get_max_active().await, 0);

        // No hosts yet: joiners wait.
        queue.add_user(user("a")).await;
        assert_eq!(ids(queue.queued_users().await), ["a"]);

        queue.add_available_user(user("host")).await;
        platform.drain_signals().await;
        assert_eq!(queue.get_max_active().await, 1);
        assert_eq!(ids(queue.pending_users().await), ["a"]);

        // Withdrawing the host shrinks capacity but evicts no one.
        queue.remove_available_user(&user("host")).await;
        assert_eq!(queue.get_max_active().await, 0);
        assert_eq!(ids(queue.pending_users().await), ["a"]);
        assert_disjoint(&queue).await;
        queue.stop().await;
    }

    #[tokio::test]
    async fn test_board_shows_current_state() {
        let (platform, queue) = fixture(Capacity::Fixed(2)).await;
        queue.add_user(user("a")).await;
        queue.add_user(user("b")).await;
        queue.add_user(user("c")).await;
        queue.settle().await;

        let body = platform.message_body(queue.message()).await.unwrap();
        assert_eq!(body.fields[0].name, "Active 2/2");
        assert_eq!(body.fields[0].value, "@a\n@b");
        assert_eq!(body.fields[1].name, "Queued - 1");
        assert_eq!(body.fields[1].value, "@c");
        queue.stop().await;
    }

    #[tokio::test]
    async fn test_registered_subscribers_receive_events() {
        struct Recorder {
            kinds: SyncMutex<Vec<EventKind>>,
        }

        #[async_trait::async_trait]
        impl Subscribe for Recorder {
            async fn on_event(&self, event: &Event) {
                self.kinds.lock().unwrap().push(event.kind);
            }
        }

        let recorder = Arc::new(Recorder {
            kinds: SyncMutex::new(Vec::new()),
        });
        let platform = MockPlatform::new();
        let queue = SlotQueue::start(
            platform.clone(),
            ChannelRef::new("lobby"),
            fast(QueueConfig::new("q", Capacity::Fixed(1))),
            vec![recorder.clone()],
        )
        .await
        .unwrap();

        queue.add_user(user("a")).await;
        platform.drain_signals().await;

        let kinds = recorder.kinds.lock().unwrap().clone();
        assert!(kinds.contains(&EventKind::UserActive));
        assert!(kinds.contains(&EventKind::UserAdded));
        queue.stop().await;
    }

    #[tokio::test]
    async fn test_invalid_capacity_is_rejected_at_start() {
        let platform = MockPlatform::new();
        let err = SlotQueue::start(
            platform.clone(),
            ChannelRef::new("lobby"),
            QueueConfig::new("q", Capacity::Fixed(0)),
            Vec::new(),
        )
        .await
        .err()
        .expect("zero fixed capacity must be rejected");
        assert_eq!(err.as_label(), "queue_invalid_capacity");
    }

    #[tokio::test]
    async fn test_resuming_existing_board_repaints_it() {
        let platform = MockPlatform::new();
        let lobby = ChannelRef::new("lobby");
        let stale = platform
            .seed_message(&lobby, MessageBody::text("stale board"))
            .await;

        let config = QueueConfig {
            existing_message: Some(stale.clone()),
            ..QueueConfig::new("Duos", Capacity::Fixed(1))
        };
        let queue = SlotQueue::start(platform.clone(), lobby, fast(config), Vec::new())
            .await
            .unwrap();

        assert!(queue.message().same_as(&stale));
        let body = platform.message_body(&stale).await.unwrap();
        assert_eq!(body.title.as_deref(), Some("Duos"));
        queue.stop().await;
    }
}
