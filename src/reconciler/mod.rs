//! Reaction reconciliation engine.
//!
//! [`ReactionReconciler`] keeps one message's live reaction set consistent
//! with a declared, mutable option list, and turns raw platform reaction
//! signals into typed option callbacks.
//!
//! ## Architecture
//! ```text
//!  platform.watch(message)                  rebuild_reactions()
//!        │                                        │ (debounced, trailing)
//!        ▼                                        ▼
//!  listener task ── dispatch ──► callbacks   fetch_reactions
//!        │                          │             │
//!        └── every signal ──────────┴──► prune invalid/unauthorized,
//!                                        re-add the bot's own reactions
//! ```
//!
//! ## Rules
//! - The bot's own signals never reach callbacks, but still trigger a pass.
//! - `collect` returning `false` removes that user's reaction immediately
//!   (momentary button).
//! - Reactions matching no option fall back to the *default option*; one
//!   whose `validate(None)` rejects them is cleared entirely, otherwise
//!   only the bot's own reaction is withdrawn.
//! - Not-found platform errors are swallowed everywhere in the pass: a
//!   vanished message or reaction is already consistent.
//! - After [`ReactionReconciler::stop`], passes no-op.

mod debounce;

pub use debounce::Debounce;

use std::sync::{Arc, Mutex as StdMutex, Weak};
use std::time::Duration;

use futures::future::{join_all, BoxFuture};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::collections::ComparisonSet;
use crate::error::{PlatformError, QueueError};
use crate::options::{EmojiMap, OptionCallbacks, ReactionOption};
use crate::platform::{emoji_comparator, Emoji, MessageRef, PlatformRef, ReactionSignal};

/// Callback fired once when the reconciler's deadline expires.
pub type TimeoutFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Construction settings for a [`ReactionReconciler`].
#[derive(Clone, Default)]
pub struct ReconcilerSettings {
    /// Deadline for the whole subscription; `Duration::ZERO` = never.
    pub timeout: Duration,
    /// Coalescing window for reconciliation passes.
    ///
    /// `Duration::ZERO` selects the default (300ms).
    pub debounce_window: Duration,
    /// Fallback callbacks for reactions matching no declared option.
    pub default_option: Option<OptionCallbacks>,
    /// Fired once when `timeout` expires.
    pub timeout_callback: Option<TimeoutFn>,
}

impl ReconcilerSettings {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    pub fn with_default_option(mut self, callbacks: OptionCallbacks) -> Self {
        self.default_option = Some(callbacks);
        self
    }

    pub fn with_timeout_callback<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.timeout_callback = Some(Arc::new(move || Box::pin(f())));
        self
    }

    fn window(&self) -> Duration {
        if self.debounce_window == Duration::ZERO {
            Duration::from_millis(300)
        } else {
            self.debounce_window
        }
    }
}

struct ReconcilerInner {
    platform: PlatformRef,
    message: MessageRef,
    options: StdMutex<EmojiMap>,
    default_option: Option<OptionCallbacks>,
    stopped: CancellationToken,
    debounce: Debounce,
}

/// Keeps one message's reactions synchronized with its option list.
#[derive(Clone)]
pub struct ReactionReconciler {
    inner: Arc<ReconcilerInner>,
}

impl ReactionReconciler {
    /// Creates the reconciler, runs the initial pass, and starts the
    /// listener over the message's live reaction feed.
    pub async fn start(
        platform: PlatformRef,
        message: MessageRef,
        options: Vec<ReactionOption>,
        settings: ReconcilerSettings,
    ) -> Result<Self, QueueError> {
        let window = settings.window();
        let inner = Arc::new_cyclic(|weak: &Weak<ReconcilerInner>| {
            let weak = weak.clone();
            let debounce = Debounce::new(window, move || {
                let weak = weak.clone();
                async move {
                    let Some(inner) = weak.upgrade() else { return };
                    if let Err(e) = Self::rebuild(&inner).await {
                        eprintln!("[queueboard] reconciliation pass failed: {}", e.as_label());
                    }
                }
            });

            ReconcilerInner {
                platform: Arc::clone(&platform),
                message: message.clone(),
                options: StdMutex::new(EmojiMap::new(options)),
                default_option: settings.default_option.clone(),
                stopped: CancellationToken::new(),
                debounce,
            }
        });

        Self::rebuild(&inner).await?;

        let listener_inner = Arc::downgrade(&inner);
        let timeout = settings.timeout;
        let timeout_callback = settings.timeout_callback.clone();
        let stopped = inner.stopped.clone();
        let feed_platform = Arc::clone(&platform);
        let feed_message = message.clone();
        tokio::spawn(async move {
            let feed = feed_platform.watch(&feed_message);
            Self::listen(listener_inner, feed, stopped, timeout, timeout_callback).await;
        });

        Ok(Self { inner })
    }

    /// The message this reconciler is bound to.
    pub fn message(&self) -> &MessageRef {
        &self.inner.message
    }

    /// Requests a reconciliation pass (debounced, trailing, coalescing).
    pub fn rebuild_reactions(&self) {
        if self.inner.stopped.is_cancelled() {
            return;
        }
        self.inner.debounce.call();
    }

    /// Runs a reconciliation pass immediately, bypassing the debounce.
    ///
    /// Platform errors other than not-found propagate; not-found is
    /// treated as already-consistent.
    pub async fn rebuild_reactions_now(&self) -> Result<(), QueueError> {
        Self::rebuild(&self.inner).await
    }

    /// Adds (or replaces) an option and triggers a pass.
    pub fn add_option(&self, option: ReactionOption) {
        self.lock_options().add(option);
        self.rebuild_reactions();
    }

    /// Removes the option for `emoji`, if declared, and triggers a pass.
    pub fn remove_option(&self, emoji: &Emoji) -> Option<ReactionOption> {
        let removed = self.lock_options().remove(emoji);
        if removed.is_some() {
            self.rebuild_reactions();
        }
        removed
    }

    /// Halts the event subscription. Idempotent; afterwards passes no-op.
    pub fn stop(&self) {
        self.inner.stopped.cancel();
    }

    /// True once [`ReactionReconciler::stop`] has been called.
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.is_cancelled()
    }

    /// Waits until no pass is scheduled or executing. Test hook.
    pub async fn settle(&self) {
        self.inner.debounce.settle().await;
    }

    fn lock_options(&self) -> std::sync::MutexGuard<'_, EmojiMap> {
        match self.inner.options.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    async fn listen(
        weak: Weak<ReconcilerInner>,
        mut feed: crate::platform::ReactionFeed,
        stopped: CancellationToken,
        timeout: Duration,
        timeout_callback: Option<TimeoutFn>,
    ) {
        let deadline = (timeout > Duration::ZERO).then(|| Instant::now() + timeout);

        loop {
            let signal = tokio::select! {
                _ = stopped.cancelled() => break,
                _ = Self::sleep_until(deadline) => {
                    feed.stop();
                    if let Some(cb) = &timeout_callback {
                        cb().await;
                    }
                    break;
                }
                signal = feed.next() => match signal {
                    Some(signal) => signal,
                    None => break,
                },
            };

            let Some(inner) = weak.upgrade() else { break };
            Self::dispatch(&inner, signal).await;
        }
    }

    async fn sleep_until(deadline: Option<Instant>) {
        match deadline {
            Some(at) => time::sleep_until(at).await,
            None => std::future::pending().await,
        }
    }

    /// Routes one raw signal to the matching option callback, then
    /// requests a pass regardless of callback outcome.
    async fn dispatch(inner: &Arc<ReconcilerInner>, signal: ReactionSignal) {
        let bot = inner.platform.bot_user();

        if !signal.user().same_as(&bot) {
            let callbacks = Self::callbacks_for(inner, signal.emoji());
            if let Some(callbacks) = callbacks {
                match &signal {
                    ReactionSignal::Added { emoji, user } => {
                        if let Some(collect) = &callbacks.collect {
                            let keep = collect(user.clone()).await;
                            if !keep {
                                Self::absorb_not_found(
                                    inner
                                        .platform
                                        .remove_reaction(&inner.message, emoji, user)
                                        .await,
                                );
                            }
                        }
                    }
                    ReactionSignal::Removed { user, .. } => {
                        if let Some(remove) = &callbacks.remove {
                            remove(user.clone()).await;
                        }
                    }
                    ReactionSignal::Disposed { user, .. } => {
                        if let Some(dispose) = &callbacks.dispose {
                            dispose(user.clone()).await;
                        }
                    }
                }
            }
        }

        if !inner.stopped.is_cancelled() {
            inner.debounce.call();
        }
    }

    fn callbacks_for(inner: &ReconcilerInner, emoji: &Emoji) -> Option<OptionCallbacks> {
        let options = match inner.options.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        options
            .get(emoji)
            .map(|o| o.callbacks.clone())
            .or_else(|| inner.default_option.clone())
    }

    /// One reconciliation pass. Idempotent: with no external change since
    /// the previous pass it issues no platform writes.
    async fn rebuild(inner: &Arc<ReconcilerInner>) -> Result<(), QueueError> {
        if inner.stopped.is_cancelled() {
            return Ok(());
        }

        let bot = inner.platform.bot_user();
        let live = match inner.platform.fetch_reactions(&inner.message).await {
            Ok(live) => live,
            // Message already deleted: nothing to reconcile against.
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        // Snapshot so callback awaits run without the options lock held.
        let options = {
            let guard = match inner.options.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.clone()
        };

        let mut present = ComparisonSet::new(emoji_comparator());
        let mut removals: Vec<BoxFuture<'_, Result<(), PlatformError>>> = Vec::new();

        for reaction in live.iter().filter(|r| !r.users.is_empty()) {
            let option = options.get(&reaction.emoji);

            let eligible = match option {
                Some(option) => match &option.callbacks.condition {
                    Some(condition) => condition().await,
                    None => true,
                },
                None => false,
            };

            if eligible {
                present.add(reaction.emoji.clone());
            } else {
                // Unmatched or condition now false. A default option whose
                // validate rejects the whole reaction clears it for
                // everyone; otherwise only the bot withdraws its own.
                let default_keeps = match inner
                    .default_option
                    .as_ref()
                    .and_then(|d| d.validate.as_ref())
                {
                    Some(validate) => validate(None).await,
                    None => true,
                };

                if default_keeps {
                    removals.push(Box::pin(inner.platform.remove_reaction(
                        &inner.message,
                        &reaction.emoji,
                        &bot,
                    )));
                } else {
                    removals.push(Box::pin(
                        inner.platform.clear_reaction(&inner.message, &reaction.emoji),
                    ));
                }
            }

            if let Some(validate) = option.and_then(|o| o.callbacks.validate.as_ref()) {
                for user in reaction.users.iter().filter(|u| !u.same_as(&bot)) {
                    if !validate(Some(user.clone())).await {
                        removals.push(Box::pin(inner.platform.remove_reaction(
                            &inner.message,
                            &reaction.emoji,
                            user,
                        )));
                    }
                }
            }
        }

        // Removals run in parallel; one failing does not abort its
        // siblings, and the first non-404 failure surfaces afterwards.
        let mut first_error = None;
        for result in join_all(removals).await {
            if let Err(e) = result {
                if !e.is_not_found() && first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e.into());
        }

        for option in options.values() {
            if present.has(&option.emoji) {
                continue;
            }
            let eligible = match &option.callbacks.condition {
                Some(condition) => condition().await,
                None => true,
            };
            if eligible {
                Self::absorb_not_found(inner.platform.react(&inner.message, &option.emoji).await);
            }
        }

        Ok(())
    }

    fn absorb_not_found(result: Result<(), PlatformError>) {
        match result {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                eprintln!("[queueboard] reaction write failed: {}", e.as_label());
            }
        }
    }
}
