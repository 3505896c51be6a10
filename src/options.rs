//! # Reaction options: emoji plus lifecycle callbacks.
//!
//! A [`ReactionOption`] declares one emoji the bot keeps on a message and
//! what happens when users interact with it. Callbacks are optional; the
//! capability check is `Option::is_some`, never runtime probing.
//!
//! ## Callback semantics
//! - `collect(user) -> bool`: a new, validated reaction arrived. Returning
//!   `false` requests immediate removal of the user's reaction, turning the
//!   option into a momentary button.
//! - `remove(user)`: the user removed their reaction.
//! - `dispose(user)`: the platform evicted the reaction from its cache.
//! - `validate(Some(user)) -> bool`: may this user's reaction remain?
//!   `validate(None)` (asked of a default option) decides the fate of a
//!   whole unmatched reaction.
//! - `condition() -> bool`: should the bot keep its own reaction present at
//!   all? Re-evaluated on every reconciliation pass.
//!
//! Callbacks produce fresh futures per call (the closure pattern used for
//! async work throughout this crate), so options are freely cloneable and
//! shareable across reconciler passes.
//!
//! # Example
//! ```
//! use queueboard::{Emoji, ReactionOption};
//!
//! let option = ReactionOption::new(Emoji::unicode("🎫"))
//!     .on_collect(|user| async move {
//!         println!("{user} took a ticket");
//!         true // keep the reaction
//!     })
//!     .on_validate(|user| async move { user.is_some() });
//! assert!(option.callbacks.collect.is_some());
//! assert!(option.callbacks.condition.is_none());
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::collections::ComparisonMap;
use crate::platform::{emoji_comparator, Emoji, UserRef};

/// `collect` callback: returns whether the reaction may stay.
pub type CollectFn = Arc<dyn Fn(UserRef) -> BoxFuture<'static, bool> + Send + Sync>;
/// `remove`/`dispose` callback.
pub type NotifyFn = Arc<dyn Fn(UserRef) -> BoxFuture<'static, ()> + Send + Sync>;
/// `validate` callback; `None` asks about the reaction as a whole.
pub type ValidateFn = Arc<dyn Fn(Option<UserRef>) -> BoxFuture<'static, bool> + Send + Sync>;
/// `condition` callback: gates the bot's own reaction.
pub type ConditionFn = Arc<dyn Fn() -> BoxFuture<'static, bool> + Send + Sync>;

/// Optional lifecycle callbacks of a reaction option.
///
/// Also used standalone as a reconciler's *default option*: fallback
/// behavior for reactions matching no declared emoji.
#[derive(Clone, Default)]
pub struct OptionCallbacks {
    pub collect: Option<CollectFn>,
    pub remove: Option<NotifyFn>,
    pub dispose: Option<NotifyFn>,
    pub validate: Option<ValidateFn>,
    pub condition: Option<ConditionFn>,
}

impl OptionCallbacks {
    /// Callbacks that validate nothing: every reaction under them is pruned.
    ///
    /// The board reconciler uses this as its default option so stray
    /// reactions (left over from before a restart) get removed entirely.
    pub fn reject_all() -> Self {
        Self::default().on_validate(|_| async { false })
    }

    pub fn on_collect<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(UserRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.collect = Some(Arc::new(move |user| Box::pin(f(user))));
        self
    }

    pub fn on_remove<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(UserRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.remove = Some(Arc::new(move |user| Box::pin(f(user))));
        self
    }

    pub fn on_dispose<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(UserRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.dispose = Some(Arc::new(move |user| Box::pin(f(user))));
        self
    }

    pub fn on_validate<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Option<UserRef>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.validate = Some(Arc::new(move |user| Box::pin(f(user))));
        self
    }

    pub fn on_condition<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.condition = Some(Arc::new(move || Box::pin(f())));
        self
    }
}

/// One declared reaction option: an emoji and its callbacks.
#[derive(Clone)]
pub struct ReactionOption {
    pub emoji: Emoji,
    pub callbacks: OptionCallbacks,
}

impl ReactionOption {
    /// A bare option with no callbacks.
    pub fn new(emoji: Emoji) -> Self {
        Self {
            emoji,
            callbacks: OptionCallbacks::default(),
        }
    }

    pub fn on_collect<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(UserRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.callbacks = self.callbacks.on_collect(f);
        self
    }

    pub fn on_remove<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(UserRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.callbacks = self.callbacks.on_remove(f);
        self
    }

    pub fn on_dispose<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(UserRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.callbacks = self.callbacks.on_dispose(f);
        self
    }

    pub fn on_validate<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Option<UserRef>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.callbacks = self.callbacks.on_validate(f);
        self
    }

    pub fn on_condition<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.callbacks = self.callbacks.on_condition(f);
        self
    }
}

/// Option list keyed by emoji identity.
///
/// Thin wrapper over [`ComparisonMap`] with [`compare_emoji`]
/// (crate::platform::compare_emoji) as the key rule.
#[derive(Clone)]
pub struct EmojiMap {
    map: ComparisonMap<Emoji, ReactionOption>,
}

impl EmojiMap {
    pub fn new(options: Vec<ReactionOption>) -> Self {
        let mut map = ComparisonMap::new(emoji_comparator());
        for option in options {
            map.add(option.emoji.clone(), option);
        }
        Self { map }
    }

    /// Adds or replaces the option for its emoji.
    pub fn add(&mut self, option: ReactionOption) {
        self.map.add(option.emoji.clone(), option);
    }

    /// Removes the option for `emoji`, returning it if present.
    pub fn remove(&mut self, emoji: &Emoji) -> Option<ReactionOption> {
        self.map.remove(emoji)
    }

    pub fn get(&self, emoji: &Emoji) -> Option<&ReactionOption> {
        self.map.get(emoji)
    }

    pub fn has(&self, emoji: &Emoji) -> bool {
        self.map.has(emoji)
    }

    /// Declared options in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &ReactionOption> {
        self.map.values()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
