//! Ephemeral per-user prompt workflow.
//!
//! [`UserPrompt`] delivers a single private, re-editable message to one
//! user with a bounded set of response options and a timeout. The private
//! channel is preferred; a visible fallback channel is used only when the
//! user cannot be messaged directly.
//!
//! ## Rules
//! - At most one live prompt message per workflow: re-prompting **edits**
//!   the existing message in place, so a held deep link stays valid.
//! - A reaction from anyone other than the addressed user is rejected
//!   outright (removed), without touching state.
//! - [`UserPrompt::cancel`] is idempotent and wins against a racing
//!   response: the wrapped collect re-checks the cancelled flag first, and
//!   the prompt lock decides the order deterministically.
//! - Stray messages in the private channel are cleared best-effort before
//!   each prompt; failures there are ignored.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::Mutex;

use crate::error::{PlatformError, QueueError};
use crate::options::ReactionOption;
use crate::platform::{ChannelRef, Emoji, MessageBody, MessageRef, PlatformRef, UserRef};
use crate::reconciler::{ReactionReconciler, ReconcilerSettings};

/// Response callback of a [`PromptOption`].
type RespondFn = Arc<dyn Fn(UserRef) -> BoxFuture<'static, ()> + Send + Sync>;

/// One response option offered by a prompt: an emoji and what accepting it
/// means. The prompt message is deleted before the callback runs.
#[derive(Clone)]
pub struct PromptOption {
    pub emoji: Emoji,
    respond: RespondFn,
}

impl PromptOption {
    pub fn new<F, Fut>(emoji: Emoji, respond: F) -> Self
    where
        F: Fn(UserRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            emoji,
            respond: Arc::new(move |user| Box::pin(respond(user))),
        }
    }
}

#[derive(Default)]
struct PromptState {
    message: Option<MessageRef>,
    reconciler: Option<ReactionReconciler>,
    cancelled: bool,
}

struct PromptInner {
    platform: PlatformRef,
    user: UserRef,
    fallback: Option<ChannelRef>,
    state: Mutex<PromptState>,
}

/// A single, cancellable, re-usable prompt to one user.
#[derive(Clone)]
pub struct UserPrompt {
    inner: Arc<PromptInner>,
}

impl UserPrompt {
    /// Creates an idle workflow for `user`. `fallback` is used only when
    /// the private channel cannot be created.
    pub fn new(platform: PlatformRef, user: UserRef, fallback: Option<ChannelRef>) -> Self {
        Self {
            inner: Arc::new(PromptInner {
                platform,
                user,
                fallback,
                state: Mutex::new(PromptState::default()),
            }),
        }
    }

    /// The addressed user.
    pub fn user(&self) -> &UserRef {
        &self.inner.user
    }

    /// Issues (or re-issues) the prompt.
    ///
    /// No-op once cancelled. `timeout` of zero means the prompt never
    /// expires; otherwise the message is deleted on expiry and
    /// `on_timeout(user)` fires once.
    pub async fn prompt<F, Fut>(
        &self,
        options: Vec<PromptOption>,
        timeout: Duration,
        on_timeout: F,
        body: MessageBody,
    ) -> Result<(), QueueError>
    where
        F: Fn(UserRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let inner = &self.inner;
        let mut state = inner.state.lock().await;
        if state.cancelled {
            return Ok(());
        }

        if let Some(previous) = state.reconciler.take() {
            previous.stop();
        }

        let (channel, private) = match inner.platform.create_direct_channel(&inner.user).await {
            Ok(dm) => (dm, true),
            Err(e @ PlatformError::DmUnavailable { .. }) => match &inner.fallback {
                Some(fallback) => (fallback.clone(), false),
                None => return Err(e.into()),
            },
            Err(e) => return Err(e.into()),
        };

        if private {
            self.clear_channel(&channel, state.message.as_ref()).await;
        }

        let message = match &state.message {
            Some(existing) => match inner.platform.edit_message(existing, &body).await {
                Ok(message) => message,
                // The old prompt vanished underneath us; post a fresh one.
                Err(e) if e.is_not_found() => inner.platform.send_message(&channel, &body).await?,
                Err(e) => return Err(e.into()),
            },
            None => inner.platform.send_message(&channel, &body).await?,
        };
        state.message = Some(message.clone());

        let wrapped: Vec<ReactionOption> = options
            .into_iter()
            .map(|option| self.wrap_option(option))
            .collect();

        let weak = Arc::downgrade(inner);
        let on_timeout = Arc::new(on_timeout);
        let settings = ReconcilerSettings::default()
            .with_timeout(timeout)
            .with_timeout_callback(move || {
                let weak = weak.clone();
                let on_timeout = Arc::clone(&on_timeout);
                async move {
                    let Some(inner) = weak.upgrade() else { return };
                    Self::take_and_delete_message(&inner).await;
                    on_timeout(inner.user.clone()).await;
                }
            });

        let reconciler = ReactionReconciler::start(
            Arc::clone(&inner.platform),
            message,
            wrapped,
            settings,
        )
        .await?;
        state.reconciler = Some(reconciler);

        Ok(())
    }

    /// Cancels the workflow: stops the reconciler and deletes the
    /// outstanding message. Idempotent; later `prompt()` calls no-op.
    pub async fn cancel(&self) {
        let inner = &self.inner;
        let (reconciler, message) = {
            let mut state = inner.state.lock().await;
            if state.cancelled {
                return;
            }
            state.cancelled = true;
            (state.reconciler.take(), state.message.take())
        };

        if let Some(reconciler) = reconciler {
            reconciler.stop();
        }
        if let Some(message) = message {
            let _ = inner.platform.delete_message(&message).await;
        }
    }

    /// True once the workflow has been cancelled.
    pub async fn is_cancelled(&self) -> bool {
        self.inner.state.lock().await.cancelled
    }

    /// Identity of the current prompt message, if one is live.
    pub async fn message(&self) -> Option<MessageRef> {
        self.inner.state.lock().await.message.clone()
    }

    /// Rejects everyone but the addressed user, honors cancellation, and
    /// deletes the prompt message before delegating to the option.
    fn wrap_option(&self, option: PromptOption) -> ReactionOption {
        let weak = Arc::downgrade(&self.inner);
        let respond = option.respond;

        ReactionOption::new(option.emoji).on_collect(move |user: UserRef| {
            let weak = weak.clone();
            let respond = Arc::clone(&respond);
            async move {
                let Some(inner) = weak.upgrade() else {
                    return false;
                };
                if !user.same_as(&inner.user) {
                    return false;
                }
                // Cancellation wins: a response racing cancel() is
                // rejected once the flag is set.
                {
                    let state = inner.state.lock().await;
                    if state.cancelled {
                        return false;
                    }
                }
                Self::take_and_delete_message(&inner).await;
                respond(user).await;
                true
            }
        })
    }

    async fn take_and_delete_message(inner: &Arc<PromptInner>) {
        let message = inner.state.lock().await.message.take();
        if let Some(message) = message {
            let _ = inner.platform.delete_message(&message).await;
        }
    }

    /// Best-effort deletion of stray messages in the private channel,
    /// keeping the prompt's own message.
    async fn clear_channel(&self, channel: &ChannelRef, keep: Option<&MessageRef>) {
        let Ok(messages) = self.inner.platform.fetch_messages(channel).await else {
            return;
        };
        let deletions = messages
            .iter()
            .filter(|m| keep.map_or(true, |keep| !m.same_as(keep)))
            .map(|m| self.inner.platform.delete_message(m));
        for result in futures::future::join_all(deletions).await {
            let _ = result;
        }
    }
}
