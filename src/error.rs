//! Error types used by the queue core and the platform boundary.
//!
//! This module defines two main error enums:
//!
//! - [`PlatformError`] — failures reported by the messaging platform collaborator.
//! - [`QueueError`] — errors raised by the queue core itself.
//!
//! Both types provide an `as_label` helper (snake_case, stable) for logging,
//! and [`PlatformError::is_not_found`] for the reconciliation boundary where
//! a vanished message or reaction is treated as already-consistent.

use thiserror::Error;

/// # Errors reported by the messaging platform.
///
/// The platform is asynchronous, rate-limited and eventually consistent;
/// some of these errors are absorbed at well-defined boundaries rather
/// than propagated (see [`PlatformError::is_not_found`]).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The message, reaction or channel no longer exists.
    ///
    /// Reconciliation treats this as "already consistent": a reaction we
    /// wanted to remove from a deleted message is gone either way.
    #[error("not found: {what}")]
    NotFound {
        /// Short description of the missing entity (for logs).
        what: String,
    },

    /// A direct channel to the user cannot be created (DMs closed).
    ///
    /// A distinguished condition: [`UserPrompt`](crate::UserPrompt) catches
    /// it to fall back to a visible channel when one was supplied.
    #[error("cannot open direct channel to {user}")]
    DmUnavailable {
        /// Display tag of the unreachable user.
        user: String,
    },

    /// The platform asked us to slow down.
    #[error("rate limited")]
    RateLimited,

    /// Transport or protocol failure.
    #[error("platform i/o: {message}")]
    Io {
        /// The underlying error message.
        message: String,
    },
}

impl PlatformError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use queueboard::PlatformError;
    ///
    /// let err = PlatformError::RateLimited;
    /// assert_eq!(err.as_label(), "platform_rate_limited");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PlatformError::NotFound { .. } => "platform_not_found",
            PlatformError::DmUnavailable { .. } => "platform_dm_unavailable",
            PlatformError::RateLimited => "platform_rate_limited",
            PlatformError::Io { .. } => "platform_io",
        }
    }

    /// True for 404-class errors on already-deleted messages/reactions.
    ///
    /// # Example
    /// ```
    /// use queueboard::PlatformError;
    ///
    /// let err = PlatformError::NotFound { what: "message 42".into() };
    /// assert!(err.is_not_found());
    /// assert!(!PlatformError::RateLimited.is_not_found());
    /// ```
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlatformError::NotFound { .. })
    }
}

/// # Errors produced by the queue core.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum QueueError {
    /// The queue was configured with neither a fixed capacity nor
    /// demand-driven capacity. Fatal at construction.
    #[error("queue must either have a fixed max_active or demand-driven capacity")]
    InvalidCapacity,

    /// A platform call failed and could not be absorbed.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl QueueError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            QueueError::InvalidCapacity => "queue_invalid_capacity",
            QueueError::Platform(e) => e.as_label(),
        }
    }
}
