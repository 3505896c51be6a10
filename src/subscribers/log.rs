//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints admission events to stdout in a human-readable
//! format. Primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [added] user=@ada
//! [queued] user=@ada
//! [pending] user=@ada
//! [active] user=@ada
//! [passed] user=@ada kind=skip returned=true
//! [removed] user=@ada list=queue
//! [board-updated]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Not intended for production use —
/// implement a custom [`Subscribe`] for structured logging or metrics.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let user = e.user.as_ref().map(|u| u.tag().to_string());
        match e.kind {
            EventKind::UserAdded => {
                println!("[added] user={}", user.unwrap_or_default());
            }
            EventKind::UserQueued => {
                println!("[queued] user={}", user.unwrap_or_default());
            }
            EventKind::UserPending => {
                println!("[pending] user={}", user.unwrap_or_default());
            }
            EventKind::UserActive => {
                println!("[active] user={}", user.unwrap_or_default());
            }
            EventKind::UserPassed => {
                println!(
                    "[passed] user={} kind={} returned={}",
                    user.unwrap_or_default(),
                    e.pass.map(|p| p.as_label()).unwrap_or("?"),
                    e.returned.unwrap_or(false),
                );
            }
            EventKind::UserRemoved => {
                println!(
                    "[removed] user={} list={}",
                    user.unwrap_or_default(),
                    e.list.map(|l| l.as_label()).unwrap_or("none"),
                );
            }
            EventKind::BoardUpdated => {
                println!("[board-updated]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
