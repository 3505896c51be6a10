//! Event subscribers for the slot queue.
//!
//! This module provides the [`Subscribe`] trait and the fan-out machinery
//! that delivers admission events broadcast through the
//! [`Bus`](crate::events::Bus) to user-defined handlers.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   SlotQueue ── publish(Event) ──► Bus ──► queue's subscriber listener
//!                                               │
//!                                               ▼
//!                                         SubscriberSet
//!                                     ┌────────┼────────┐
//!                                     ▼        ▼        ▼
//!                                  worker1  worker2  workerN
//!                                     ▼        ▼        ▼
//!                                 sub1.on  sub2.on  subN.on
//!                                 _event()  _event()  _event()
//! ```
//!
//! ## Implementing custom subscribers
//! ```rust
//! use async_trait::async_trait;
//! use queueboard::events::{Event, EventKind};
//! use queueboard::subscribers::Subscribe;
//!
//! struct Auditor;
//!
//! #[async_trait]
//! impl Subscribe for Auditor {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::UserPassed {
//!             // write audit record...
//!         }
//!     }
//!     fn name(&self) -> &'static str { "auditor" }
//! }
//! ```

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
