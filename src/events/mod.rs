//! Queue events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to admission events emitted by the slot queue.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publisher**: [`SlotQueue`](crate::SlotQueue) (admission transitions,
//!   pass outcomes, board refreshes).
//! - **Consumers**: the queue's own subscriber listener, which fans out to
//!   [`SubscriberSet`](crate::subscribers::SubscriberSet) workers.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, PassKind, QueueList};
