//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from multiple sources (the supervisor loop,
//! line loggers, spawner tasks).
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and never fails; it
//!   is the crate's fire-and-forget logging sink.
//! - **Bounded capacity**: a single ring buffer stores recent events for all
//!   receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip
//!   the `n` oldest items.
//! - **No persistence**: events are lost if there are no active subscribers
//!   at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender); multiple
/// publishers can publish concurrently and subscribers receive clones of
/// each event.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at
    /// least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active subscribers.
    ///
    /// If there are no receivers, the event is dropped; this function still
    /// returns immediately.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes subsequent events.
    ///
    /// Each call creates an independent receiver; a receiver only gets
    /// events sent after it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
