//! # Core subscriber trait.
//!
//! `Subscriber` is the extension point for plugging custom event handlers
//! into the runtime: structured logging, metrics, alerting. Subscribers are
//! driven by the supervisor's bus listener and receive every published
//! event.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from the supervisor's listener task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscriber: Send + Sync + 'static {
    /// Handles a single event.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
