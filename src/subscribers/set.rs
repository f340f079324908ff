//! Fan-out container for subscribers.

use std::sync::Arc;

use crate::events::Event;
use crate::subscribers::Subscriber;

/// Delivers each event to every subscriber, in registration order.
///
/// Delivery is sequential within one event; subscribers are expected to be
/// quick and must never block the runtime.
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscriber>>,
}

impl SubscriberSet {
    /// Creates a set from the given subscribers.
    pub fn new(subs: Vec<Arc<dyn Subscriber>>) -> Self {
        Self { subs }
    }

    /// True when no subscribers are registered.
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Delivers one event to every subscriber.
    pub async fn dispatch(&self, event: &Event) {
        for sub in &self.subs {
            sub.on_event(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(AtomicUsize);

    #[async_trait]
    impl Subscriber for Counter {
        async fn on_event(&self, _event: &Event) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[tokio::test]
    async fn dispatch_reaches_every_subscriber() {
        let a = Arc::new(Counter(AtomicUsize::new(0)));
        let b = Arc::new(Counter(AtomicUsize::new(0)));
        let set = SubscriberSet::new(vec![a.clone(), b.clone()]);

        set.dispatch(&Event::now(EventKind::SupervisorStarted)).await;
        set.dispatch(&Event::now(EventKind::SupervisorStopped)).await;

        assert_eq!(a.0.load(Ordering::Relaxed), 2);
        assert_eq!(b.0.load(Ordering::Relaxed), 2);
    }
}
