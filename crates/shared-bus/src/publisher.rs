//! # Event Publisher
//!
//! The in-process event bus: a registry of handlers per topic, invoked
//! synchronously and in subscription order on every `publish`.
//!
//! ```text
//! publish(event)
//!     │
//!     ├─ read lock ─► snapshot handlers for event.topic() ─► unlock
//!     │
//!     │  (each handler is skipped if it was unsubscribed meanwhile)
//!     ├─ handler #1 ──► Ok
//!     ├─ handler #2 ──► Err / panic ──► warn!/error!, count, continue
//!     └─ handler #3 ──► Closed ──► pruned after the loop
//! ```

use crate::events::{EventTopic, StorefrontEvent};
use crate::subscriber::{EventHandler, EventStream, HandlerError, Subscription, SubscriptionId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Trait components use to emit events.
pub trait EventPublisher: Send + Sync {
    /// Publish an event to every handler of its topic.
    ///
    /// Returns the number of handlers that accepted the event.
    fn publish(&self, event: StorefrontEvent) -> usize;

    /// Total events published.
    fn events_published(&self) -> u64;
}

struct Registration {
    id: SubscriptionId,
    handler: EventHandler,
}

#[derive(Default)]
struct Registry {
    topics: HashMap<EventTopic, Vec<Registration>>,
    next_id: u64,
}

/// In-memory event bus.
///
/// Handlers run on the publishing thread, outside the registry lock, so a
/// handler may subscribe, unsubscribe or publish while being invoked. A
/// handler unsubscribed by an earlier handler of the same `publish` is not
/// called; one subscribed during it first sees the next event.
#[derive(Default)]
pub struct EventBus {
    registry: RwLock<Registry>,
    events_published: AtomicU64,
    handler_failures: AtomicU64,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` on `topic`. Handlers of one topic run in
    /// registration order.
    pub fn subscribe<F>(&self, topic: EventTopic, handler: F) -> Subscription
    where
        F: Fn(&StorefrontEvent) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.register(topic, Arc::new(handler))
    }

    /// Register one handler on several topics.
    pub fn subscribe_all<F>(&self, topics: &[EventTopic], handler: F) -> Vec<Subscription>
    where
        F: Fn(&StorefrontEvent) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let handler: EventHandler = Arc::new(handler);
        topics
            .iter()
            .map(|topic| self.register(*topic, handler.clone()))
            .collect()
    }

    fn register(&self, topic: EventTopic, handler: EventHandler) -> Subscription {
        let mut registry = self.registry.write();
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        registry
            .topics
            .entry(topic)
            .or_default()
            .push(Registration { id, handler });
        debug!(topic = %topic, subscription = id.0, "Handler subscribed");
        Subscription::new(id, topic)
    }

    /// Remove a registration. Unknown or already removed handles are ignored.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        let mut registry = self.registry.write();
        let Some(handlers) = registry.topics.get_mut(&subscription.topic()) else {
            return;
        };
        let before = handlers.len();
        handlers.retain(|r| r.id != subscription.id());
        if handlers.len() != before {
            debug!(topic = %subscription.topic(), subscription = subscription.id().0, "Handler unsubscribed");
        }
    }

    /// Async stream of events on `topics`.
    pub fn stream(&self, topics: &[EventTopic]) -> EventStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscriptions = self.subscribe_all(topics, move |event| {
            tx.send(event.clone()).map_err(|_| HandlerError::Closed)
        });
        EventStream::new(rx, subscriptions)
    }

    /// Number of handlers registered on `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: EventTopic) -> usize {
        self.registry
            .read()
            .topics
            .get(&topic)
            .map_or(0, Vec::len)
    }

    /// Handlers that returned an error or panicked, across all publishes.
    #[must_use]
    pub fn handler_failures(&self) -> u64 {
        self.handler_failures.load(Ordering::Relaxed)
    }

    fn snapshot(&self, topic: EventTopic) -> Vec<(SubscriptionId, EventHandler)> {
        self.registry
            .read()
            .topics
            .get(&topic)
            .map(|handlers| {
                handlers
                    .iter()
                    .map(|r| (r.id, r.handler.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn is_registered(&self, topic: EventTopic, id: SubscriptionId) -> bool {
        self.registry
            .read()
            .topics
            .get(&topic)
            .is_some_and(|handlers| handlers.iter().any(|r| r.id == id))
    }

    fn prune(&self, topic: EventTopic, closed: &[SubscriptionId]) {
        let mut registry = self.registry.write();
        if let Some(handlers) = registry.topics.get_mut(&topic) {
            handlers.retain(|r| !closed.contains(&r.id));
        }
        debug!(topic = %topic, pruned = closed.len(), "Closed handlers removed");
    }
}

impl EventPublisher for EventBus {
    fn publish(&self, event: StorefrontEvent) -> usize {
        let topic = event.topic();
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let handlers = self.snapshot(topic);
        if handlers.is_empty() {
            debug!(topic = %topic, "Event published with no subscribers");
            return 0;
        }

        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, handler) in handlers {
            if !self.is_registered(topic, id) {
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(HandlerError::Closed)) => closed.push(id),
                Ok(Err(e)) => {
                    self.handler_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(topic = %topic, subscription = id.0, error = %e, "Event handler failed");
                }
                Err(_) => {
                    self.handler_failures.fetch_add(1, Ordering::Relaxed);
                    error!(topic = %topic, subscription = id.0, "Event handler panicked");
                }
            }
        }

        if !closed.is_empty() {
            self.prune(topic, &closed);
        }

        debug!(topic = %topic, receivers = delivered, "Event published");
        delivered
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
