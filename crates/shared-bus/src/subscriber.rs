//! # Event Subscriber
//!
//! Handler signature, subscription handles and the async stream adapter.

use crate::events::{EventTopic, StorefrontEvent};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;

/// Errors a handler may report back to the bus.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler could not process the event. Logged and counted.
    #[error("Handler failed: {0}")]
    Failed(String),

    /// The receiving side is gone. The bus removes the registration.
    #[error("Subscriber closed")]
    Closed,
}

/// Callback invoked synchronously by `publish`.
pub type EventHandler = Arc<dyn Fn(&StorefrontEvent) -> Result<(), HandlerError> + Send + Sync>;

/// Registration identifier, unique per bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

/// Handle identifying one registration of a handler on a topic.
///
/// Dropping the handle does not unsubscribe; pass it to
/// [`EventBus::unsubscribe`](crate::EventBus::unsubscribe).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: SubscriptionId,
    topic: EventTopic,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, topic: EventTopic) -> Self {
        Self { id, topic }
    }

    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    #[must_use]
    pub fn topic(&self) -> EventTopic {
        self.topic
    }
}

/// Async view of the bus for a set of topics.
///
/// Implements `tokio_stream::Stream`. Dropping the stream closes the
/// channel; the bus prunes the matching handlers on their next delivery.
pub struct EventStream {
    inner: UnboundedReceiverStream<StorefrontEvent>,
    subscriptions: Vec<Subscription>,
}

impl EventStream {
    pub(crate) fn new(
        receiver: mpsc::UnboundedReceiver<StorefrontEvent>,
        subscriptions: Vec<Subscription>,
    ) -> Self {
        Self {
            inner: UnboundedReceiverStream::new(receiver),
            subscriptions,
        }
    }

    /// Registrations backing this stream.
    #[must_use]
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }
}

impl Stream for EventStream {
    type Item = StorefrontEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
