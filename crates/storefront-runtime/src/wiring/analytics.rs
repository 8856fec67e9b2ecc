//! # Analytics Subscriber
//!
//! Turns storefront events into log lines and Prometheus samples. The core
//! components never touch metrics themselves.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use shared_bus::{EventBus, EventTopic, HandlerError, StorefrontEvent, Subscription};
use shared_types::AttemptId;
use storefront_telemetry::{
    metric_inc, HistogramTimer, BUS_EVENTS, PAYMENT_METHODS_CACHED, PURCHASES,
    PURCHASE_DURATION, WALLET_SESSIONS,
};

/// Purchase totals seen by one analytics subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurchaseTally {
    pub started: u64,
    pub completed: u64,
    pub failed: u64,
}

#[derive(Default)]
struct Recorder {
    started_at: Mutex<HashMap<AttemptId, HistogramTimer>>,
    started: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl Recorder {
    fn record(&self, event: &StorefrontEvent) {
        let topic = event.topic();
        metric_inc!(BUS_EVENTS, &[topic.name()]);

        match event {
            StorefrontEvent::WalletConnected(session) => {
                metric_inc!(WALLET_SESSIONS, &["connected"]);
                info!(
                    topic = %topic,
                    wallet_kind = %session.wallet_kind,
                    address = %session.short_address(),
                    chain = %session.blockchain_id,
                    "Wallet connected"
                );
            }
            StorefrontEvent::WalletDisconnected(session) => {
                metric_inc!(WALLET_SESSIONS, &["disconnected"]);
                info!(topic = %topic, wallet_kind = %session.wallet_kind, "Wallet disconnected");
            }
            StorefrontEvent::WalletAccountChanged { session, .. } => {
                metric_inc!(WALLET_SESSIONS, &["account_changed"]);
                info!(topic = %topic, address = %session.short_address(), "Wallet account changed");
            }
            StorefrontEvent::PaymentStarted {
                attempt_id,
                product_id,
                payment_method_id,
            } => {
                metric_inc!(PURCHASES, &["started"]);
                self.started.fetch_add(1, Ordering::Relaxed);
                self.started_at
                    .lock()
                    .insert(*attempt_id, HistogramTimer::new(&PURCHASE_DURATION));
                info!(
                    topic = %topic,
                    attempt_id = %attempt_id,
                    product_id = %product_id,
                    method = %payment_method_id,
                    "Payment started"
                );
            }
            StorefrontEvent::PaymentCompleted {
                attempt_id,
                product_id,
                receipt,
                ..
            } => {
                metric_inc!(PURCHASES, &["completed"]);
                self.completed.fetch_add(1, Ordering::Relaxed);
                self.observe_duration(attempt_id);
                info!(
                    topic = %topic,
                    attempt_id = %attempt_id,
                    product_id = %product_id,
                    receipt = ?receipt.as_ref().map(|r| r.as_str()),
                    "Payment completed"
                );
            }
            StorefrontEvent::PaymentFailed {
                attempt_id,
                product_id,
                reason,
            } => {
                metric_inc!(PURCHASES, &["failed"]);
                self.failed.fetch_add(1, Ordering::Relaxed);
                self.observe_duration(attempt_id);
                warn!(
                    topic = %topic,
                    attempt_id = %attempt_id,
                    product_id = %product_id,
                    reason = %reason,
                    "Payment failed"
                );
            }
            StorefrontEvent::PaymentMethodsRefreshed { count } => {
                PAYMENT_METHODS_CACHED.set(*count as f64);
                debug!(topic = %topic, count, "Payment methods refreshed");
            }
        }
    }

    /// Dropping the timer records the sample.
    fn observe_duration(&self, attempt_id: &AttemptId) {
        let timer = self.started_at.lock().remove(attempt_id);
        drop(timer);
    }

    fn tally(&self) -> PurchaseTally {
        PurchaseTally {
            started: self.started.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Analytics subscription on every storefront topic.
///
/// Unsubscribes when dropped.
pub struct Analytics {
    bus: Arc<EventBus>,
    recorder: Arc<Recorder>,
    subscriptions: Vec<Subscription>,
}

impl Analytics {
    pub fn attach(bus: Arc<EventBus>) -> Self {
        let recorder = Arc::new(Recorder::default());
        let handler_recorder = recorder.clone();
        let subscriptions = bus.subscribe_all(&EventTopic::ALL, move |event| {
            handler_recorder.record(event);
            Ok::<(), HandlerError>(())
        });
        debug!(topics = subscriptions.len(), "Analytics attached");
        Self {
            bus,
            recorder,
            subscriptions,
        }
    }

    pub fn tally(&self) -> PurchaseTally {
        self.recorder.tally()
    }

    /// Purchases started but not yet settled.
    pub fn pending(&self) -> usize {
        self.recorder.started_at.lock().len()
    }
}

impl Drop for Analytics {
    fn drop(&mut self) {
        for subscription in &self.subscriptions {
            self.bus.unsubscribe(subscription);
        }
    }
}
