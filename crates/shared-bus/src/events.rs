//! # Storefront Events
//!
//! Every event that flows through the bus, and the topic names the UI and
//! analytics layers subscribe to.

use serde::{Deserialize, Serialize};
use shared_types::entities::{AttemptId, IntentId, PaymentMethodId, ProductId, Receipt, WalletSession};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorefrontEvent {
    // =========================================================================
    // WALLET SESSION
    // =========================================================================
    /// A wallet session was installed.
    WalletConnected(WalletSession),

    /// The given session was torn down.
    WalletDisconnected(WalletSession),

    /// The wallet switched account on the same chain.
    WalletAccountChanged {
        previous_address: String,
        session: WalletSession,
    },

    // =========================================================================
    // PURCHASE
    // =========================================================================
    /// A purchase attempt entered `Submitting`.
    PaymentStarted {
        attempt_id: AttemptId,
        product_id: ProductId,
        payment_method_id: PaymentMethodId,
    },

    /// The provider settled the attempt successfully.
    PaymentCompleted {
        attempt_id: AttemptId,
        product_id: ProductId,
        intent_id: IntentId,
        receipt: Option<Receipt>,
    },

    /// The attempt failed. `reason` is safe to show the user.
    PaymentFailed {
        attempt_id: AttemptId,
        product_id: ProductId,
        reason: String,
    },

    // =========================================================================
    // PAYMENT METHODS
    // =========================================================================
    /// The method cache was replaced.
    PaymentMethodsRefreshed { count: usize },
}

impl StorefrontEvent {
    /// The topic this event is published on.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::WalletConnected(_) => EventTopic::WalletConnected,
            Self::WalletDisconnected(_) => EventTopic::WalletDisconnected,
            Self::WalletAccountChanged { .. } => EventTopic::WalletAccountChanged,
            Self::PaymentStarted { .. } => EventTopic::PaymentStarted,
            Self::PaymentCompleted { .. } => EventTopic::PaymentCompleted,
            Self::PaymentFailed { .. } => EventTopic::PaymentFailed,
            Self::PaymentMethodsRefreshed { .. } => EventTopic::PaymentMethodsRefreshed,
        }
    }

    /// Product the event concerns, for purchase events.
    pub fn product_id(&self) -> Option<&ProductId> {
        match self {
            Self::PaymentStarted { product_id, .. }
            | Self::PaymentCompleted { product_id, .. }
            | Self::PaymentFailed { product_id, .. } => Some(product_id),
            _ => None,
        }
    }
}

/// Event topics for subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventTopic {
    WalletConnected,
    WalletDisconnected,
    WalletAccountChanged,
    PaymentStarted,
    PaymentCompleted,
    PaymentFailed,
    PaymentMethodsRefreshed,
}

impl EventTopic {
    /// Every topic, in declaration order.
    pub const ALL: [EventTopic; 7] = [
        Self::WalletConnected,
        Self::WalletDisconnected,
        Self::WalletAccountChanged,
        Self::PaymentStarted,
        Self::PaymentCompleted,
        Self::PaymentFailed,
        Self::PaymentMethodsRefreshed,
    ];

    /// Wallet lifecycle topics.
    pub const WALLET: [EventTopic; 3] = [
        Self::WalletConnected,
        Self::WalletDisconnected,
        Self::WalletAccountChanged,
    ];

    /// Event name as seen by subscribers, e.g. `wallet/connected`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::WalletConnected => "wallet/connected",
            Self::WalletDisconnected => "wallet/disconnected",
            Self::WalletAccountChanged => "wallet/account-changed",
            Self::PaymentStarted => "payment/started",
            Self::PaymentCompleted => "payment/completed",
            Self::PaymentFailed => "payment/failed",
            Self::PaymentMethodsRefreshed => "payment-methods/refreshed",
        }
    }
}

impl fmt::Display for EventTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown event name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown event topic: {0}")]
pub struct UnknownTopic(pub String);

impl FromStr for EventTopic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|topic| topic.name() == s)
            .ok_or_else(|| UnknownTopic(s.to_string()))
    }
}
