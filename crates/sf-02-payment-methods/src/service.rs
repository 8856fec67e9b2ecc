//! # Payment Method Registry Service
//!
//! Implements [`PaymentMethodApi`] over a [`PaymentMethodSource`].
//!
//! The cache is an `Arc<PaymentMethodSet>` swapped whole on refresh; the
//! session and selection live under the same lock so a reader never sees a
//! selection computed against a different session.

use crate::domain::errors::RegistryError;
use crate::domain::method_set::PaymentMethodSet;
use crate::domain::selection;
use crate::domain::state::RegistryState;
use crate::ports::inbound::PaymentMethodApi;
use crate::ports::outbound::PaymentMethodSource;
use parking_lot::RwLock;
use shared_bus::{EventBus, EventPublisher, StorefrontEvent, Subscription};
use shared_types::{PaymentMethod, PaymentMethodId, WalletSession};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Registry configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Upper bound for one `list_methods` call.
    pub refresh_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            refresh_timeout: Duration::from_secs(10),
        }
    }
}

/// Payment method registry.
///
/// Subscribes to the wallet topics on construction and unsubscribes on drop.
pub struct PaymentMethodRegistry {
    source: Arc<dyn PaymentMethodSource>,
    bus: Arc<EventBus>,
    state: Arc<RwLock<RegistryState>>,
    subscriptions: Vec<Subscription>,
    config: RegistryConfig,
}

impl PaymentMethodRegistry {
    pub fn new(
        source: Arc<dyn PaymentMethodSource>,
        bus: Arc<EventBus>,
        config: RegistryConfig,
    ) -> Self {
        let state = Arc::new(RwLock::new(RegistryState::default()));
        let subscriptions = crate::adapters::bus::attach(&bus, state.clone());
        Self {
            source,
            bus,
            state,
            subscriptions,
            config,
        }
    }

    /// Session the registry last saw on the bus.
    pub fn observed_session(&self) -> Option<WalletSession> {
        self.state.read().session().cloned()
    }
}

impl Drop for PaymentMethodRegistry {
    fn drop(&mut self) {
        for subscription in &self.subscriptions {
            self.bus.unsubscribe(subscription);
        }
    }
}

#[async_trait::async_trait]
impl PaymentMethodApi for PaymentMethodRegistry {
    async fn refresh(&self) -> Result<Vec<PaymentMethod>, RegistryError> {
        let fetched = match timeout(self.config.refresh_timeout, self.source.list_methods()).await {
            Ok(Ok(methods)) => methods,
            Ok(Err(e)) => {
                warn!(error = %e, "Payment method refresh failed, keeping cache");
                return Err(RegistryError::ProviderUnavailable(e.to_string()));
            }
            Err(_) => {
                warn!(timeout_ms = self.config.refresh_timeout.as_millis() as u64, "Payment method refresh timed out, keeping cache");
                return Err(RegistryError::ProviderUnavailable(
                    "payment method refresh timed out".to_string(),
                ));
            }
        };

        let (set, duplicates) = PaymentMethodSet::build(fetched);
        for id in &duplicates {
            warn!(method_id = %id, "Duplicate payment method dropped");
        }
        let set = Arc::new(set);
        let selected = self.state.write().replace_methods(set.clone());

        info!(count = set.len(), selected = ?selected, "Payment methods refreshed");
        self.bus
            .publish(StorefrontEvent::PaymentMethodsRefreshed { count: set.len() });
        Ok(set.to_vec())
    }

    fn default_selection(&self, session: Option<&WalletSession>) -> Option<PaymentMethodId> {
        let methods = self.state.read().methods();
        selection::default_selection(&methods, session)
    }

    fn select(&self, id: &PaymentMethodId) -> Result<PaymentMethod, RegistryError> {
        let method = self.state.write().select(id)?;
        info!(method_id = %id, rail = %method.rail(), "Payment method selected");
        Ok(method)
    }

    fn selected(&self) -> Option<PaymentMethod> {
        let state = self.state.read();
        let id = state.selected()?.clone();
        let methods = state.methods();
        methods.get(&id).cloned()
    }

    fn methods(&self) -> Vec<PaymentMethod> {
        self.state.read().methods().to_vec()
    }

    fn snapshot(&self) -> Arc<PaymentMethodSet> {
        self.state.read().methods()
    }

    fn get(&self, id: &PaymentMethodId) -> Option<PaymentMethod> {
        self.snapshot().get(id).cloned()
    }

    fn resolve_for_purchase(&self, id: &PaymentMethodId) -> Result<PaymentMethod, RegistryError> {
        self.state.read().resolve(id)
    }
}
