//! # Inbound Ports (Driving Ports / API)

use crate::domain::errors::RegistryError;
use crate::domain::method_set::PaymentMethodSet;
use shared_types::{PaymentMethod, PaymentMethodId, WalletSession};
use std::sync::Arc;

/// Payment method registry API.
#[async_trait::async_trait]
pub trait PaymentMethodApi: Send + Sync {
    /// Reload from the provider and replace the cache.
    ///
    /// # Errors
    /// * `RegistryError::ProviderUnavailable` - source failed or timed out; cache unchanged
    async fn refresh(&self) -> Result<Vec<PaymentMethod>, RegistryError>;

    /// Default policy applied to the cached methods.
    fn default_selection(&self, session: Option<&WalletSession>) -> Option<PaymentMethodId>;

    /// Explicit user choice.
    fn select(&self, id: &PaymentMethodId) -> Result<PaymentMethod, RegistryError>;

    /// Currently selected method.
    fn selected(&self) -> Option<PaymentMethod>;

    /// Cached methods in provider order.
    fn methods(&self) -> Vec<PaymentMethod>;

    /// Current snapshot, shared.
    fn snapshot(&self) -> Arc<PaymentMethodSet>;

    fn get(&self, id: &PaymentMethodId) -> Option<PaymentMethod>;

    /// Existence plus crypto/session check, used right before a purchase.
    fn resolve_for_purchase(&self, id: &PaymentMethodId) -> Result<PaymentMethod, RegistryError>;
}
