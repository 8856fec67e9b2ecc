//! # Method Directory Adapter
//! Lets the purchase orchestrator resolve methods through the registry
//! without depending on the registry crate.

use std::sync::Arc;

use sf_02_payment_methods::{PaymentMethodApi, PaymentMethodRegistry};
use sf_03_purchase::{MethodDirectory, MethodRejected};
use shared_types::{PaymentMethod, PaymentMethodId};

/// `MethodDirectory` backed by the payment method registry.
pub struct RegistryDirectory {
    registry: Arc<PaymentMethodRegistry>,
}

impl RegistryDirectory {
    pub fn new(registry: Arc<PaymentMethodRegistry>) -> Self {
        Self { registry }
    }
}

impl MethodDirectory for RegistryDirectory {
    fn resolve_for_purchase(&self, id: &PaymentMethodId) -> Result<PaymentMethod, MethodRejected> {
        self.registry
            .resolve_for_purchase(id)
            .map_err(|e| MethodRejected(e.to_string()))
    }
}
