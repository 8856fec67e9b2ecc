//! # Payment Method Set
//!
//! Immutable snapshot of the provider's methods with unique ids. The
//! registry swaps whole snapshots behind an `Arc`, so readers never see a
//! half-updated list.

use shared_types::{BlockchainId, PaymentMethod, PaymentMethodId};

/// Ordered, id-unique collection of payment methods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentMethodSet {
    methods: Vec<PaymentMethod>,
}

impl PaymentMethodSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a provider list. The first occurrence of an id wins; the
    /// ids of dropped duplicates are returned.
    pub fn build(methods: Vec<PaymentMethod>) -> (Self, Vec<PaymentMethodId>) {
        let mut unique: Vec<PaymentMethod> = Vec::with_capacity(methods.len());
        let mut duplicates = Vec::new();
        for method in methods {
            if unique.iter().any(|m| m.id == method.id) {
                duplicates.push(method.id);
            } else {
                unique.push(method);
            }
        }
        (Self { methods: unique }, duplicates)
    }

    pub fn get(&self, id: &PaymentMethodId) -> Option<&PaymentMethod> {
        self.methods.iter().find(|m| &m.id == id)
    }

    pub fn contains(&self, id: &PaymentMethodId) -> bool {
        self.get(id).is_some()
    }

    /// Methods flagged as default by the provider, in provider order.
    pub fn defaults(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.methods.iter().filter(|m| m.is_default)
    }

    /// First crypto method on `chain`.
    pub fn crypto_for(&self, chain: &BlockchainId) -> Option<&PaymentMethod> {
        self.methods
            .iter()
            .find(|m| m.crypto_chain() == Some(chain))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.methods.iter()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn to_vec(&self) -> Vec<PaymentMethod> {
        self.methods.clone()
    }
}
