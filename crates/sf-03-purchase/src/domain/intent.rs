//! # Purchase Intent
//!
//! What the orchestrator asks the provider to charge. Built once per
//! attempt and never mutated afterwards: there are no setters.

use serde::Serialize;
use shared_types::{AttemptId, Money, PaymentMethodId, Product, ProductId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseIntent {
    attempt_id: AttemptId,
    product_id: ProductId,
    amount: Money,
    payment_method_id: PaymentMethodId,
}

impl PurchaseIntent {
    /// Price `product` for `attempt_id`.
    pub fn new(attempt_id: AttemptId, product: &Product, payment_method_id: PaymentMethodId) -> Self {
        Self {
            attempt_id,
            product_id: product.id.clone(),
            amount: product.price.clone(),
            payment_method_id,
        }
    }

    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn amount(&self) -> &Money {
        &self.amount
    }

    pub fn payment_method_id(&self) -> &PaymentMethodId {
        &self.payment_method_id
    }
}
