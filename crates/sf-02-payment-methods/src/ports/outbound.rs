//! # Outbound Ports (Driven Ports / SPI)

use shared_types::PaymentMethod;
use thiserror::Error;

/// Errors from the payment provider's method listing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MethodSourceError {
    #[error("Method source unreachable: {0}")]
    Unreachable(String),

    #[error("Malformed method list: {0}")]
    Malformed(String),
}

/// Source of the methods the provider offers.
#[async_trait::async_trait]
pub trait PaymentMethodSource: Send + Sync {
    /// Full current list, in provider order.
    async fn list_methods(&self) -> Result<Vec<PaymentMethod>, MethodSourceError>;
}
