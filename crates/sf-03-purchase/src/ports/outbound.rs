//! # Outbound Ports (Driven Ports / SPI)
//!
//! | Port | Implemented by |
//! |------|----------------|
//! | `PaymentGateway` | payment provider client |
//! | `ProductCatalog` | catalog service client |
//! | `MethodDirectory` | runtime, over the payment method registry |

use crate::domain::intent::PurchaseIntent;
use serde::{Deserialize, Serialize};
use shared_types::{IntentId, PaymentMethod, PaymentMethodId, Product, ProductId, Receipt};
use thiserror::Error;

/// Final status of an `execute` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Completed,
    Failed,
}

/// Provider answer to `execute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    #[serde(default)]
    pub receipt: Option<Receipt>,
    #[serde(default)]
    pub failure_code: Option<String>,
}

impl ExecutionResult {
    pub fn completed(receipt: impl Into<Receipt>) -> Self {
        Self {
            status: ExecutionStatus::Completed,
            receipt: Some(receipt.into()),
            failure_code: None,
        }
    }

    pub fn failed(code: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Failed,
            receipt: None,
            failure_code: Some(code.into()),
        }
    }
}

/// Errors from the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Network failure or provider outage.
    #[error("Payment provider unreachable: {0}")]
    Unreachable(String),

    /// The provider refused the request.
    #[error("Payment provider rejected request ({code}): {message}")]
    Rejected { code: String, message: String },
}

/// Payment provider.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Register the intent; returns the provider's intent id.
    async fn create_intent(&self, intent: &PurchaseIntent) -> Result<IntentId, GatewayError>;

    /// Settle a previously created intent.
    async fn execute(&self, intent_id: &IntentId) -> Result<ExecutionResult, GatewayError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Catalog unreachable: {0}")]
    Unreachable(String),
}

/// Product catalog.
#[async_trait::async_trait]
pub trait ProductCatalog: Send + Sync {
    /// `Ok(None)` when the product does not exist.
    async fn product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError>;
}

/// A method that cannot be used for a purchase right now.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MethodRejected(pub String);

/// Synchronous method lookup used before anything is sent to the provider.
pub trait MethodDirectory: Send + Sync {
    fn resolve_for_purchase(&self, id: &PaymentMethodId) -> Result<PaymentMethod, MethodRejected>;
}
