//! # Purchase Errors

use shared_types::{AttemptId, ErrorKind, PaymentMethodId, ProductId};
use thiserror::Error;

/// Errors returned by `submit`.
///
/// Variants carry identifiers only; provider detail is logged, not returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    /// The method is unknown or unusable with the current wallet session.
    #[error("Invalid payment method {method_id}: {reason}")]
    InvalidSelection {
        method_id: PaymentMethodId,
        reason: String,
    },

    /// An attempt for this product is still submitting.
    #[error("Purchase of {product_id} already in progress")]
    DuplicateSubmission { product_id: ProductId },

    /// The provider or catalog could not be reached or timed out.
    #[error("Payment provider unavailable (attempt {attempt_id})")]
    ProviderUnavailable { attempt_id: AttemptId },

    /// The product is not in the catalog.
    #[error("Product not found: {product_id}")]
    ProductNotFound {
        product_id: ProductId,
        attempt_id: AttemptId,
    },
}

impl PurchaseError {
    /// Shared taxonomy classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSelection { .. } => ErrorKind::InvalidSelection,
            Self::DuplicateSubmission { .. } => ErrorKind::DuplicateSubmission,
            Self::ProviderUnavailable { .. } => ErrorKind::ProviderUnavailable,
            Self::ProductNotFound { .. } => ErrorKind::NotFound,
        }
    }
}
