//! # Inbound Ports (Driving Ports / API)

use crate::domain::attempt::{PurchaseAttempt, PurchaseReport};
use crate::domain::errors::PurchaseError;
use shared_types::{AttemptId, PaymentMethodId, ProductId};

/// Purchase API.
#[async_trait::async_trait]
pub trait PurchaseApi: Send + Sync {
    /// Submit a purchase of `product_id` paid with `method_id`.
    ///
    /// Returns a report once the provider settled the attempt, completed or
    /// declined.
    ///
    /// # Errors
    /// * `PurchaseError::InvalidSelection` - method unknown or unusable
    /// * `PurchaseError::DuplicateSubmission` - product already submitting
    /// * `PurchaseError::ProviderUnavailable` - provider or catalog unreachable or timed out
    /// * `PurchaseError::ProductNotFound` - product not in the catalog
    async fn submit(
        &self,
        product_id: ProductId,
        method_id: PaymentMethodId,
    ) -> Result<PurchaseReport, PurchaseError>;

    fn attempt(&self, id: &AttemptId) -> Option<PurchaseAttempt>;

    /// Attempt currently submitting for `product_id`.
    fn in_flight(&self, product_id: &ProductId) -> Option<AttemptId>;

    /// Retained attempts for `product_id`, oldest first.
    fn attempts_for(&self, product_id: &ProductId) -> Vec<PurchaseAttempt>;
}
