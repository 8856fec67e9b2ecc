//! Failure reasons shown to the user. Provider detail never ends up here.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The provider declined or rejected the payment.
    Declined,
    /// The provider could not be reached or timed out.
    ProviderUnavailable,
    /// The product is not in the catalog.
    ProductUnavailable,
    /// The payment method stopped being usable before an intent was created.
    MethodUnavailable,
    /// The submission pipeline stopped unexpectedly.
    Interrupted,
}

impl FailureReason {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Declined | Self::Interrupted => "Payment failed. Please try again.",
            Self::ProviderUnavailable => {
                "The payment service is temporarily unavailable. Please try again later."
            }
            Self::ProductUnavailable => "This item is no longer available.",
            Self::MethodUnavailable => {
                "This payment method is no longer available. Please choose another."
            }
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}
