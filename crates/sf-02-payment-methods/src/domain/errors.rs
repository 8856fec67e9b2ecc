//! # Registry Errors

use shared_types::{ErrorKind, PaymentMethodId};
use std::fmt;
use thiserror::Error;

/// Why a payment method cannot be used right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRejection {
    /// The id is not in the cached set.
    UnknownMethod,
    /// Crypto method without an active wallet session.
    WalletNotConnected,
    /// Crypto method on a different chain than the connected wallet.
    ChainMismatch,
}

impl fmt::Display for SelectionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnknownMethod => "unknown payment method",
            Self::WalletNotConnected => "wallet not connected",
            Self::ChainMismatch => "wallet is on a different chain",
        };
        f.write_str(text)
    }
}

/// Errors returned by the payment method registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The method source failed or timed out. The previous cache is kept.
    #[error("Payment method provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The method cannot be selected or paid with.
    #[error("Invalid payment method {id}: {reason}")]
    InvalidSelection {
        id: PaymentMethodId,
        reason: SelectionRejection,
    },
}

impl RegistryError {
    /// Shared taxonomy classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProviderUnavailable(_) => ErrorKind::ProviderUnavailable,
            Self::InvalidSelection { .. } => ErrorKind::InvalidSelection,
        }
    }
}
