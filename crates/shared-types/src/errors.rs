//! # Error Types
//!
//! The storefront-wide error taxonomy. Each component keeps its own
//! `thiserror` enum and maps every variant onto an [`ErrorKind`], so the UI
//! layer can react to a failure without knowing which component produced it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification shared by every component error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Wallet rejected, user cancelled, or the connect timed out.
    ConnectionError,
    /// An external provider could not be reached or did not answer in time.
    ProviderUnavailable,
    /// A conflicting operation (e.g. another wallet connect) is in flight.
    OperationInProgress,
    /// A purchase for the same product is already submitting.
    DuplicateSubmission,
    /// The chosen payment method is unknown or unusable right now.
    InvalidSelection,
    /// Requested entity (product, active session) does not exist.
    NotFound,
}

impl ErrorKind {
    /// Stable machine name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionError => "connection_error",
            Self::ProviderUnavailable => "provider_unavailable",
            Self::OperationInProgress => "operation_in_progress",
            Self::DuplicateSubmission => "duplicate_submission",
            Self::InvalidSelection => "invalid_selection",
            Self::NotFound => "not_found",
        }
    }

    /// Message safe to show an end user. Never contains provider detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ConnectionError => "Could not connect your wallet. Please try again.",
            Self::ProviderUnavailable => {
                "The payment service is temporarily unavailable. Please try again later."
            }
            Self::OperationInProgress => "Please wait for the current operation to finish.",
            Self::DuplicateSubmission => "A payment for this item is already being processed.",
            Self::InvalidSelection => "Please choose a different payment method.",
            Self::NotFound => "The requested item could not be found.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_distinct() {
        let kinds = [
            ErrorKind::ConnectionError,
            ErrorKind::ProviderUnavailable,
            ErrorKind::OperationInProgress,
            ErrorKind::DuplicateSubmission,
            ErrorKind::InvalidSelection,
            ErrorKind::NotFound,
        ];
        let mut seen = std::collections::HashSet::new();
        for kind in kinds {
            assert!(seen.insert(kind.user_message()));
        }
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&ErrorKind::DuplicateSubmission).unwrap();
        assert_eq!(json, "\"duplicate_submission\"");
    }
}
